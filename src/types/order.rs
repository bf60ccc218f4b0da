//! Order types for the goods exchange.
//!
//! ## Mutability
//!
//! An [`Order`]'s `price` is fixed at construction and is the key the book
//! sorts on. Only `remaining` changes while the order rests, so decrementing
//! it in place never disturbs price priority.

use serde::{Deserialize, Serialize};

use crate::types::{price, AgentId, GoodId};
use crate::MarketError;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 in encoded book records:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    /// Buy order (bid) - wants to acquire the good
    #[default]
    Buy,
    /// Sell order (ask) - wants to dispose of the good
    Sell,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Whether an incoming order on this side at `limit` may trade against a
    /// resting order on the opposite side at `resting`.
    ///
    /// A buy crosses asks priced at or below its limit; a sell crosses bids
    /// priced at or above its limit.
    #[inline]
    pub fn crosses(self, limit: f64, resting: f64) -> bool {
        match self {
            Side::Buy => resting <= limit,
            Side::Sell => resting >= limit,
        }
    }
}

// ============================================================================
// OrderRequest
// ============================================================================

/// A limit order as submitted by a participant, before the engine assigns it
/// an id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Agent placing the order
    pub agent: AgentId,
    /// Good being traded
    pub good: GoodId,
    /// Buy or Sell
    pub side: Side,
    /// Limit price per unit
    pub price: f64,
    /// Quantity wanted (buy) or offered (sell)
    pub quantity: f64,
}

impl OrderRequest {
    /// Build a buy request.
    pub fn buy(agent: AgentId, good: GoodId, price: f64, quantity: f64) -> Self {
        Self { agent, good, side: Side::Buy, price, quantity }
    }

    /// Build a sell request.
    pub fn sell(agent: AgentId, good: GoodId, price: f64, quantity: f64) -> Self {
        Self { agent, good, side: Side::Sell, price, quantity }
    }

    /// Reject non-finite or non-positive price and quantity, and values too
    /// large for the fixed-point state encoding (see [`price::MAX_VALUE`]).
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidOrder`] describing the offending field.
    pub fn validate(&self) -> Result<(), MarketError> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(MarketError::InvalidOrder {
                reason: format!("price must be finite and positive, got {}", self.price),
            });
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(MarketError::InvalidOrder {
                reason: format!("quantity must be finite and positive, got {}", self.quantity),
            });
        }
        if price::quantize(self.price).is_none() {
            return Err(MarketError::InvalidOrder {
                reason: format!("price {} exceeds {}", self.price, price::MAX_VALUE),
            });
        }
        if price::quantize(self.quantity).is_none() {
            return Err(MarketError::InvalidOrder {
                reason: format!("quantity {} exceeds {}", self.quantity, price::MAX_VALUE),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A limit order resting in (or about to rest in) an order book.
///
/// ## Example
///
/// ```
/// use goods_exchange::types::{AgentId, GoodId, Order, Side};
///
/// let order = Order::new(1, AgentId(7), GoodId(2), Side::Sell, 5.0, 10.0, 0);
/// assert_eq!(order.remaining, 10.0);
/// assert!(!order.is_filled());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier (assigned by the auction house)
    pub id: u64,

    /// Owner of the order; receives goods or payment on a fill
    pub agent: AgentId,

    /// Good this order trades
    pub good: GoodId,

    /// Buy or Sell
    pub side: Side,

    /// Price per unit. Never changes after construction.
    pub price: f64,

    /// Original quantity
    pub quantity: f64,

    /// Remaining quantity, decremented as the order is matched
    pub remaining: f64,

    /// Tick on which the order was submitted
    pub tick: u64,
}

impl Order {
    /// Create a new limit order
    pub fn new(
        id: u64,
        agent: AgentId,
        good: GoodId,
        side: Side,
        price: f64,
        quantity: f64,
        tick: u64,
    ) -> Self {
        Self {
            id,
            agent,
            good,
            side,
            price,
            quantity,
            remaining: quantity,
            tick,
        }
    }

    /// Check if the order is fully filled
    pub fn is_filled(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Get the filled quantity
    pub fn filled_quantity(&self) -> f64 {
        (self.quantity - self.remaining).max(0.0)
    }

    /// Fill a portion of this order
    ///
    /// Returns the quantity actually filled, which is capped at `remaining`.
    pub fn fill(&mut self, fill_qty: f64) -> f64 {
        let actual_fill = fill_qty.min(self.remaining).max(0.0);
        self.remaining -= actual_fill;
        actual_fill
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
