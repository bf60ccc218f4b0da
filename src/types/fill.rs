//! Fill type representing quantity crossed between two orders.

use serde::{Deserialize, Serialize};

use crate::types::{AgentId, GoodId, Side};

/// A fill is one crossing between an incoming order and a resting order.
///
/// ## Terminology
///
/// - **Resting**: the order that was already in the book
/// - **Aggressor**: the incoming order that triggered the match
///
/// ## Price Discovery
///
/// The fill always executes at the resting order's price.
///
/// ## Example
///
/// ```
/// use goods_exchange::types::{AgentId, Fill, GoodId, Side};
///
/// let fill = Fill {
///     id: 1,
///     good: GoodId(4),
///     buyer: AgentId(10),
///     seller: AgentId(20),
///     buy_order_id: 7,
///     sell_order_id: 3,
///     aggressor: Side::Buy,
///     price: 2.5,
///     quantity: 4.0,
///     tick: 0,
/// };
/// assert_eq!(fill.notional(), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Unique fill identifier (assigned by the auction house)
    pub id: u64,

    /// Good that changed hands
    pub good: GoodId,

    /// Agent receiving the goods
    pub buyer: AgentId,

    /// Agent giving up the goods
    pub seller: AgentId,

    /// Buy-side order id
    pub buy_order_id: u64,

    /// Sell-side order id
    pub sell_order_id: u64,

    /// Side of the incoming order
    pub aggressor: Side,

    /// Execution price per unit (the resting order's price)
    pub price: f64,

    /// Executed quantity
    pub quantity: f64,

    /// Tick on which the fill happened
    pub tick: u64,
}

impl Fill {
    /// Value exchanged for this fill (price * quantity)
    pub fn notional(&self) -> f64 {
        self.price * self.quantity
    }

    /// Id of the order that was resting in the book
    pub fn resting_order_id(&self) -> u64 {
        match self.aggressor {
            Side::Buy => self.sell_order_id,
            Side::Sell => self.buy_order_id,
        }
    }

    /// Whether `agent` is either counterparty
    pub fn involves(&self, agent: AgentId) -> bool {
        self.buyer == agent || self.seller == agent
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
