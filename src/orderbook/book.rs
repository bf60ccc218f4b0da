//! Per-good limit order book.
//!
//! ## Architecture
//!
//! - **Slab**: pre-allocated storage for the resting [`OrderNode`]s
//! - **BTreeMap**: price levels, bids keyed by `Reverse(price)` so the first
//!   entry on either side is the best price
//! - **HashMap**: order id to slab key, for cancel and in-place reduction
//!
//! A book only ever holds orders for its own good; goods never interact.
//!
//! ## Example
//!
//! ```
//! use goods_exchange::orderbook::OrderBook;
//! use goods_exchange::types::{AgentId, GoodId, Order, Side};
//!
//! let mut book = OrderBook::with_capacity(GoodId(1), 64);
//!
//! book.add_order(Order::new(1, AgentId(1), GoodId(1), Side::Buy, 4.0, 10.0, 0));
//! book.add_order(Order::new(2, AgentId(2), GoodId(1), Side::Sell, 5.0, 3.0, 0));
//!
//! assert_eq!(book.best_bid(), Some(4.0));
//! assert_eq!(book.best_ask(), Some(5.0));
//! assert_eq!(book.spread(), Some(1.0));
//! assert_eq!(book.demand(), 10.0);
//! assert_eq!(book.supply(), 3.0);
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use slab::Slab;

use crate::orderbook::{OrderNode, PriceKey, PriceLevel, RestingOrderRecord};
use crate::types::{GoodId, Order, Side};
use crate::MarketError;

/// Aggregate quantity resting at one price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: f64,
    pub quantity: f64,
    pub orders: usize,
}

/// Every resting order of one book, in priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub good: GoodId,
    /// Highest price first, FIFO within a price
    pub bids: Vec<Order>,
    /// Lowest price first, FIFO within a price
    pub asks: Vec<Order>,
}

/// Limit order book for a single good.
#[derive(Debug)]
pub struct OrderBook {
    good: GoodId,

    /// Resting order storage
    orders: Slab<OrderNode>,

    /// Bid levels, best (highest) first
    bids: BTreeMap<Reverse<PriceKey>, PriceLevel>,

    /// Ask levels, best (lowest) first
    asks: BTreeMap<PriceKey, PriceLevel>,

    /// Order id to slab key
    order_index: HashMap<u64, usize>,

    bid_count: usize,
    ask_count: usize,
}

impl OrderBook {
    /// Create an empty book for `good`
    pub fn new(good: GoodId) -> Self {
        Self::with_capacity(good, 0)
    }

    /// Create an empty book with room for `order_capacity` resting orders
    pub fn with_capacity(good: GoodId, order_capacity: usize) -> Self {
        Self {
            good,
            orders: Slab::with_capacity(order_capacity),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_index: HashMap::with_capacity(order_capacity),
            bid_count: 0,
            ask_count: 0,
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn good(&self) -> GoodId {
        self.good
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Total number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn bid_count(&self) -> usize {
        self.bid_count
    }

    #[inline]
    pub fn ask_count(&self) -> usize {
        self.ask_count
    }

    /// Number of resting orders on `side`
    pub fn count(&self, side: Side) -> usize {
        match side {
            Side::Buy => self.bid_count,
            Side::Sell => self.ask_count,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Rest `order` at the tail of its price level and return its slab key.
    ///
    /// The order keeps the id it was given; ids are assigned by the
    /// [`AuctionHouse`](crate::orderbook::AuctionHouse).
    pub fn add_order(&mut self, order: Order) -> usize {
        debug_assert_eq!(order.good, self.good, "order routed to the wrong book");

        let order_id = order.id;
        let price = order.price;
        let side = order.side;

        let key = self.orders.insert(OrderNode::new(order));
        self.order_index.insert(order_id, key);

        match side {
            Side::Buy => {
                self.bids
                    .entry(Reverse(PriceKey(price)))
                    .or_insert_with(|| PriceLevel::new(price))
                    .push_back(key, &mut self.orders);
                self.bid_count += 1;
            }
            Side::Sell => {
                self.asks
                    .entry(PriceKey(price))
                    .or_insert_with(|| PriceLevel::new(price))
                    .push_back(key, &mut self.orders);
                self.ask_count += 1;
            }
        }

        key
    }

    /// Remove the order at slab `key`, dropping its level if it empties.
    pub fn remove_order(&mut self, key: usize) -> Option<Order> {
        let node = self.orders.get(key)?;
        let order_id = node.order_id();
        let price = node.price();

        match node.side() {
            Side::Buy => {
                let level_key = Reverse(PriceKey(price));
                if let Some(level) = self.bids.get_mut(&level_key) {
                    level.remove(key, &mut self.orders);
                    self.bid_count = self.bid_count.saturating_sub(1);
                    if level.is_empty() {
                        self.bids.remove(&level_key);
                    }
                }
            }
            Side::Sell => {
                let level_key = PriceKey(price);
                if let Some(level) = self.asks.get_mut(&level_key) {
                    level.remove(key, &mut self.orders);
                    self.ask_count = self.ask_count.saturating_sub(1);
                    if level.is_empty() {
                        self.asks.remove(&level_key);
                    }
                }
            }
        }

        self.order_index.remove(&order_id);
        self.orders.try_remove(key).map(|node| node.order)
    }

    /// Cancel a resting order by id.
    ///
    /// Returns the cancelled order, or None if it is not resting here.
    pub fn cancel_order(&mut self, order_id: u64) -> Option<Order> {
        let key = *self.order_index.get(&order_id)?;
        self.remove_order(key)
    }

    /// Decrement a resting order's remaining quantity in place.
    ///
    /// The order keeps its price and its place in the queue. An order reduced
    /// to nothing is removed. Returns the quantity actually taken, which is
    /// capped at the order's remaining quantity.
    pub fn reduce(&mut self, order_id: u64, quantity: f64) -> Option<f64> {
        let key = *self.order_index.get(&order_id)?;
        let node = self.orders.get_mut(key)?;
        let taken = node.fill(quantity);
        let side = node.side();
        let price = node.price();
        let exhausted = node.is_filled();

        if let Some(level) = self.level_mut(side, price) {
            level.reduce_quantity(taken);
        }
        if exhausted {
            self.remove_order(key);
        }
        Some(taken)
    }

    /// Remove and return the best order on `side`.
    pub fn pop_front(&mut self, side: Side) -> Option<Order> {
        let key = self.front_key(side)?;
        self.remove_order(key)
    }

    /// Look up a resting order by id
    pub fn get_order(&self, order_id: u64) -> Option<&Order> {
        let key = self.order_index.get(&order_id)?;
        self.orders.get(*key).map(|node| &node.order)
    }

    #[inline]
    pub fn contains_order(&self, order_id: u64) -> bool {
        self.order_index.contains_key(&order_id)
    }

    /// Remove every resting order
    pub fn clear(&mut self) {
        self.orders.clear();
        self.bids.clear();
        self.asks.clear();
        self.order_index.clear();
        self.bid_count = 0;
        self.ask_count = 0;
    }

    // ========================================================================
    // Best Bid/Ask
    // ========================================================================

    /// Highest resting buy price
    #[inline]
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.keys().next().map(|key| key.0.price())
    }

    /// Lowest resting sell price
    #[inline]
    pub fn best_ask(&self) -> Option<f64> {
        self.asks.keys().next().map(|key| key.price())
    }

    /// `best_ask - best_bid`, None unless both sides are populated
    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    /// Best price level on `side`
    pub fn best_level(&self, side: Side) -> Option<&PriceLevel> {
        match side {
            Side::Buy => self.bids.values().next(),
            Side::Sell => self.asks.values().next(),
        }
    }

    /// Slab key of the order that would trade first on `side`
    #[inline]
    pub fn front_key(&self, side: Side) -> Option<usize> {
        self.best_level(side)?.peek_head()
    }

    /// The order that would trade first on `side`: best price, oldest first.
    pub fn front(&self, side: Side) -> Option<&Order> {
        let key = self.front_key(side)?;
        self.orders.get(key).map(|node| &node.order)
    }

    fn level_mut(&mut self, side: Side, price: f64) -> Option<&mut PriceLevel> {
        match side {
            Side::Buy => self.bids.get_mut(&Reverse(PriceKey(price))),
            Side::Sell => self.asks.get_mut(&PriceKey(price)),
        }
    }

    fn levels(&self, side: Side) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match side {
            Side::Buy => Box::new(self.bids.values()),
            Side::Sell => Box::new(self.asks.values()),
        }
    }

    // ========================================================================
    // Aggregates and Persistence
    // ========================================================================

    /// Resting orders on `side` in the order they would trade.
    pub fn iter_side(&self, side: Side) -> impl Iterator<Item = &Order> + '_ {
        self.levels(side)
            .flat_map(move |level| level.keys(&self.orders).map(|(_, node)| &node.order))
    }

    /// Total remaining quantity resting on `side`
    pub fn resting_quantity(&self, side: Side) -> f64 {
        self.levels(side).map(|level| level.total_quantity).sum()
    }

    /// Total resting buy quantity
    pub fn demand(&self) -> f64 {
        self.resting_quantity(Side::Buy)
    }

    /// Total resting sell quantity
    pub fn supply(&self) -> f64 {
        self.resting_quantity(Side::Sell)
    }

    /// Price levels on `side`, best first.
    pub fn depth(&self, side: Side) -> Vec<DepthLevel> {
        self.levels(side)
            .map(|level| DepthLevel {
                price: level.price,
                quantity: level.total_quantity,
                orders: level.order_count,
            })
            .collect()
    }

    /// Copy of every resting order, in priority order.
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            good: self.good,
            bids: self.iter_side(Side::Buy).cloned().collect(),
            asks: self.iter_side(Side::Sell).cloned().collect(),
        }
    }

    /// SHA-256 over the good id and every resting order in priority order.
    ///
    /// Orders are quantized to fixed point and SSZ-encoded first, so two
    /// books holding the same orders in the same queue positions hash
    /// identically.
    pub fn state_root(&self) -> Result<[u8; 32], MarketError> {
        let mut hasher = Sha256::new();
        hasher.update(self.good.0.to_le_bytes());

        for side in [Side::Buy, Side::Sell] {
            hasher.update((self.count(side) as u64).to_le_bytes());
            for order in self.iter_side(side) {
                hasher.update(RestingOrderRecord::from_order(order)?.encode()?);
            }
        }

        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        Ok(root)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
