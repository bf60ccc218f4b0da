//! Price level: FIFO queue of the orders resting at one price.
//!
//! ```text
//! head (oldest) <-> order2 <-> order3 <-> tail (newest)
//! ```
//!
//! New orders are appended at the tail, matching consumes from the head and
//! any order can be unlinked in O(1) by slab key. The nodes live in the
//! book's slab; the level only holds queue metadata.

use slab::Slab;

use crate::orderbook::OrderNode;

/// A price level containing the orders at a single price.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// Price shared by every order at this level
    pub price: f64,

    /// Sum of the remaining quantity of the orders at this level
    pub total_quantity: f64,

    /// Oldest order, matched first
    pub head: Option<usize>,

    /// Newest order
    pub tail: Option<usize>,

    /// Number of orders at this level
    pub order_count: usize,
}

impl PriceLevel {
    /// Create an empty level at `price`
    pub fn new(price: f64) -> Self {
        Self {
            price,
            total_quantity: 0.0,
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Append the node at `key` to the tail of the queue.
    ///
    /// A key that is not in the slab is ignored.
    pub fn push_back(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let Some(node) = slab.get_mut(key) else {
            return;
        };
        let quantity = node.remaining();
        node.prev = self.tail;
        node.next = None;

        match self.tail.and_then(|tail| slab.get_mut(tail)) {
            Some(tail_node) => tail_node.next = Some(key),
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_quantity += quantity;
    }

    /// Unlink the node at `key` and return its remaining quantity.
    ///
    /// The node stays in the slab; the caller removes it.
    pub fn remove(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> f64 {
        let Some(node) = slab.get_mut(key) else {
            return 0.0;
        };
        let quantity = node.remaining();
        let prev_key = node.prev.take();
        let next_key = node.next.take();

        match prev_key.and_then(|prev| slab.get_mut(prev)) {
            Some(prev_node) => prev_node.next = next_key,
            None => self.head = next_key,
        }

        match next_key.and_then(|next| slab.get_mut(next)) {
            Some(next_node) => next_node.prev = prev_key,
            None => self.tail = prev_key,
        }

        self.order_count = self.order_count.saturating_sub(1);
        self.reduce_quantity(quantity);
        quantity
    }

    /// Oldest order's slab key
    #[inline]
    pub fn peek_head(&self) -> Option<usize> {
        self.head
    }

    /// Account for `filled_quantity` taken from an order at this level.
    ///
    /// The running total is floored at zero to absorb rounding drift.
    pub fn reduce_quantity(&mut self, filled_quantity: f64) {
        self.total_quantity = (self.total_quantity - filled_quantity).max(0.0);
        if self.order_count == 0 {
            self.total_quantity = 0.0;
        }
    }

    /// Slab keys from head to tail
    pub fn keys<'a>(&self, slab: &'a Slab<OrderNode>) -> LevelIter<'a> {
        LevelIter {
            slab,
            cursor: self.head,
        }
    }
}

/// Walks a level's queue in priority order.
pub struct LevelIter<'a> {
    slab: &'a Slab<OrderNode>,
    cursor: Option<usize>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = (usize, &'a OrderNode);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        let node = self.slab.get(key)?;
        self.cursor = node.next;
        Some((key, node))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
