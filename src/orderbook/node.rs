//! Order node for slab-based storage.
//!
//! `OrderNode` wraps an [`Order`] with doubly-linked list pointers so an order
//! can be unlinked from its price level in O(1) given its slab key. The
//! pointers are slab keys, not references; keys may be reused after
//! `slab.remove()`.

use crate::types::{AgentId, Order, Side};

/// Order node stored in the slab.
///
/// - `prev` points to the older neighbour in the level (None at the head)
/// - `next` points to the newer neighbour (None at the tail)
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The resting order
    pub order: Order,

    /// Next (newer) order in the price level queue
    pub next: Option<usize>,

    /// Previous (older) order in the price level queue
    pub prev: Option<usize>,
}

impl OrderNode {
    /// Create a new, unlinked order node
    ///
    /// ```
    /// use goods_exchange::orderbook::OrderNode;
    /// use goods_exchange::types::{AgentId, GoodId, Order, Side};
    ///
    /// let order = Order::new(1, AgentId(3), GoodId(0), Side::Buy, 5.0, 2.0, 0);
    /// let node = OrderNode::new(order);
    ///
    /// assert!(node.is_unlinked());
    /// ```
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
        }
    }

    /// Check if this node is not linked to any neighbour
    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }

    #[inline]
    pub fn order_id(&self) -> u64 {
        self.order.id
    }

    #[inline]
    pub fn agent(&self) -> AgentId {
        self.order.agent
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.order.side
    }

    #[inline]
    pub fn price(&self) -> f64 {
        self.order.price
    }

    #[inline]
    pub fn remaining(&self) -> f64 {
        self.order.remaining
    }

    /// Fill a portion of this order, returning the quantity actually filled
    #[inline]
    pub fn fill(&mut self, quantity: f64) -> f64 {
        self.order.fill(quantity)
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.order.is_filled()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GoodId;

    fn create_test_order(id: u64, price: f64, quantity: f64) -> Order {
        Order::new(id, AgentId(100), GoodId(1), Side::Sell, price, quantity, 0)
    }

    #[test]
    fn test_order_node_accessors() {
        let node = OrderNode::new(create_test_order(42, 3.25, 8.0));

        assert_eq!(node.order_id(), 42);
        assert_eq!(node.agent(), AgentId(100));
        assert_eq!(node.side(), Side::Sell);
        assert_eq!(node.price(), 3.25);
        assert_eq!(node.remaining(), 8.0);
        assert!(!node.is_filled());
    }

    #[test]
    fn test_order_node_fill_keeps_price() {
        let mut node = OrderNode::new(create_test_order(1, 5.0, 10.0));

        assert_eq!(node.fill(4.0), 4.0);
        assert_eq!(node.remaining(), 6.0);
        assert_eq!(node.price(), 5.0);

        // Overfill is capped
        assert_eq!(node.fill(100.0), 6.0);
        assert!(node.is_filled());
    }

    #[test]
    fn test_order_node_linking() {
        let mut node = OrderNode::new(create_test_order(1, 5.0, 1.0));
        assert!(node.is_unlinked());

        node.next = Some(2);
        assert!(!node.is_unlinked());

        node.next = None;
        node.prev = Some(0);
        assert!(!node.is_unlinked());
    }
}
