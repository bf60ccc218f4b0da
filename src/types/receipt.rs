//! Tick receipt summarizing one market's matching pass.
//!
//! The receipt carries the state root of the market's auction house after the
//! tick, so two runs fed the same orders can be compared byte for byte.

use ssz_rs::prelude::*;

/// Receipt for one market center after one tick.
///
/// ## State Root
///
/// The 32-byte state root is a SHA-256 hash over every resting order in the
/// market's books, see [`AuctionHouse::state_root`](crate::AuctionHouse::state_root).
///
/// ## Example
///
/// ```
/// use goods_exchange::types::TickReceipt;
///
/// let receipt = TickReceipt::new(
///     1,          // market_id
///     42,         // tick
///     10,         // orders_processed
///     4,          // fills_executed
///     [0u8; 32],  // state_root
/// );
/// assert_eq!(receipt.fill_rate(), Some(0.4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct TickReceipt {
    /// Market center the receipt belongs to
    pub market_id: u64,

    /// Tick the matching pass ran on
    pub tick: u64,

    /// Number of orders accepted by the engine during the tick
    pub orders_processed: u64,

    /// Number of fills produced during the tick
    pub fills_executed: u64,

    /// Auction house state root after the tick (SHA-256, 32 bytes)
    pub state_root: [u8; 32],
}

impl TickReceipt {
    /// Create a new tick receipt
    pub fn new(
        market_id: u64,
        tick: u64,
        orders_processed: u64,
        fills_executed: u64,
        state_root: [u8; 32],
    ) -> Self {
        Self {
            market_id,
            tick,
            orders_processed,
            fills_executed,
            state_root,
        }
    }

    /// State root as lowercase hex
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }

    pub fn is_empty(&self) -> bool {
        self.orders_processed == 0
    }

    /// Fills per processed order
    ///
    /// Returns None if no orders were processed.
    pub fn fill_rate(&self) -> Option<f64> {
        if self.orders_processed == 0 {
            None
        } else {
            Some(self.fills_executed as f64 / self.orders_processed as f64)
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
