//! # Goods Exchange
//!
//! Tick-driven double auction for clearing goods between the agents of an
//! economic simulation.
//!
//! ## Architecture
//!
//! - **Ledger**: [`ResourceLedger`], a sparse good-to-quantity map with
//!   element-wise arithmetic
//! - **OrderBook**: one price-time priority book per good, grouped per
//!   market in an [`AuctionHouse`]
//! - **Engine**: [`MatchingEngine`], matching incoming buys and sells against
//!   resting orders at the resting price
//! - **Market**: per-tick demand, supply and volume, and the price update at
//!   the end of each tick
//! - **Sim**: market centers, participants and the tick driver
//!
//! ## Determinism
//!
//! Matching has no clock and no randomness. The same orders in the same
//! order produce the same fills and the same state root, which is hashed
//! over fixed-point (10^8) quantized prices and quantities.

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: ids, orders, fills, tick receipts
pub mod types;

/// Error type shared by the engine and the simulation
pub mod error;

/// Sparse per-good quantity ledger
pub mod ledger;

/// Order books and the auction house
pub mod orderbook;

/// Matching engine
pub mod engine;

/// Per-tick market statistics and pricing
pub mod market;

/// YAML configuration
pub mod config;

/// Market centers, participants and the tick driver
pub mod sim;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::{ConfigError, EngineConfig};
pub use engine::{MatchResult, MatchingEngine, NoSettlement, Settlement};
pub use error::MarketError;
pub use ledger::ResourceLedger;
pub use market::Market;
pub use orderbook::{AuctionHouse, OrderBook};
pub use sim::{MarketCenter, Participant, Simulation, TickReport};
pub use types::{AgentId, Fill, GoodId, MarketId, Order, OrderRequest, Side, TickReceipt};
