//! Core data types for the goods exchange.
//!
//! ## Types
//!
//! - [`GoodId`], [`AgentId`], [`MarketId`]: opaque identifiers supplied by the host simulation
//! - [`Order`]: a resting limit order for one good
//! - [`Side`]: Buy or Sell
//! - [`OrderRequest`]: what a participant submits before an id is assigned
//! - [`Fill`]: quantity crossed between a buyer and a seller
//! - [`TickReceipt`]: per-tick summary of one market's matching pass
//!
//! ## Numeric Representation
//!
//! Prices and quantities are `f64`, matching the rest of the simulation's
//! accounting. The [`price`] module quantizes them to fixed-point `u64`
//! (scaled by 10^8) wherever a deterministic byte encoding is needed.

mod ids;
mod order;
mod fill;
mod receipt;
pub mod price;

// Re-export all types at module level
pub use ids::{AgentId, GoodId, MarketId};
pub use order::{Order, OrderRequest, Side};
pub use fill::Fill;
pub use receipt::TickReceipt;
