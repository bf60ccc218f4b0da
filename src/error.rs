//! Error types for the goods exchange.
//!
//! A limit order that does not (fully) match is not an error: it rests in the
//! book and the caller learns that from [`MatchResult`](crate::MatchResult).
//! Errors are reserved for input the engine refuses to touch and for internal
//! encoding failures.

/// Errors returned by the matching engine, auction house and tick driver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarketError {
    /// Price or quantity was zero, negative, NaN or infinite.
    #[error("invalid order: {reason}")]
    InvalidOrder {
        /// What was wrong with the order.
        reason: String,
    },

    /// The tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// A resting order could not be encoded for the state root.
    #[error("failed to encode book state: {0}")]
    Encoding(String),
}
