//! Matching engine for the goods exchange.
//!
//! ## Matching Rules
//!
//! - **Buy orders** match against asks (lowest price first)
//! - **Sell orders** match against bids (highest price first)
//! - **Price-time priority**: best price first, then FIFO
//! - **Fill price** is the resting order's price
//! - **Unfilled quantity** rests on the book at the incoming limit
//!
//! Matching is synchronous and deterministic: the same orders submitted in
//! the same sequence produce the same fills and the same book.
//!
//! ## Example
//!
//! ```
//! use goods_exchange::engine::{MatchingEngine, NoSettlement};
//! use goods_exchange::orderbook::AuctionHouse;
//! use goods_exchange::types::{AgentId, GoodId, MarketId};
//!
//! let mut house = AuctionHouse::new(MarketId(1));
//! let mut engine = MatchingEngine::new();
//!
//! // Resting sell: 10 units at 5.0
//! engine.sell_good(&mut house, AgentId(1), GoodId(0), 5.0, 10.0, &mut NoSettlement).unwrap();
//!
//! // Incoming buy for 4 units crosses it
//! let result = engine
//!     .buy_good(&mut house, AgentId(2), GoodId(0), 5.0, 4.0, &mut NoSettlement)
//!     .unwrap();
//!
//! assert!(result.is_fulfilled());
//! assert_eq!(house.supply(GoodId(0)), 6.0);
//! ```

pub mod matcher;

pub use matcher::{FillStatus, MatchResult, MatchingEngine, NoSettlement, Settlement};
