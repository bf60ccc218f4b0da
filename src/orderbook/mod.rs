//! Order books for the goods exchange.
//!
//! ## Architecture
//!
//! Each good traded at a market center has its own limit order book:
//!
//! - **Slab-based storage**: O(1) order insertion, removal, and lookup
//! - **Price levels**: orders grouped by price in a `BTreeMap`
//! - **Price-time priority**: FIFO ordering at each price level
//!
//! ## Components
//!
//! - [`PriceKey`]: totally ordered `f64` price used as a map key
//! - [`OrderNode`]: wrapper around `Order` with linked-list pointers
//! - [`PriceLevel`]: FIFO queue of the orders at one price
//! - [`OrderBook`]: bid and ask sides for one good
//! - [`AuctionHouse`]: one market's books plus its id [`Sequencer`]
//! - [`RestingOrderRecord`]: fixed-point SSZ record hashed into state roots
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Add order | O(log n) |
//! | Cancel order by ID | O(log n) |
//! | Reduce resting order | O(log n) |
//! | Best bid/ask, front | O(1)* |
//!
//! *First entry of the level map

pub mod key;
pub mod node;
pub mod level;
pub mod record;
pub mod book;
pub mod house;

pub use key::PriceKey;
pub use node::OrderNode;
pub use level::{LevelIter, PriceLevel};
pub use record::RestingOrderRecord;
pub use book::{BookSnapshot, DepthLevel, OrderBook};
pub use house::{AuctionHouse, HouseSnapshot, Sequencer};
