//! Tick-driven simulation around the matching engine.
//!
//! A [`Simulation`] owns any number of [`MarketCenter`]s. Each tick, every
//! center asks its [`Participant`]s for orders, matches them through its
//! auction house, then closes its market so prices move for the next tick.
//!
//! ```
//! use goods_exchange::config::EngineConfig;
//! use goods_exchange::sim::{MarketCenter, Simulation, Trader};
//! use goods_exchange::types::{AgentId, GoodId, MarketId};
//!
//! let config = EngineConfig::default();
//! let mut center = MarketCenter::new(MarketId(1), &config);
//! center.add_participant(Box::new(Trader::seller(AgentId(1), GoodId(1), 5.0, 2.0)));
//! center.add_participant(Box::new(Trader::buyer(AgentId(2), GoodId(1), 5.0, 2.0)));
//!
//! let mut sim = Simulation::new();
//! sim.add_center(center);
//! let reports = sim.run(3).unwrap();
//! assert_eq!(reports.len(), 3);
//! ```

mod center;
mod clock;
mod participant;
mod simulation;

pub use center::{MarketCenter, TickReport};
pub use clock::TickClock;
pub use participant::{Participant, ScriptedParticipant, Trader};
pub use simulation::Simulation;
