//! The tick driver.

use tracing::{debug, info};

use crate::engine::{NoSettlement, Settlement};
use crate::sim::{MarketCenter, TickClock, TickReport};
use crate::types::MarketId;
use crate::MarketError;

/// Advances every market center one tick at a time.
///
/// Centers run in the order they were added. A paused simulation does not
/// advance its clock.
pub struct Simulation {
    centers: Vec<MarketCenter>,
    clock: TickClock,
    paused: bool,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            centers: Vec::new(),
            clock: TickClock::new(),
            paused: false,
        }
    }

    pub fn add_center(&mut self, center: MarketCenter) {
        debug!(market = %center.id(), "market center added");
        self.centers.push(center);
    }

    pub fn centers(&self) -> &[MarketCenter] {
        &self.centers
    }

    pub fn center(&self, id: MarketId) -> Option<&MarketCenter> {
        self.centers.iter().find(|c| c.id() == id)
    }

    pub fn center_mut(&mut self, id: MarketId) -> Option<&mut MarketCenter> {
        self.centers.iter_mut().find(|c| c.id() == id)
    }

    /// The tick the next step will run
    #[inline]
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Run one tick with fills going nowhere but the participants.
    pub fn step(&mut self) -> Result<Option<Vec<TickReport>>, MarketError> {
        self.step_with(&mut NoSettlement)
    }

    /// Run one tick across all centers.
    ///
    /// Returns `Ok(None)` while paused.
    ///
    /// # Errors
    ///
    /// [`MarketError::TickOverflow`] when the clock is exhausted, or any
    /// error from a center. The clock has already advanced in the latter case.
    pub fn step_with<S: Settlement + ?Sized>(
        &mut self,
        settlement: &mut S,
    ) -> Result<Option<Vec<TickReport>>, MarketError> {
        if self.paused {
            return Ok(None);
        }

        let tick = self.clock.tick();
        self.clock.advance()?;

        let reports = self
            .centers
            .iter_mut()
            .map(|center| center.run_tick(tick, &mut *settlement))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(reports))
    }

    /// Run up to `ticks` ticks, stopping early if paused.
    pub fn run(&mut self, ticks: u64) -> Result<Vec<TickReport>, MarketError> {
        let start = self.clock.tick();
        let mut reports = Vec::new();
        for _ in 0..ticks {
            match self.step()? {
                Some(step) => reports.extend(step),
                None => break,
            }
        }
        info!(
            from = start,
            to = self.clock.tick(),
            centers = self.centers.len(),
            "simulation run finished"
        );
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::sim::{ScriptedParticipant, Trader};
    use crate::types::{AgentId, GoodId, Side};

    const FOOD: GoodId = GoodId(1);

    fn simulation() -> Simulation {
        let config = EngineConfig::default();
        let mut center = MarketCenter::new(MarketId(1), &config);
        center.add_participant(Box::new(Trader::seller(AgentId(1), FOOD, 2.0, 1.0)));
        center.add_participant(Box::new(Trader::buyer(AgentId(2), FOOD, 2.0, 1.0)));

        let mut sim = Simulation::new();
        sim.add_center(center);
        sim
    }

    #[test]
    fn test_step_advances_clock() {
        let mut sim = simulation();

        let reports = sim.step().unwrap().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].tick, 0);
        assert_eq!(sim.tick(), 1);

        let reports = sim.step().unwrap().unwrap();
        assert_eq!(reports[0].tick, 1);
    }

    #[test]
    fn test_paused_does_not_advance() {
        let mut sim = simulation();
        sim.pause();

        assert!(sim.is_paused());
        assert!(sim.step().unwrap().is_none());
        assert_eq!(sim.tick(), 0);
        assert!(sim.run(5).unwrap().is_empty());

        sim.resume();
        assert_eq!(sim.run(3).unwrap().len(), 3);
        assert_eq!(sim.tick(), 3);
    }

    #[test]
    fn test_centers_run_in_insertion_order() {
        let config = EngineConfig::default();
        let mut sim = Simulation::new();
        for id in [3, 1, 2] {
            let mut center = MarketCenter::new(MarketId(id), &config);
            center.add_participant(Box::new(
                ScriptedParticipant::new(AgentId(id)).with_order(Side::Sell, FOOD, 1.0, 1.0),
            ));
            sim.add_center(center);
        }

        let markets: Vec<_> = sim.step().unwrap().unwrap().iter().map(|r| r.market).collect();
        assert_eq!(markets, vec![MarketId(3), MarketId(1), MarketId(2)]);
        assert!(sim.center(MarketId(2)).is_some());
        assert!(sim.center_mut(MarketId(9)).is_none());
    }

    #[test]
    fn test_matching_traders_settle_every_tick() {
        let mut sim = simulation();
        let mut volume = 0.0;
        for _ in 0..10 {
            sim.step_with(&mut |f: &crate::types::Fill| volume += f.quantity).unwrap();
        }

        // Buyer bids above the seller's ask, so each tick clears fully
        assert_eq!(volume, 20.0);
        let center = sim.center(MarketId(1)).unwrap();
        assert_eq!(center.house().order_count(), 0);
        assert_eq!(center.market().history().count(), 10);
    }
}
