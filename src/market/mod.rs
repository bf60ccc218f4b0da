//! Market aggregator: per-market-center price, demand and supply statistics.
//!
//! ## Tick Lifecycle
//!
//! 1. During the tick, every submitted order is folded into `demand` or
//!    `supply` with [`Market::record_order`], and every fill into `volume`
//!    and `turnover` with [`Market::record_fill`].
//! 2. [`Market::close_tick`] then reprices every known good: a good that
//!    traded takes its volume-weighted clearing price; one that did not is
//!    nudged up or down by its supply/demand ratio.
//! 3. The tick's ledgers are snapshotted into a bounded history, demand and
//!    supply move to `previous_*` and the per-tick ledgers are cleared.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PricingConfig;
use crate::ledger::ResourceLedger;
use crate::types::{AgentId, Fill, GoodId, MarketId, Side};

/// Why a good's price moved at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceMove {
    /// Traded this tick; price set to the clearing price
    Cleared,
    /// Demand exceeded supply
    Raised,
    /// Supply exceeded demand
    Lowered,
}

/// One good's repricing at tick close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub good: GoodId,
    pub old: f64,
    pub new: f64,
    /// Supply/demand ratio the decision was based on
    pub sd_ratio: f64,
    pub movement: PriceMove,
}

/// Market statistics for one closed tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub tick: u64,
    /// Prices after repricing
    pub prices: ResourceLedger,
    pub demand: ResourceLedger,
    pub supply: ResourceLedger,
    pub volume: ResourceLedger,
    pub sd_ratio: ResourceLedger,
    pub deficit: f64,
}

/// Supply over demand, checking the divisor first.
///
/// No demand is an infinite glut (even with no supply); no supply against
/// some demand is a ratio of 0.
pub fn supply_demand_ratio(supply: f64, demand: f64) -> f64 {
    if demand == 0.0 {
        f64::INFINITY
    } else if supply == 0.0 {
        0.0
    } else {
        supply / demand
    }
}

/// Aggregate state of one market center.
#[derive(Debug, Clone)]
pub struct Market {
    id: MarketId,
    participants: BTreeSet<AgentId>,

    prices: ResourceLedger,
    demand: ResourceLedger,
    supply: ResourceLedger,
    volume: ResourceLedger,
    turnover: ResourceLedger,

    /// Ratios computed at the last close
    sd_ratio: ResourceLedger,
    previous_demand: ResourceLedger,
    previous_supply: ResourceLedger,

    chronic_shortages: ResourceLedger,
    deficit: f64,
    last_deficit: f64,

    history: VecDeque<MarketSnapshot>,
    history_len: usize,
}

impl Market {
    /// Create a market keeping up to `history_len` closed ticks.
    pub fn new(id: MarketId, history_len: usize) -> Self {
        Self {
            id,
            participants: BTreeSet::new(),
            prices: ResourceLedger::new(),
            demand: ResourceLedger::new(),
            supply: ResourceLedger::new(),
            volume: ResourceLedger::new(),
            turnover: ResourceLedger::new(),
            sd_ratio: ResourceLedger::new(),
            previous_demand: ResourceLedger::new(),
            previous_supply: ResourceLedger::new(),
            chronic_shortages: ResourceLedger::new(),
            deficit: 0.0,
            last_deficit: 0.0,
            history: VecDeque::with_capacity(history_len),
            history_len,
        }
    }

    /// Seed initial prices
    pub fn with_prices(mut self, prices: ResourceLedger) -> Self {
        self.prices = prices;
        self
    }

    #[inline]
    pub fn id(&self) -> MarketId {
        self.id
    }

    // ========================================================================
    // Participants
    // ========================================================================

    /// Returns false if the agent was already a participant.
    pub fn add_participant(&mut self, agent: AgentId) -> bool {
        self.participants.insert(agent)
    }

    /// Returns false if the agent was not a participant.
    pub fn remove_participant(&mut self, agent: AgentId) -> bool {
        self.participants.remove(&agent)
    }

    pub fn is_participant(&self, agent: AgentId) -> bool {
        self.participants.contains(&agent)
    }

    /// Participants in id order
    pub fn participants(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.participants.iter().copied()
    }

    // ========================================================================
    // Ledgers
    // ========================================================================

    /// Current price of `good`, 0 if never priced
    pub fn price(&self, good: GoodId) -> f64 {
        self.prices.get(good)
    }

    pub fn set_price(&mut self, good: GoodId, price: f64) {
        self.prices.set(good, price);
    }

    pub fn prices(&self) -> &ResourceLedger {
        &self.prices
    }

    /// Quantity wanted this tick
    pub fn demand(&self) -> &ResourceLedger {
        &self.demand
    }

    /// Quantity offered this tick
    pub fn supply(&self) -> &ResourceLedger {
        &self.supply
    }

    /// Quantity traded this tick
    pub fn volume(&self) -> &ResourceLedger {
        &self.volume
    }

    /// `price * quantity` traded this tick
    pub fn turnover(&self) -> &ResourceLedger {
        &self.turnover
    }

    /// Supply/demand ratios from the last closed tick
    pub fn sd_ratios(&self) -> &ResourceLedger {
        &self.sd_ratio
    }

    pub fn previous_demand(&self) -> &ResourceLedger {
        &self.previous_demand
    }

    pub fn previous_supply(&self) -> &ResourceLedger {
        &self.previous_supply
    }

    /// Accumulated shortage level of persistently undersupplied goods
    pub fn chronic_shortages(&self) -> &ResourceLedger {
        &self.chronic_shortages
    }

    /// Cumulative `(demand - supply) * price` over all closed ticks
    pub fn deficit(&self) -> f64 {
        self.deficit
    }

    /// `(demand - supply) * price` of the last closed tick
    pub fn last_deficit(&self) -> f64 {
        self.last_deficit
    }

    /// Closed ticks, oldest first
    pub fn history(&self) -> impl Iterator<Item = &MarketSnapshot> + '_ {
        self.history.iter()
    }

    pub fn last_snapshot(&self) -> Option<&MarketSnapshot> {
        self.history.back()
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Fold a submitted order's quantity into demand (buy) or supply (sell).
    pub fn record_order(&mut self, side: Side, good: GoodId, quantity: f64) {
        match side {
            Side::Buy => *self.demand.entry(good) += quantity,
            Side::Sell => *self.supply.entry(good) += quantity,
        }
    }

    pub fn add_supply(&mut self, supply: &ResourceLedger) {
        self.supply += supply;
    }

    pub fn add_supply_scaled(&mut self, supply: &ResourceLedger, multiplier: f64) {
        self.supply.multiply_add(supply, multiplier);
    }

    pub fn add_demand(&mut self, demand: &ResourceLedger) {
        self.demand += demand;
    }

    pub fn add_demand_scaled(&mut self, demand: &ResourceLedger, multiplier: f64) {
        self.demand.multiply_add(demand, multiplier);
    }

    /// Fold a fill into the tick's volume and turnover.
    pub fn record_fill(&mut self, fill: &Fill) {
        *self.volume.entry(fill.good) += fill.quantity;
        *self.turnover.entry(fill.good) += fill.notional();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Volume-weighted price of `good` this tick, None if it did not trade
    pub fn clearing_price(&self, good: GoodId) -> Option<f64> {
        let volume = self.volume.get(good);
        if volume > 0.0 {
            Some(self.turnover.get(good) / volume)
        } else {
            None
        }
    }

    /// Supply/demand ratio of `good` from this tick's ledgers.
    ///
    /// See [`supply_demand_ratio`] for the zero cases.
    pub fn sd_ratio(&self, good: GoodId) -> f64 {
        supply_demand_ratio(self.supply.get(good), self.demand.get(good))
    }

    /// Value of `basket` at current prices
    pub fn basket_price(&self, basket: &ResourceLedger) -> f64 {
        basket.multiply_and_sum(&self.prices)
    }

    /// Turn a ledger of money amounts into quantities at current prices.
    ///
    /// Goods without a positive price are left unchanged.
    pub fn divide_by_prices(&self, ledger: &mut ResourceLedger) {
        for (good, amount) in ledger.iter().collect::<Vec<_>>() {
            let price = self.price(good);
            if price > 0.0 {
                ledger.set(good, amount / price);
            }
        }
    }

    /// Smallest last-tick supply/demand ratio among the goods in `ledger`.
    ///
    /// Goods with no recorded ratio count as infinitely supplied; an empty
    /// ledger yields infinity.
    pub fn lowest_sd_ratio(&self, ledger: &ResourceLedger) -> f64 {
        ledger
            .goods()
            .map(|good| {
                if self.sd_ratio.contains(good) {
                    self.sd_ratio.get(good)
                } else {
                    f64::INFINITY
                }
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// Every good the market has seen
    fn known_goods(&self) -> BTreeSet<GoodId> {
        self.prices
            .goods()
            .chain(self.demand.goods())
            .chain(self.supply.goods())
            .chain(self.volume.goods())
            .collect()
    }

    // ========================================================================
    // Tick close
    // ========================================================================

    /// Reprice every known good, record the tick and reset the per-tick ledgers.
    ///
    /// Returns the goods whose price changed.
    pub fn close_tick(&mut self, tick: u64, pricing: &PricingConfig) -> Vec<PriceChange> {
        self.track_shortages(pricing);

        let mut changes = Vec::new();
        let mut ratios = ResourceLedger::new();

        for good in self.known_goods() {
            let sd_ratio = self.sd_ratio(good);
            ratios.set(good, sd_ratio);

            let old = self.price(good);
            let (new, movement) = match self.clearing_price(good) {
                Some(clearing) => (clearing, PriceMove::Cleared),
                None if sd_ratio < 1.0 => {
                    (old + pricing.increase_base + old * pricing.increase_rate, PriceMove::Raised)
                }
                None if sd_ratio > 1.0 => {
                    let lowered = old - pricing.decrease_base - old * pricing.decrease_rate;
                    (lowered.max(pricing.price_floor), PriceMove::Lowered)
                }
                None => continue,
            };

            self.prices.set(good, new);
            if new != old {
                debug!(market = %self.id, good = %good, old, new, sd_ratio, ?movement, "price moved");
                changes.push(PriceChange { good, old, new, sd_ratio, movement });
            }
        }

        self.sd_ratio = ratios;
        self.push_snapshot(tick);

        info!(
            market = %self.id,
            tick,
            goods = self.sd_ratio.len(),
            traded = self.volume.sum(),
            repriced = changes.len(),
            deficit = self.last_deficit,
            "market closed"
        );

        std::mem::swap(&mut self.demand, &mut self.previous_demand);
        std::mem::swap(&mut self.supply, &mut self.previous_supply);
        self.demand.clear();
        self.supply.clear();
        self.volume.clear();
        self.turnover.clear();

        changes
    }

    fn track_shortages(&mut self, pricing: &PricingConfig) {
        let mut deficit = 0.0;
        let goods: BTreeSet<GoodId> = self.demand.goods().chain(self.supply.goods()).collect();

        for good in goods {
            let demand = self.demand.get(good);
            let supply = self.supply.get(good);
            deficit += (demand - supply) * self.price(good);

            let shortage = if demand == 0.0 { 0.0 } else { (demand - supply) / demand };
            if shortage > pricing.shortage_threshold {
                *self.chronic_shortages.entry(good) += shortage;
            } else if shortage > 0.0 {
                if self.chronic_shortages.contains(good) {
                    *self.chronic_shortages.entry(good) += shortage;
                }
            } else if self.chronic_shortages.contains(good) {
                // Surplus: recover by the surplus fraction
                let level = self.chronic_shortages.entry(good);
                *level = (*level + shortage).max(0.0);
            }
        }

        self.last_deficit = deficit;
        self.deficit += deficit;
    }

    fn push_snapshot(&mut self, tick: u64) {
        if self.history_len == 0 {
            return;
        }
        while self.history.len() >= self.history_len {
            self.history.pop_front();
        }
        self.history.push_back(MarketSnapshot {
            tick,
            prices: self.prices.clone(),
            demand: self.demand.clone(),
            supply: self.supply.clone(),
            volume: self.volume.clone(),
            sd_ratio: self.sd_ratio.clone(),
            deficit: self.last_deficit,
        });
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::{approx_eq, EPSILON};

    const WOOD: GoodId = GoodId(1);
    const ORE: GoodId = GoodId(2);

    fn market() -> Market {
        Market::new(MarketId(1), 4)
    }

    fn fill(good: GoodId, price: f64, quantity: f64) -> Fill {
        Fill {
            id: 1,
            good,
            buyer: AgentId(1),
            seller: AgentId(2),
            buy_order_id: 1,
            sell_order_id: 2,
            aggressor: Side::Buy,
            price,
            quantity,
            tick: 0,
        }
    }

    #[test]
    fn test_participants() {
        let mut m = market();
        assert!(m.add_participant(AgentId(3)));
        assert!(m.add_participant(AgentId(1)));
        assert!(!m.add_participant(AgentId(3)));
        assert_eq!(m.participants().collect::<Vec<_>>(), vec![AgentId(1), AgentId(3)]);

        assert!(m.remove_participant(AgentId(3)));
        assert!(!m.remove_participant(AgentId(3)));
        assert!(!m.is_participant(AgentId(3)));
    }

    #[test]
    fn test_supply_demand_ratio_zero_cases() {
        assert_eq!(supply_demand_ratio(5.0, 0.0), f64::INFINITY);
        assert_eq!(supply_demand_ratio(0.0, 0.0), f64::INFINITY);
        assert_eq!(supply_demand_ratio(0.0, 5.0), 0.0);
        assert_eq!(supply_demand_ratio(6.0, 3.0), 2.0);
    }

    #[test]
    fn test_sd_ratio_matches_safe_division() {
        let mut m = market();
        m.record_order(Side::Sell, WOOD, 4.0);
        m.record_order(Side::Buy, WOOD, 2.0);
        m.record_order(Side::Buy, ORE, 1.0);

        let bulk = m.supply().safe_division(m.demand(), f64::INFINITY);
        assert_eq!(m.sd_ratio(WOOD), bulk.get(WOOD));
        assert_eq!(m.sd_ratio(ORE), bulk.get(ORE));
    }

    #[test]
    fn test_record_order_and_ledgers() {
        let mut m = market();
        m.record_order(Side::Buy, WOOD, 3.0);
        m.record_order(Side::Buy, WOOD, 1.0);
        m.record_order(Side::Sell, ORE, 2.0);
        m.add_supply(&[(WOOD, 1.0)].into_iter().collect());
        m.add_demand_scaled(&[(ORE, 2.0)].into_iter().collect(), 0.5);
        m.add_supply_scaled(&[(ORE, 2.0)].into_iter().collect(), 2.0);
        m.add_demand(&[(ORE, 1.0)].into_iter().collect());

        assert_eq!(m.demand().get(WOOD), 4.0);
        assert_eq!(m.supply().get(WOOD), 1.0);
        assert_eq!(m.supply().get(ORE), 6.0);
        assert_eq!(m.demand().get(ORE), 2.0);
    }

    #[test]
    fn test_clearing_price_is_vwap() {
        let mut m = market();
        assert!(m.clearing_price(WOOD).is_none());

        m.record_fill(&fill(WOOD, 2.0, 1.0));
        m.record_fill(&fill(WOOD, 5.0, 3.0));

        assert_eq!(m.volume().get(WOOD), 4.0);
        assert_eq!(m.turnover().get(WOOD), 17.0);
        assert_eq!(m.clearing_price(WOOD), Some(4.25));
    }

    #[test]
    fn test_close_tick_uses_clearing_price() {
        let mut m = market().with_prices([(WOOD, 1.0)].into_iter().collect());
        m.record_order(Side::Buy, WOOD, 10.0);
        m.record_order(Side::Sell, WOOD, 1.0);
        m.record_fill(&fill(WOOD, 3.0, 1.0));

        let changes = m.close_tick(1, &PricingConfig::default());

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].movement, PriceMove::Cleared);
        assert_eq!(m.price(WOOD), 3.0);
    }

    #[test]
    fn test_close_tick_raises_price_under_excess_demand() {
        let mut m = market().with_prices([(WOOD, 10.0)].into_iter().collect());
        m.record_order(Side::Buy, WOOD, 5.0);
        m.record_order(Side::Sell, WOOD, 1.0);

        let changes = m.close_tick(1, &PricingConfig::default());

        // 10 + 0.02 + 10 * 0.01
        assert!(approx_eq(m.price(WOOD), 10.12, EPSILON));
        assert_eq!(changes[0].movement, PriceMove::Raised);
        assert_eq!(changes[0].sd_ratio, 0.2);
    }

    #[test]
    fn test_close_tick_lowers_price_under_excess_supply() {
        let mut m = market().with_prices([(WOOD, 10.0)].into_iter().collect());
        m.record_order(Side::Sell, WOOD, 5.0);

        let changes = m.close_tick(1, &PricingConfig::default());

        // No demand: infinite ratio. 10 - 0.01 - 10 * 0.01
        assert!(approx_eq(m.price(WOOD), 9.89, EPSILON));
        assert_eq!(changes[0].movement, PriceMove::Lowered);
        assert_eq!(changes[0].sd_ratio, f64::INFINITY);
    }

    #[test]
    fn test_close_tick_price_floor() {
        let mut m = market().with_prices([(WOOD, 0.005)].into_iter().collect());
        m.record_order(Side::Sell, WOOD, 1.0);

        m.close_tick(1, &PricingConfig::default());

        assert_eq!(m.price(WOOD), 0.00001);
    }

    #[test]
    fn test_close_tick_balanced_keeps_price() {
        let mut m = market().with_prices([(WOOD, 2.0)].into_iter().collect());
        m.record_order(Side::Sell, WOOD, 3.0);
        m.record_order(Side::Buy, WOOD, 3.0);

        let changes = m.close_tick(1, &PricingConfig::default());

        assert!(changes.is_empty());
        assert_eq!(m.price(WOOD), 2.0);
        assert_eq!(m.sd_ratios().get(WOOD), 1.0);
    }

    #[test]
    fn test_idle_priced_good_drifts_down() {
        // Known but untraded: no demand reads as an infinite glut
        let mut m = market().with_prices([(ORE, 1.0)].into_iter().collect());
        m.close_tick(1, &PricingConfig::default());
        assert!(m.price(ORE) < 1.0);
    }

    #[test]
    fn test_close_tick_rolls_ledgers() {
        let mut m = market();
        m.record_order(Side::Buy, WOOD, 2.0);
        m.record_order(Side::Sell, WOOD, 1.0);
        m.record_fill(&fill(WOOD, 1.0, 1.0));

        m.close_tick(1, &PricingConfig::default());

        assert!(m.demand().is_empty());
        assert!(m.supply().is_empty());
        assert!(m.volume().is_empty());
        assert!(m.turnover().is_empty());
        assert_eq!(m.previous_demand().get(WOOD), 2.0);
        assert_eq!(m.previous_supply().get(WOOD), 1.0);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut m = market();
        for tick in 0..10 {
            m.record_order(Side::Buy, WOOD, 1.0);
            m.close_tick(tick, &PricingConfig::default());
        }

        let ticks: Vec<u64> = m.history().map(|s| s.tick).collect();
        assert_eq!(ticks, vec![6, 7, 8, 9]);
        assert_eq!(m.last_snapshot().map(|s| s.demand.get(WOOD)), Some(1.0));
    }

    #[test]
    fn test_zero_history_len_keeps_nothing() {
        let mut m = Market::new(MarketId(1), 0);
        m.close_tick(0, &PricingConfig::default());
        assert!(m.last_snapshot().is_none());
    }

    #[test]
    fn test_basket_price_and_divide_by_prices() {
        let m = market().with_prices([(WOOD, 2.0), (ORE, 4.0)].into_iter().collect());
        let basket: ResourceLedger = [(WOOD, 3.0), (ORE, 1.0)].into_iter().collect();
        assert_eq!(m.basket_price(&basket), 10.0);

        let mut budget: ResourceLedger = [(WOOD, 6.0), (ORE, 2.0)].into_iter().collect();
        m.divide_by_prices(&mut budget);
        assert_eq!(budget, [(WOOD, 3.0), (ORE, 0.5)].into_iter().collect::<ResourceLedger>());

        // No price yet: nothing to divide by
        let unpriced = GoodId(99);
        let mut budget: ResourceLedger = [(WOOD, 4.0), (unpriced, 5.0)].into_iter().collect();
        m.divide_by_prices(&mut budget);
        assert_eq!(budget.get(WOOD), 2.0);
        assert_eq!(budget.get(unpriced), 5.0);
        assert!(budget.iter().all(|(_, qty)| qty.is_finite()));
    }

    #[test]
    fn test_lowest_sd_ratio() {
        let mut m = market();
        m.record_order(Side::Sell, WOOD, 1.0);
        m.record_order(Side::Buy, WOOD, 4.0);
        m.record_order(Side::Sell, ORE, 3.0);
        m.record_order(Side::Buy, ORE, 1.0);
        m.close_tick(1, &PricingConfig::default());

        let inputs: ResourceLedger = [(WOOD, 1.0), (ORE, 1.0)].into_iter().collect();
        assert_eq!(m.lowest_sd_ratio(&inputs), 0.25);
        assert_eq!(m.lowest_sd_ratio(&ResourceLedger::new()), f64::INFINITY);
        assert_eq!(m.lowest_sd_ratio(&[(GoodId(99), 1.0)].into_iter().collect()), f64::INFINITY);
    }

    #[test]
    fn test_deficit_tracking() {
        let mut m = market().with_prices([(WOOD, 2.0)].into_iter().collect());
        m.record_order(Side::Buy, WOOD, 5.0);
        m.record_order(Side::Sell, WOOD, 2.0);
        m.close_tick(1, &PricingConfig::default());

        assert_eq!(m.last_deficit(), 6.0);
        assert_eq!(m.deficit(), 6.0);

        m.record_order(Side::Sell, WOOD, 1.0);
        m.close_tick(2, &PricingConfig::default());
        assert!(m.last_deficit() < 0.0);
        assert!(m.deficit() < 6.0);
    }

    #[test]
    fn test_chronic_shortages() {
        let pricing = PricingConfig::default();
        let mut m = market();

        // 90% short: above the 0.8 threshold
        m.record_order(Side::Buy, WOOD, 10.0);
        m.record_order(Side::Sell, WOOD, 1.0);
        m.close_tick(1, &pricing);
        assert!(approx_eq(m.chronic_shortages().get(WOOD), 0.9, EPSILON));

        // 50% short: below threshold but already chronic
        m.record_order(Side::Buy, WOOD, 2.0);
        m.record_order(Side::Sell, WOOD, 1.0);
        m.close_tick(2, &pricing);
        assert!(approx_eq(m.chronic_shortages().get(WOOD), 1.4, EPSILON));

        // 50% short on a good that was never chronic: not tracked
        m.record_order(Side::Buy, ORE, 2.0);
        m.record_order(Side::Sell, ORE, 1.0);
        m.close_tick(3, &pricing);
        assert!(!m.chronic_shortages().contains(ORE));

        // Surplus recovers, floored at zero
        m.record_order(Side::Buy, WOOD, 1.0);
        m.record_order(Side::Sell, WOOD, 3.0);
        m.close_tick(4, &pricing);
        assert_eq!(m.chronic_shortages().get(WOOD), 0.0);
    }
}
