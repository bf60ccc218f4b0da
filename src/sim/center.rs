//! Market center: one auction house, its market statistics and participants.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::{EngineConfig, PricingConfig};
use crate::engine::{MatchResult, MatchingEngine, Settlement};
use crate::ledger::ResourceLedger;
use crate::market::{Market, PriceChange};
use crate::orderbook::AuctionHouse;
use crate::sim::Participant;
use crate::types::{AgentId, Fill, MarketId, OrderRequest, TickReceipt};
use crate::MarketError;

/// What happened at one market center during one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub market: MarketId,
    pub tick: u64,
    /// Orders accepted by the engine
    pub orders_submitted: usize,
    /// Orders refused as invalid
    pub orders_rejected: usize,
    /// Fills in execution order
    pub fills: Vec<Fill>,
    /// Quantity traded per good
    pub volume: ResourceLedger,
    pub price_changes: Vec<PriceChange>,
    pub receipt: TickReceipt,
}

/// A market center and everything that trades at it.
pub struct MarketCenter {
    house: AuctionHouse,
    engine: MatchingEngine,
    market: Market,
    participants: Vec<Box<dyn Participant>>,
    /// Agent to position in `participants`
    index: HashMap<AgentId, usize>,
    pricing: PricingConfig,
    reset_books_each_tick: bool,
}

impl MarketCenter {
    pub fn new(id: MarketId, config: &EngineConfig) -> Self {
        Self {
            house: AuctionHouse::with_capacity(id, config.simulation.book_capacity),
            engine: MatchingEngine::new(),
            market: Market::new(id, config.simulation.history_len),
            participants: Vec::new(),
            index: HashMap::new(),
            pricing: config.pricing.clone(),
            reset_books_each_tick: config.simulation.reset_books_each_tick,
        }
    }

    /// Seed the market's starting prices
    pub fn with_prices(mut self, prices: ResourceLedger) -> Self {
        self.market = self.market.with_prices(prices);
        self
    }

    #[inline]
    pub fn id(&self) -> MarketId {
        self.house.market_id()
    }

    pub fn house(&self) -> &AuctionHouse {
        &self.house
    }

    pub fn house_mut(&mut self) -> &mut AuctionHouse {
        &mut self.house
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    /// Register a participant. A participant with the same id replaces the
    /// old one in its slot.
    pub fn add_participant(&mut self, participant: Box<dyn Participant>) {
        let agent = participant.id();
        self.market.add_participant(agent);
        match self.index.get(&agent) {
            Some(&slot) => self.participants[slot] = participant,
            None => {
                self.index.insert(agent, self.participants.len());
                self.participants.push(participant);
            }
        }
    }

    /// Unregister a participant. Its resting orders stay on the books.
    pub fn remove_participant(&mut self, agent: AgentId) -> Option<Box<dyn Participant>> {
        let slot = self.index.remove(&agent)?;
        self.market.remove_participant(agent);
        let removed = self.participants.remove(slot);
        self.index = self
            .participants
            .iter()
            .enumerate()
            .map(|(slot, p)| (p.id(), slot))
            .collect();
        Some(removed)
    }

    pub fn participant(&self, agent: AgentId) -> Option<&dyn Participant> {
        let slot = *self.index.get(&agent)?;
        self.participants.get(slot).map(|p| p.as_ref())
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Submit an order from outside the participant loop.
    ///
    /// The order counts toward this tick's demand or supply and its fills
    /// reach any registered counterparty.
    pub fn submit<S: Settlement + ?Sized>(
        &mut self,
        request: &OrderRequest,
        settlement: &mut S,
    ) -> Result<MatchResult, MarketError> {
        let Self { house, engine, market, participants, index, .. } = self;

        let result = engine.submit(house, request, &mut |fill: &Fill| {
            market.record_fill(fill);
            notify(participants, index, fill);
            settlement.settle(fill);
        })?;
        market.record_order(request.side, request.good, request.quantity);
        Ok(result)
    }

    /// Run one tick: collect every participant's orders, match them in
    /// participant order, then close the market.
    ///
    /// Invalid orders are logged and counted, never fatal.
    ///
    /// # Errors
    ///
    /// Only [`MarketError::Encoding`] when the state root cannot be computed.
    pub fn run_tick<S: Settlement + ?Sized>(
        &mut self,
        tick: u64,
        settlement: &mut S,
    ) -> Result<TickReport, MarketError> {
        self.engine.begin_tick(tick);
        if self.reset_books_each_tick {
            self.house.clear();
        }

        let mut requests = Vec::new();
        for participant in self.participants.iter_mut() {
            requests.extend(participant.plan(&self.market, tick));
        }

        let mut fills = Vec::new();
        let mut submitted = 0;
        let mut rejected = 0;

        for request in &requests {
            match self.submit(request, settlement) {
                Ok(result) => {
                    submitted += 1;
                    fills.extend(result.fills);
                }
                Err(err) => {
                    rejected += 1;
                    warn!(
                        market = %self.id(),
                        tick,
                        agent = %request.agent,
                        good = %request.good,
                        error = %err,
                        "order rejected"
                    );
                }
            }
        }

        // Receipt first: a failure must leave the market open
        let receipt = self.engine.receipt(&self.house)?;
        let volume = self.market.volume().clone();
        let price_changes = self.market.close_tick(tick, &self.pricing);

        info!(
            market = %self.id(),
            tick,
            submitted,
            rejected,
            fills = fills.len(),
            resting = self.house.order_count(),
            state_root = %receipt.state_root_hex(),
            "tick complete"
        );

        Ok(TickReport {
            market: self.id(),
            tick,
            orders_submitted: submitted,
            orders_rejected: rejected,
            fills,
            volume,
            price_changes,
            receipt,
        })
    }
}

/// Tell both counterparties of `fill`, once each.
fn notify(participants: &mut [Box<dyn Participant>], index: &HashMap<AgentId, usize>, fill: &Fill) {
    let mut tell = |agent: AgentId| {
        if let Some(participant) = index.get(&agent).and_then(|&slot| participants.get_mut(slot)) {
            participant.on_fill(fill);
        }
    };
    tell(fill.buyer);
    if fill.seller != fill.buyer {
        tell(fill.seller);
    } else {
        debug!(agent = %fill.buyer, fill_id = fill.id, "self-trade");
    }
}
