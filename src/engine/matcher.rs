//! Continuous double-auction matcher.
//!
//! ## Algorithm
//!
//! For an incoming order on `side` at limit `price`:
//!
//! 1. Validate price and quantity (finite, strictly positive, and small
//!    enough for the fixed-point state encoding).
//! 2. While quantity remains, peek the best order on the opposite side.
//!    Stop if there is none or it does not cross the limit.
//! 3. If the resting order is larger than what remains, decrement it in
//!    place and finish. Otherwise remove it, subtract its quantity and
//!    continue with the next one.
//! 4. Anything left rests on the book at the incoming order's price.
//!
//! Every crossing produces one [`Fill`] at the resting order's price, handed
//! to the caller's [`Settlement`] before the next crossing is attempted.
//!
//! Quantities are compared exactly, so float rounding can leave a resting
//! order with a remainder far below any real lot (0.1 + 0.2 against 0.3
//! leaves about 3e-17). Such dust shows up in `depth()` and `supply()` like
//! any other order.

use tracing::{debug, trace};

use crate::orderbook::AuctionHouse;
use crate::types::{AgentId, Fill, GoodId, Order, OrderRequest, Side, TickReceipt};
use crate::MarketError;

// ============================================================================
// Settlement
// ============================================================================

/// Receives every fill as it happens.
///
/// The engine moves no goods or money itself; whatever owns the agents'
/// inventories plugs in here. Any `FnMut(&Fill)` closure is a settlement.
///
/// ```
/// use goods_exchange::engine::{MatchingEngine, Settlement};
/// use goods_exchange::orderbook::AuctionHouse;
/// use goods_exchange::types::{AgentId, Fill, GoodId, MarketId};
///
/// let mut house = AuctionHouse::new(MarketId(1));
/// let mut engine = MatchingEngine::new();
/// let mut traded = 0.0;
///
/// engine.sell_good(&mut house, AgentId(1), GoodId(0), 2.0, 5.0, &mut |_: &Fill| {}).unwrap();
/// engine
///     .buy_good(&mut house, AgentId(2), GoodId(0), 2.0, 3.0, &mut |f: &Fill| traded += f.quantity)
///     .unwrap();
///
/// assert_eq!(traded, 3.0);
/// ```
pub trait Settlement {
    fn settle(&mut self, fill: &Fill);
}

impl<F> Settlement for F
where
    F: FnMut(&Fill),
{
    fn settle(&mut self, fill: &Fill) {
        self(fill)
    }
}

/// Settlement that ignores fills
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSettlement;

impl Settlement for NoSettlement {
    fn settle(&mut self, _fill: &Fill) {}
}

// ============================================================================
// MatchResult
// ============================================================================

/// How much of an incoming order traded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    /// Entire quantity traded; nothing rests
    Filled,
    /// Some quantity traded; the remainder rests
    PartiallyFilled,
    /// Nothing traded; the whole order rests
    Rested,
}

/// Outcome of submitting one order.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Id assigned to the incoming order (also the resting order's id)
    pub order_id: u64,
    pub good: GoodId,
    pub side: Side,
    pub status: FillStatus,
    /// Fills in execution order
    pub fills: Vec<Fill>,
    /// Sum of fill quantities
    pub filled_quantity: f64,
    /// Quantity left resting on the book
    pub rested_quantity: f64,
}

impl MatchResult {
    /// True when nothing was left to rest
    pub fn is_fulfilled(&self) -> bool {
        self.status == FillStatus::Filled
    }

    /// `sum(price * quantity)` over all fills
    pub fn notional(&self) -> f64 {
        self.fills.iter().map(Fill::notional).sum()
    }

    /// Volume-weighted fill price, None if nothing traded
    pub fn average_price(&self) -> Option<f64> {
        if self.filled_quantity > 0.0 {
            Some(self.notional() / self.filled_quantity)
        } else {
            None
        }
    }
}

// ============================================================================
// MatchingEngine
// ============================================================================

/// Matches incoming orders against an [`AuctionHouse`].
///
/// The engine holds no books; it carries the current tick and the counters
/// that go into the tick's [`TickReceipt`].
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    tick: u64,
    orders_processed: u64,
    fills_executed: u64,
    total_orders: u64,
    total_fills: u64,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new tick: stamp subsequent orders and fills with `tick` and
    /// reset the per-tick counters.
    pub fn begin_tick(&mut self, tick: u64) {
        self.tick = tick;
        self.orders_processed = 0;
        self.fills_executed = 0;
    }

    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Orders accepted since the last [`begin_tick`](Self::begin_tick)
    #[inline]
    pub fn orders_processed(&self) -> u64 {
        self.orders_processed
    }

    /// Fills produced since the last [`begin_tick`](Self::begin_tick)
    #[inline]
    pub fn fills_executed(&self) -> u64 {
        self.fills_executed
    }

    /// Orders accepted over the engine's lifetime
    #[inline]
    pub fn total_orders(&self) -> u64 {
        self.total_orders
    }

    /// Fills produced over the engine's lifetime
    #[inline]
    pub fn total_fills(&self) -> u64 {
        self.total_fills
    }

    /// Submit a buy order for `good`.
    ///
    /// Returns whether it was fulfilled inside the result; see [`submit`](Self::submit).
    pub fn buy_good<S: Settlement + ?Sized>(
        &mut self,
        house: &mut AuctionHouse,
        agent: AgentId,
        good: GoodId,
        price: f64,
        quantity: f64,
        settlement: &mut S,
    ) -> Result<MatchResult, MarketError> {
        self.submit(house, &OrderRequest::buy(agent, good, price, quantity), settlement)
    }

    /// Submit a sell order for `good`.
    pub fn sell_good<S: Settlement + ?Sized>(
        &mut self,
        house: &mut AuctionHouse,
        agent: AgentId,
        good: GoodId,
        price: f64,
        quantity: f64,
        settlement: &mut S,
    ) -> Result<MatchResult, MarketError> {
        self.submit(house, &OrderRequest::sell(agent, good, price, quantity), settlement)
    }

    /// Match `request` against the opposite side of its good's book and rest
    /// whatever does not trade.
    ///
    /// # Errors
    ///
    /// [`MarketError::InvalidOrder`] for a non-finite or non-positive price or
    /// quantity. The book is not touched and no id is consumed.
    pub fn submit<S: Settlement + ?Sized>(
        &mut self,
        house: &mut AuctionHouse,
        request: &OrderRequest,
        settlement: &mut S,
    ) -> Result<MatchResult, MarketError> {
        request.validate()?;

        let tick = self.tick;
        let (book, sequencer) = house.book_and_sequencer(request.good);
        let order_id = sequencer.next_order_id();
        let opposite = request.side.opposite();

        let mut remaining = request.quantity;
        let mut fills = Vec::new();

        while remaining > 0.0 {
            let Some(resting) = book.front(opposite) else {
                break;
            };
            if !request.side.crosses(request.price, resting.price) {
                break;
            }

            let resting_id = resting.id;
            let resting_agent = resting.agent;
            let resting_price = resting.price;
            let resting_remaining = resting.remaining;

            let traded = if resting_remaining > remaining {
                book.reduce(resting_id, remaining);
                let traded = remaining;
                remaining = 0.0;
                traded
            } else {
                book.pop_front(opposite);
                remaining -= resting_remaining;
                resting_remaining
            };

            let (buyer, seller, buy_order_id, sell_order_id) = match request.side {
                Side::Buy => (request.agent, resting_agent, order_id, resting_id),
                Side::Sell => (resting_agent, request.agent, resting_id, order_id),
            };
            let fill = Fill {
                id: sequencer.next_fill_id(),
                good: request.good,
                buyer,
                seller,
                buy_order_id,
                sell_order_id,
                aggressor: request.side,
                price: resting_price,
                quantity: traded,
                tick,
            };

            debug!(
                good = %fill.good,
                fill_id = fill.id,
                buyer = %fill.buyer,
                seller = %fill.seller,
                price = fill.price,
                quantity = fill.quantity,
                "fill"
            );
            settlement.settle(&fill);
            fills.push(fill);
        }

        let filled_quantity: f64 = fills.iter().map(|f| f.quantity).sum();
        let rested_quantity = remaining.max(0.0);

        if rested_quantity > 0.0 {
            let mut order = Order::new(
                order_id,
                request.agent,
                request.good,
                request.side,
                request.price,
                request.quantity,
                tick,
            );
            order.remaining = rested_quantity;
            book.add_order(order);
            trace!(
                good = %request.good,
                order_id,
                side = ?request.side,
                price = request.price,
                remaining = rested_quantity,
                "order rested"
            );
        }

        let status = match (fills.is_empty(), rested_quantity > 0.0) {
            (_, false) => FillStatus::Filled,
            (false, true) => FillStatus::PartiallyFilled,
            (true, true) => FillStatus::Rested,
        };

        self.orders_processed += 1;
        self.total_orders += 1;
        self.fills_executed += fills.len() as u64;
        self.total_fills += fills.len() as u64;

        Ok(MatchResult {
            order_id,
            good: request.good,
            side: request.side,
            status,
            fills,
            filled_quantity,
            rested_quantity,
        })
    }

    /// Receipt for the current tick, carrying `house`'s state root.
    pub fn receipt(&self, house: &AuctionHouse) -> Result<TickReceipt, MarketError> {
        Ok(TickReceipt::new(
            house.market_id().0,
            self.tick,
            self.orders_processed,
            self.fills_executed,
            house.state_root()?,
        ))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
