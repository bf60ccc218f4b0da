//! Market participants: whatever decides what to buy and sell each tick.

use crate::market::Market;
use crate::types::{AgentId, Fill, GoodId, OrderRequest, Side};

/// An agent trading at a market center.
///
/// Each tick the center asks every participant, in registration order, for
/// its orders, then tells both sides of every fill.
pub trait Participant {
    fn id(&self) -> AgentId;

    /// Orders to submit this tick, given last tick's market state.
    fn plan(&mut self, market: &Market, tick: u64) -> Vec<OrderRequest>;

    /// Called once for every fill this participant is party to.
    fn on_fill(&mut self, _fill: &Fill) {}
}

/// Quotes one good on one side every tick around the market price.
///
/// Buyers bid `price * (1 + spread)`, sellers ask `price * (1 - spread)`.
/// Until the market has a price for the good, `fallback_price` is used.
#[derive(Debug, Clone)]
pub struct Trader {
    id: AgentId,
    good: GoodId,
    side: Side,
    quantity: f64,
    spread: f64,
    fallback_price: f64,
    /// Quantity traded so far
    traded: f64,
    /// `sum(price * quantity)` traded so far
    notional: f64,
}

impl Trader {
    pub fn new(id: AgentId, good: GoodId, side: Side, quantity: f64, fallback_price: f64) -> Self {
        Self {
            id,
            good,
            side,
            quantity,
            spread: 0.0,
            fallback_price,
            traded: 0.0,
            notional: 0.0,
        }
    }

    pub fn buyer(id: AgentId, good: GoodId, quantity: f64, fallback_price: f64) -> Self {
        Self::new(id, good, Side::Buy, quantity, fallback_price)
    }

    pub fn seller(id: AgentId, good: GoodId, quantity: f64, fallback_price: f64) -> Self {
        Self::new(id, good, Side::Sell, quantity, fallback_price)
    }

    /// Fraction by which quotes lean toward the other side
    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    pub fn traded(&self) -> f64 {
        self.traded
    }

    pub fn notional(&self) -> f64 {
        self.notional
    }

    fn quote(&self, market: &Market) -> f64 {
        let price = market.price(self.good);
        let reference = if price > 0.0 { price } else { self.fallback_price };
        match self.side {
            Side::Buy => reference * (1.0 + self.spread),
            Side::Sell => reference * (1.0 - self.spread),
        }
    }
}

impl Participant for Trader {
    fn id(&self) -> AgentId {
        self.id
    }

    fn plan(&mut self, market: &Market, _tick: u64) -> Vec<OrderRequest> {
        vec![OrderRequest {
            agent: self.id,
            good: self.good,
            side: self.side,
            price: self.quote(market),
            quantity: self.quantity,
        }]
    }

    fn on_fill(&mut self, fill: &Fill) {
        self.traded += fill.quantity;
        self.notional += fill.notional();
    }
}

/// Replays a fixed list of orders every tick and keeps every fill it sees.
///
/// Used in tests and for agents driven from outside the simulation.
#[derive(Debug, Clone, Default)]
pub struct ScriptedParticipant {
    id: AgentId,
    orders: Vec<OrderRequest>,
    fills: Vec<Fill>,
}

impl ScriptedParticipant {
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Add an order placed every tick
    pub fn with_order(mut self, side: Side, good: GoodId, price: f64, quantity: f64) -> Self {
        self.orders.push(OrderRequest {
            agent: self.id,
            good,
            side,
            price,
            quantity,
        });
        self
    }

    /// Fills received so far
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }
}

impl Participant for ScriptedParticipant {
    fn id(&self) -> AgentId {
        self.id
    }

    fn plan(&mut self, _market: &Market, _tick: u64) -> Vec<OrderRequest> {
        self.orders.clone()
    }

    fn on_fill(&mut self, fill: &Fill) {
        self.fills.push(fill.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarketId;

    const WOOD: GoodId = GoodId(1);

    fn fill(quantity: f64, price: f64) -> Fill {
        Fill {
            id: 1,
            good: WOOD,
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
    fn test_trader_uses_fallback_until_priced() {
        let mut buyer = Trader::buyer(AgentId(1), WOOD, 2.0, 5.0).with_spread(0.1);
        let market = Market::new(MarketId(1), 1);

        let orders = buyer.plan(&market, 0);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, Side::Buy);
        assert!((orders[0].price - 5.5).abs() < 1e-12);
        assert_eq!(orders[0].quantity, 2.0);

        let market = market.with_prices([(WOOD, 10.0)].into_iter().collect());
        let orders = buyer.plan(&market, 1);
        assert!((orders[0].price - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_trader_seller_quotes_below() {
        let mut seller = Trader::seller(AgentId(2), WOOD, 1.0, 4.0).with_spread(0.25);
        let market = Market::new(MarketId(1), 1);
        assert_eq!(seller.plan(&market, 0)[0].price, 3.0);
    }

    #[test]
    fn test_trader_tracks_fills() {
        let mut trader = Trader::buyer(AgentId(1), WOOD, 2.0, 5.0);
        trader.on_fill(&fill(1.0, 2.0));
        trader.on_fill(&fill(0.5, 4.0));
        assert_eq!(trader.traded(), 1.5);
        assert_eq!(trader.notional(), 4.0);
    }

    #[test]
    fn test_scripted_participant_replays() {
        let mut p = ScriptedParticipant::new(AgentId(9)).with_order(Side::Sell, WOOD, 1.0, 3.0);
        let market = Market::new(MarketId(1), 1);

        assert_eq!(p.plan(&market, 0), p.plan(&market, 1));
        assert_eq!(p.plan(&market, 0)[0].agent, AgentId(9));

        p.on_fill(&fill(1.0, 1.0));
        assert_eq!(p.fills().len(), 1);
    }
}
