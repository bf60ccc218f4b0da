//! Auction house: every order book of one market center.
//!
//! Books are created the first time a good is traded, so an unknown good is
//! simply an empty book. Order and fill ids come from one [`Sequencer`]
//! shared by all of the house's books.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ledger::ResourceLedger;
use crate::orderbook::{BookSnapshot, OrderBook};
use crate::types::{GoodId, MarketId, Order};
use crate::MarketError;

/// Monotonic id source for orders and fills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequencer {
    next_order_id: u64,
    next_fill_id: u64,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self {
            next_order_id: 1,
            next_fill_id: 1,
        }
    }
}

impl Sequencer {
    /// Take the next order id
    #[inline]
    pub fn next_order_id(&mut self) -> u64 {
        let id = self.next_order_id;
        self.next_order_id += 1;
        id
    }

    /// Take the next fill id
    #[inline]
    pub fn next_fill_id(&mut self) -> u64 {
        let id = self.next_fill_id;
        self.next_fill_id += 1;
        id
    }

    /// The id the next order will receive
    #[inline]
    pub fn peek_next_order_id(&self) -> u64 {
        self.next_order_id
    }
}

/// Every resting order of a house, book by book in good order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseSnapshot {
    pub market: MarketId,
    pub books: Vec<BookSnapshot>,
}

/// Order books of one market center, one per good.
///
/// ```
/// use goods_exchange::orderbook::AuctionHouse;
/// use goods_exchange::types::{GoodId, MarketId};
///
/// let mut house = AuctionHouse::new(MarketId(1));
/// assert!(house.book(GoodId(3)).is_none());
///
/// house.book_mut(GoodId(3));
/// assert!(house.book(GoodId(3)).is_some());
/// assert_eq!(house.demand(GoodId(3)), 0.0);
/// ```
#[derive(Debug)]
pub struct AuctionHouse {
    market: MarketId,
    books: BTreeMap<GoodId, OrderBook>,
    sequencer: Sequencer,
    /// Pre-allocated slots for each new book
    book_capacity: usize,
}

impl AuctionHouse {
    pub fn new(market: MarketId) -> Self {
        Self::with_capacity(market, 0)
    }

    /// Create a house whose books each pre-allocate `book_capacity` orders
    pub fn with_capacity(market: MarketId, book_capacity: usize) -> Self {
        Self {
            market,
            books: BTreeMap::new(),
            sequencer: Sequencer::default(),
            book_capacity,
        }
    }

    #[inline]
    pub fn market_id(&self) -> MarketId {
        self.market
    }

    /// Book for `good`, if it has ever been traded
    pub fn book(&self, good: GoodId) -> Option<&OrderBook> {
        self.books.get(&good)
    }

    /// Book for `good`, created empty on first use
    pub fn book_mut(&mut self, good: GoodId) -> &mut OrderBook {
        let capacity = self.book_capacity;
        self.books
            .entry(good)
            .or_insert_with(|| OrderBook::with_capacity(good, capacity))
    }

    /// Book for `good` together with the id sequencer, for the matcher.
    pub fn book_and_sequencer(&mut self, good: GoodId) -> (&mut OrderBook, &mut Sequencer) {
        let capacity = self.book_capacity;
        let book = self
            .books
            .entry(good)
            .or_insert_with(|| OrderBook::with_capacity(good, capacity));
        (book, &mut self.sequencer)
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Goods with a book, in id order
    pub fn goods(&self) -> impl Iterator<Item = GoodId> + '_ {
        self.books.keys().copied()
    }

    /// All books, in good order
    pub fn books(&self) -> impl Iterator<Item = &OrderBook> + '_ {
        self.books.values()
    }

    /// Total resting orders across all books
    pub fn order_count(&self) -> usize {
        self.books.values().map(OrderBook::order_count).sum()
    }

    pub fn best_bid(&self, good: GoodId) -> Option<f64> {
        self.book(good)?.best_bid()
    }

    pub fn best_ask(&self, good: GoodId) -> Option<f64> {
        self.book(good)?.best_ask()
    }

    /// Resting buy quantity for `good`, 0 for an untraded good
    pub fn demand(&self, good: GoodId) -> f64 {
        self.book(good).map_or(0.0, OrderBook::demand)
    }

    /// Resting sell quantity for `good`, 0 for an untraded good
    pub fn supply(&self, good: GoodId) -> f64 {
        self.book(good).map_or(0.0, OrderBook::supply)
    }

    /// Resting buy quantity of every book
    pub fn demand_ledger(&self) -> ResourceLedger {
        self.books.iter().map(|(good, book)| (*good, book.demand())).collect()
    }

    /// Resting sell quantity of every book
    pub fn supply_ledger(&self) -> ResourceLedger {
        self.books.iter().map(|(good, book)| (*good, book.supply())).collect()
    }

    /// Cancel a resting order in the book for `good`.
    pub fn cancel_order(&mut self, good: GoodId, order_id: u64) -> Option<Order> {
        self.books.get_mut(&good)?.cancel_order(order_id)
    }

    /// Cancel a resting order wherever it rests.
    pub fn cancel_any(&mut self, order_id: u64) -> Option<Order> {
        self.books
            .values_mut()
            .find(|book| book.contains_order(order_id))?
            .cancel_order(order_id)
    }

    /// Drop every resting order. Books and id counters are kept.
    pub fn clear(&mut self) {
        self.books.values_mut().for_each(OrderBook::clear);
    }

    pub fn snapshot(&self) -> HouseSnapshot {
        HouseSnapshot {
            market: self.market,
            books: self.books.values().map(OrderBook::snapshot).collect(),
        }
    }

    /// SHA-256 over the market id and the root of every non-empty book.
    ///
    /// Empty books are skipped, so lazily creating a book does not change
    /// the root.
    pub fn state_root(&self) -> Result<[u8; 32], MarketError> {
        let mut hasher = Sha256::new();
        hasher.update(self.market.0.to_le_bytes());

        for book in self.books.values().filter(|book| !book.is_empty()) {
            hasher.update(book.state_root()?);
        }

        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        Ok(root)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
