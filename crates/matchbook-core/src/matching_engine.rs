//! Multi-symbol matching engine.
//!
//! Owns one [`OrderBook`] per symbol, created lazily on first use and
//! addressed by dense [`SymbolId`] through a positional vector. External
//! [`Event`]s are lowered to [`InternalEvent`]s by resolving the symbol
//! string, then dispatched to the right book.
//!
//! Every trade a book emits flows through the engine's internal hook,
//! which updates user tracking (when enabled) and forwards to the
//! user-supplied callback. The hook runs synchronously inside matching,
//! so the callback must not submit further events into the engine.

use std::sync::Arc;

use crate::events::{Event, EventType, InternalEvent};
use crate::order_book::OrderBook;
use crate::side::Side;
use crate::symbol_index::SymbolTable;
use crate::time_in_force::TimeInForce;
use crate::top_of_book::TopOfBook;
use crate::trade::{BookStats, Trade};
use crate::types::{OrderId, Price, Qty, SymbolId, UserId};
use crate::user_tracking::{TrackingState, UserSymbolPosition, UserTracking};

/// Type-erased user trade callback. `Send` because the async shell moves
/// the whole engine into its worker thread.
pub type TradeCallback = Box<dyn FnMut(&Trade<'_>) + Send>;

/// Default cap on a user's absolute position when tracking is enabled.
pub const DEFAULT_MAX_ABS_POSITION: Qty = 1_000_000_000;

/// Multi-symbol matching engine.
pub struct MatchingEngine {
    symbols: SymbolTable,
    /// Books indexed by `SymbolId`; `None` marks an id whose book has not
    /// been created yet.
    books: Vec<Option<OrderBook>>,
    on_trade: TradeCallback,
    tracking: UserTracking,
    max_abs_position: Qty,
}

impl MatchingEngine {
    /// Engine without user tracking (the default configuration).
    pub fn new(on_trade: TradeCallback) -> Self {
        Self::build(on_trade, UserTracking::Disabled)
    }

    /// Engine with per-user position tracking and pre-trade risk checks.
    pub fn with_user_tracking(on_trade: TradeCallback) -> Self {
        Self::build(on_trade, UserTracking::Enabled(TrackingState::default()))
    }

    fn build(on_trade: TradeCallback, tracking: UserTracking) -> Self {
        MatchingEngine {
            symbols: SymbolTable::new(),
            books: Vec::new(),
            on_trade,
            tracking,
            max_abs_position: DEFAULT_MAX_ABS_POSITION,
        }
    }

    /// Adjust the absolute-position cap used by the risk check.
    pub fn set_max_position(&mut self, limit: Qty) {
        self.max_abs_position = limit;
    }

    /// The engine's symbol table. The async shell clones this handle so
    /// the producer can resolve symbols without touching the engine.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Resolve a symbol name, creating its id on first sight.
    pub fn resolve_symbol(&self, name: &str) -> SymbolId {
        self.symbols.get_or_create(name)
    }

    /// Read-only symbol lookup.
    pub fn find_symbol(&self, name: &str) -> Option<SymbolId> {
        self.symbols.find(name)
    }

    /// Canonical name for a symbol id, if it was ever issued.
    pub fn symbol_name(&self, id: SymbolId) -> Option<Arc<str>> {
        self.symbols.handle(id)
    }

    /// Number of symbols seen so far.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    // -------------------------------------------------------------------
    // Event dispatch
    // -------------------------------------------------------------------

    /// Process an external event: resolve the symbol string and dispatch.
    pub fn process(&mut self, e: &Event) {
        let symbol = self.symbols.get_or_create(&e.symbol);
        self.process_internal(&InternalEvent::from_event(e, symbol));
    }

    /// Process a pre-resolved event. This is the hot path: no strings, no
    /// allocation.
    pub fn process_internal(&mut self, e: &InternalEvent) {
        match e.kind {
            EventType::NewLimit => {
                self.new_limit(e.symbol, e.user_id, e.side, e.price, e.qty, e.tif);
            }
            EventType::NewMarket => {
                self.new_market(e.symbol, e.user_id, e.side, e.qty);
            }
            EventType::Cancel => {
                self.cancel(e.symbol, e.id);
            }
            EventType::Replace => {
                self.replace(e.symbol, e.user_id, e.id, e.side, e.price, e.qty, e.tif);
            }
            // Shutdown sentinel for the async worker; nothing to do here.
            EventType::Stop => {}
        }
    }

    // -------------------------------------------------------------------
    // Order entry
    // -------------------------------------------------------------------

    /// Submit a new limit order. Returns the assigned id, or 0 when the
    /// risk check rejects it (tracking enabled only).
    pub fn new_limit(
        &mut self,
        symbol: SymbolId,
        user: UserId,
        side: Side,
        price: Price,
        qty: Qty,
        tif: TimeInForce,
    ) -> OrderId {
        if !self
            .tracking
            .check_risk(user, symbol, side, qty, self.max_abs_position)
        {
            return 0;
        }
        let Self {
            books,
            symbols,
            tracking,
            on_trade,
            ..
        } = self;
        let book = ensure_book(books, symbols, symbol);

        tracking.begin_event(user, side);
        let id = book.add_limit(side, price, qty, tif, &mut |t: &Trade<'_>| {
            tracking.on_trade(t);
            on_trade(t);
        });
        tracking.finish_event();
        tracking.record_owner(id, user);
        id
    }

    /// Submit a new market order. Returns the assigned id, or 0 on risk
    /// reject.
    pub fn new_market(&mut self, symbol: SymbolId, user: UserId, side: Side, qty: Qty) -> OrderId {
        if !self
            .tracking
            .check_risk(user, symbol, side, qty, self.max_abs_position)
        {
            return 0;
        }
        let Self {
            books,
            symbols,
            tracking,
            on_trade,
            ..
        } = self;
        let book = ensure_book(books, symbols, symbol);

        tracking.begin_event(user, side);
        let id = book.add_market(side, qty, &mut |t: &Trade<'_>| {
            tracking.on_trade(t);
            on_trade(t);
        });
        tracking.finish_event();
        tracking.record_owner(id, user);
        id
    }

    /// Cancel an order. `false` when the symbol has no book or the id is
    /// unknown.
    pub fn cancel(&mut self, symbol: SymbolId, id: OrderId) -> bool {
        let Some(book) = self.book_mut(symbol) else {
            return false;
        };
        let canceled = book.cancel(id);
        if canceled {
            self.tracking.forget(id);
        }
        canceled
    }

    /// Replace: cancel the old order (missing ids fall through to a plain
    /// new limit) and submit the new parameters under a fresh id. The
    /// replacement belongs to the old order's recorded owner when tracking
    /// knows one, otherwise to `user`.
    pub fn replace(
        &mut self,
        symbol: SymbolId,
        user: UserId,
        old_id: OrderId,
        side: Side,
        price: Price,
        qty: Qty,
        tif: TimeInForce,
    ) -> OrderId {
        let effective_user = self.tracking.owner_of(old_id).unwrap_or(user);
        self.cancel(symbol, old_id);
        self.new_limit(symbol, effective_user, side, price, qty, tif)
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Top-of-book snapshot; empty when the book does not exist.
    pub fn top_of_book(&self, symbol: SymbolId) -> TopOfBook {
        match self.book(symbol) {
            None => TopOfBook::default(),
            Some(book) => TopOfBook {
                best_bid: book.best_bid(),
                bid_size: book.best_bid_size(),
                best_ask: book.best_ask(),
                ask_size: book.best_ask_size(),
                mid_price: book.mid_price(),
            },
        }
    }

    pub fn top_of_book_by_name(&self, name: &str) -> TopOfBook {
        match self.symbols.find(name) {
            Some(symbol) => self.top_of_book(symbol),
            None => TopOfBook::default(),
        }
    }

    pub fn book_stats(&self, symbol: SymbolId) -> Option<BookStats> {
        self.book(symbol).map(|b| b.stats())
    }

    pub fn book_stats_by_name(&self, name: &str) -> Option<BookStats> {
        self.book_stats(self.symbols.find(name)?)
    }

    /// Immutable access to a book, for depth dumps and tests.
    pub fn book(&self, symbol: SymbolId) -> Option<&OrderBook> {
        self.books.get(symbol as usize)?.as_ref()
    }

    pub fn book_by_name(&self, name: &str) -> Option<&OrderBook> {
        self.book(self.symbols.find(name)?)
    }

    /// A user's running position in a symbol. `None` when tracking is off
    /// or the user never traded the symbol.
    pub fn user_position(&self, user: UserId, symbol: &str) -> Option<UserSymbolPosition> {
        self.tracking.position(user, self.symbols.find(symbol)?)
    }

    fn book_mut(&mut self, symbol: SymbolId) -> Option<&mut OrderBook> {
        self.books.get_mut(symbol as usize)?.as_mut()
    }
}

/// Grow the positional book vector if needed and instantiate the book for
/// `symbol` on first use. Free function so callers can keep disjoint
/// borrows of the engine's other fields.
fn ensure_book<'a>(
    books: &'a mut Vec<Option<OrderBook>>,
    symbols: &SymbolTable,
    symbol: SymbolId,
) -> &'a mut OrderBook {
    let idx = symbol as usize;
    if idx >= books.len() {
        books.resize_with(idx + 1, || None);
    }
    books[idx].get_or_insert_with(|| {
        let name = symbols
            .handle(symbol)
            .unwrap_or_else(|| Arc::from("<unknown>"));
        OrderBook::new(symbol, name)
    })
}
