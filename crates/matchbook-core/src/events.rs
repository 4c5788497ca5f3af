//! Event types flowing into the engine.
//!
//! [`Event`] is the external form carrying the symbol as a string; it is
//! what protocol parsers and producers build. [`InternalEvent`] is the
//! hot-path form: trivially copyable, symbol resolved to a [`SymbolId`],
//! and small enough to pass by value through the SPSC queue.

use crate::side::Side;
use crate::time_in_force::TimeInForce;
use crate::types::{OrderId, Price, Qty, SymbolId, UserId};

/// What kind of action an event requests.
///
/// `Stop` is a shutdown sentinel for the async worker; the synchronous
/// engine treats it as a no-op.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventType {
    NewLimit,
    NewMarket,
    Cancel,
    Replace,
    Stop,
}

/// External event with a string symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventType,
    pub symbol: String,
    pub side: Side,
    pub price: Price,
    pub qty: Qty,
    /// Target order id for `Cancel` (the order to cancel) and `Replace`
    /// (the order being replaced); unused otherwise.
    pub id: OrderId,
    pub tif: TimeInForce,
    pub user_id: UserId,
}

/// Default user id when the wire format omits one.
pub const DEFAULT_USER: UserId = 1;

impl Event {
    /// New limit order for the default user.
    pub fn limit(
        symbol: impl Into<String>,
        side: Side,
        price: Price,
        qty: Qty,
        tif: TimeInForce,
    ) -> Self {
        Self::limit_for_user(DEFAULT_USER, symbol, side, price, qty, tif)
    }

    /// New limit order for an explicit user.
    pub fn limit_for_user(
        user_id: UserId,
        symbol: impl Into<String>,
        side: Side,
        price: Price,
        qty: Qty,
        tif: TimeInForce,
    ) -> Self {
        Event {
            kind: EventType::NewLimit,
            symbol: symbol.into(),
            side,
            price,
            qty,
            id: 0,
            tif,
            user_id,
        }
    }

    /// New market order for the default user. Markets never rest, so the
    /// time-in-force is pinned to IOC.
    pub fn market(symbol: impl Into<String>, side: Side, qty: Qty) -> Self {
        Self::market_for_user(DEFAULT_USER, symbol, side, qty)
    }

    /// New market order for an explicit user.
    pub fn market_for_user(
        user_id: UserId,
        symbol: impl Into<String>,
        side: Side,
        qty: Qty,
    ) -> Self {
        Event {
            kind: EventType::NewMarket,
            symbol: symbol.into(),
            side,
            price: 0,
            qty,
            id: 0,
            tif: TimeInForce::Ioc,
            user_id,
        }
    }

    /// Cancel of an existing order by id.
    pub fn cancel(symbol: impl Into<String>, id: OrderId) -> Self {
        Event {
            kind: EventType::Cancel,
            symbol: symbol.into(),
            side: Side::Buy,
            price: 0,
            qty: 0,
            id,
            tif: TimeInForce::Gfd,
            user_id: DEFAULT_USER,
        }
    }

    /// Replace of an existing order: cancel `old_id`, submit a new limit
    /// with the given parameters. The new order loses time priority.
    pub fn replace(
        symbol: impl Into<String>,
        old_id: OrderId,
        side: Side,
        price: Price,
        qty: Qty,
        tif: TimeInForce,
    ) -> Self {
        Event {
            kind: EventType::Replace,
            symbol: symbol.into(),
            side,
            price,
            qty,
            id: old_id,
            tif,
            user_id: DEFAULT_USER,
        }
    }
}

/// Hot-path event: same semantics as [`Event`] with the symbol resolved
/// to a dense id. Plain `Copy` data, no heap anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalEvent {
    pub symbol: SymbolId,
    pub id: OrderId,
    pub price: Price,
    pub qty: Qty,
    pub user_id: UserId,
    pub kind: EventType,
    pub side: Side,
    pub tif: TimeInForce,
}

impl InternalEvent {
    /// Lower an external event, given its resolved symbol id.
    pub fn from_event(e: &Event, symbol: SymbolId) -> Self {
        InternalEvent {
            symbol,
            id: e.id,
            price: e.price,
            qty: e.qty,
            user_id: e.user_id,
            kind: e.kind,
            side: e.side,
            tif: e.tif,
        }
    }

    /// Shutdown sentinel for the async worker queue.
    pub fn stop() -> Self {
        InternalEvent {
            symbol: 0,
            id: 0,
            price: 0,
            qty: 0,
            user_id: 0,
            kind: EventType::Stop,
            side: Side::Buy,
            tif: TimeInForce::Gfd,
        }
    }
}
