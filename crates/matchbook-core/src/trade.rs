//! Trade events and per-book running statistics.

use crate::types::{OrderId, Price, Qty, SymbolId};

/// A single match between one buy and one sell order.
///
/// `symbol` borrows the engine's symbol storage; the reference is valid
/// for the duration of the trade callback. Trade price is always the
/// resting (maker) order's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade<'a> {
    pub symbol_id: SymbolId,
    pub symbol: &'a str,
    pub price: Price,
    pub qty: Qty,
    pub buy_id: OrderId,
    pub sell_id: OrderId,
}

/// Running statistics for one book since construction.
///
/// `traded_qty` accumulates every emitted trade quantity; cumulative
/// volume is assumed to fit in a signed 64-bit counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookStats {
    pub trade_count: u64,
    pub traded_qty: Qty,
    pub last_trade_price: Option<Price>,
}

impl BookStats {
    pub(crate) fn record(&mut self, price: Price, qty: Qty) {
        self.trade_count += 1;
        self.traded_qty += qty;
        self.last_trade_price = Some(price);
    }
}
