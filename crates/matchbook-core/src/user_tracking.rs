//! Optional per-user position tracking and pre-trade risk checks.
//!
//! Selected at engine construction; the default is [`UserTracking::Disabled`],
//! whose methods all collapse to no-ops so the hot path pays nothing for the
//! feature when it is off.

use std::collections::HashMap;

use crate::side::Side;
use crate::trade::Trade;
use crate::types::{OrderId, Qty, SymbolId, UserId};

/// One user's running state in one symbol. `position` is signed, long
/// positive; `traded_volume` accumulates both sides of every fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserSymbolPosition {
    pub position: Qty,
    pub traded_volume: Qty,
}

/// Position-tracking strategy: either off entirely or carrying state.
#[derive(Debug)]
pub(crate) enum UserTracking {
    Disabled,
    Enabled(TrackingState),
}

#[derive(Debug, Default)]
pub(crate) struct TrackingState {
    /// Which user owns each live order id.
    owner: HashMap<OrderId, UserId>,
    /// user -> symbol -> running position.
    positions: HashMap<UserId, HashMap<SymbolId, UserSymbolPosition>>,
    /// The (user, side) of the event currently inside the book, so fills
    /// of a not-yet-recorded incoming order credit the right account.
    current: Option<(UserId, Side)>,
}

impl TrackingState {
    fn position_of(&self, user: UserId, symbol: SymbolId) -> Qty {
        self.positions
            .get(&user)
            .and_then(|per_symbol| per_symbol.get(&symbol))
            .map(|p| p.position)
            .unwrap_or(0)
    }

    fn apply(&mut self, user: UserId, symbol: SymbolId, signed_qty: Qty, volume: Qty) {
        let pos = self
            .positions
            .entry(user)
            .or_default()
            .entry(symbol)
            .or_default();
        pos.position += signed_qty;
        pos.traded_volume += volume;
    }
}

impl UserTracking {
    /// Would accepting this order push the user's absolute position past
    /// the limit? Always passes when tracking is off.
    pub(crate) fn check_risk(
        &self,
        user: UserId,
        symbol: SymbolId,
        side: Side,
        qty: Qty,
        max_abs_position: Qty,
    ) -> bool {
        match self {
            UserTracking::Disabled => true,
            UserTracking::Enabled(state) => {
                let delta = match side {
                    Side::Buy => qty,
                    Side::Sell => -qty,
                };
                let hypothetical = state.position_of(user, symbol) + delta;
                hypothetical.abs() <= max_abs_position
            }
        }
    }

    /// Mark the (user, side) about to enter the book.
    pub(crate) fn begin_event(&mut self, user: UserId, side: Side) {
        if let UserTracking::Enabled(state) = self {
            state.current = Some((user, side));
        }
    }

    pub(crate) fn finish_event(&mut self) {
        if let UserTracking::Enabled(state) = self {
            state.current = None;
        }
    }

    pub(crate) fn record_owner(&mut self, id: OrderId, user: UserId) {
        if let UserTracking::Enabled(state) = self {
            if id != 0 {
                state.owner.insert(id, user);
            }
        }
    }

    pub(crate) fn owner_of(&self, id: OrderId) -> Option<UserId> {
        match self {
            UserTracking::Disabled => None,
            UserTracking::Enabled(state) => state.owner.get(&id).copied(),
        }
    }

    pub(crate) fn forget(&mut self, id: OrderId) {
        if let UserTracking::Enabled(state) = self {
            state.owner.remove(&id);
        }
    }

    /// Apply one trade to both sides' positions. An id with no recorded
    /// owner is the incoming order still inside the book; the current-event
    /// hint attributes it.
    pub(crate) fn on_trade(&mut self, t: &Trade<'_>) {
        let UserTracking::Enabled(state) = self else {
            return;
        };

        match state.owner.get(&t.buy_id).copied() {
            Some(buyer) => state.apply(buyer, t.symbol_id, t.qty, t.qty),
            None => {
                if let Some((user, Side::Buy)) = state.current {
                    if t.buy_id != 0 {
                        state.apply(user, t.symbol_id, t.qty, t.qty);
                    }
                }
            }
        }

        match state.owner.get(&t.sell_id).copied() {
            Some(seller) => state.apply(seller, t.symbol_id, -t.qty, t.qty),
            None => {
                if let Some((user, Side::Sell)) = state.current {
                    if t.sell_id != 0 {
                        state.apply(user, t.symbol_id, -t.qty, t.qty);
                    }
                }
            }
        }
    }

    pub(crate) fn position(&self, user: UserId, symbol: SymbolId) -> Option<UserSymbolPosition> {
        match self {
            UserTracking::Disabled => None,
            UserTracking::Enabled(state) => state
                .positions
                .get(&user)
                .and_then(|per_symbol| per_symbol.get(&symbol))
                .copied(),
        }
    }
}
