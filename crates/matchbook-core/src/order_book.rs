//! Single-symbol order book with strict price-time priority.
//!
//! - One instance per symbol.
//! - Bids and asks are `BTreeMap`s keyed by price, so the best level sits
//!   at one end of each map and popping an emptied best level is cheap.
//! - Each price level is a FIFO of orders kept as an intrusive doubly
//!   linked list over a shared [`Slab`], so resting an order reuses pooled
//!   nodes and a cancel unlinks its node in O(1) through the handle stored
//!   in the order index.
//!
//! Matching emits trades through a caller-supplied sink, invoked
//! synchronously while the match loop runs. The sink must not call back
//! into the same book.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::sync::Arc;

use slab::Slab;

use crate::order::Order;
use crate::order_type::OrderType;
use crate::side::Side;
use crate::time_in_force::TimeInForce;
use crate::trade::{BookStats, Trade};
use crate::types::{OrderId, Price, Qty, SymbolId};

/// FIFO node: the order plus its intrusive links within a price level.
#[derive(Debug)]
struct OrderNode {
    order: Order,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Aggregated state for one price level.
///
/// `total_qty` is the sum of remaining quantities of every linked order;
/// `orders` counts them for depth dumps.
#[derive(Debug, Default)]
struct PriceLevel {
    total_qty: Qty,
    head: Option<usize>,
    tail: Option<usize>,
    orders: usize,
}

impl PriceLevel {
    fn push_back(&mut self, nodes: &mut Slab<OrderNode>, idx: usize) {
        match self.tail {
            Some(tail) => {
                nodes[tail].next = Some(idx);
                nodes[idx].prev = Some(tail);
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.total_qty += nodes[idx].order.qty;
        self.orders += 1;
    }

    /// Unlink a node currently linked in this level. The node's remaining
    /// quantity (zero for a just-filled order) leaves the aggregate.
    fn unlink(&mut self, nodes: &mut Slab<OrderNode>, idx: usize) {
        let prev = nodes[idx].prev;
        let next = nodes[idx].next;
        match prev {
            Some(p) => nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => nodes[n].prev = prev,
            None => self.tail = prev,
        }
        nodes[idx].prev = None;
        nodes[idx].next = None;
        self.total_qty -= nodes[idx].order.qty;
        self.orders -= 1;
    }

    fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

/// Where a resting order lives: side, price level, and its slab handle.
#[derive(Debug, Clone, Copy)]
struct OrderLocator {
    side: Side,
    price: Price,
    node: usize,
}

/// Single-symbol limit order book.
#[derive(Debug)]
pub struct OrderBook {
    symbol_id: SymbolId,
    symbol: Arc<str>,

    /// Bids keyed ascending; best bid = highest key.
    bids: BTreeMap<Price, PriceLevel>,
    /// Asks keyed ascending; best ask = lowest key.
    asks: BTreeMap<Price, PriceLevel>,

    /// Pooled FIFO nodes for both sides.
    nodes: Slab<OrderNode>,
    /// Order id to locator, for O(1) cancel and replace.
    index: HashMap<OrderId, OrderLocator>,

    next_id: OrderId,
    stats: BookStats,
}

impl OrderBook {
    /// Create an empty book. `symbol` is the canonical name handle from
    /// the symbol index; trades borrow it.
    pub fn new(symbol_id: SymbolId, symbol: Arc<str>) -> Self {
        OrderBook {
            symbol_id,
            symbol,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            nodes: Slab::new(),
            index: HashMap::new(),
            next_id: 1,
            stats: BookStats::default(),
        }
    }

    pub fn symbol_id(&self) -> SymbolId {
        self.symbol_id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Submit a new limit order.
    ///
    /// The id is assigned unconditionally. A FOK order that cannot fill in
    /// full consumes its id but emits no trades and never rests; an IOC
    /// order silently drops whatever does not match immediately. Only a
    /// GFD residual rests on the book.
    ///
    /// Quantities are not validated here; the protocol layer filters
    /// non-positive quantities before they reach the book.
    pub fn add_limit(
        &mut self,
        side: Side,
        price: Price,
        qty: Qty,
        tif: TimeInForce,
        on_trade: &mut impl FnMut(&Trade<'_>),
    ) -> OrderId {
        let id = self.next_id;
        self.next_id += 1;

        if tif == TimeInForce::Fok && !self.can_fully_match(side, price, qty) {
            return id;
        }

        let mut order = Order {
            id,
            price,
            qty,
            side,
            order_type: OrderType::Limit,
            tif,
        };
        self.match_order(&mut order, on_trade);
        if order.qty > 0 && tif == TimeInForce::Gfd {
            self.rest(order);
        }
        id
    }

    /// Submit a market order: an IOC limit at the most aggressive possible
    /// price. Never rests; residual quantity after exhausting the opposite
    /// side is dropped.
    pub fn add_market(
        &mut self,
        side: Side,
        qty: Qty,
        on_trade: &mut impl FnMut(&Trade<'_>),
    ) -> OrderId {
        let price = match side {
            Side::Buy => Price::MAX,
            Side::Sell => Price::MIN,
        };
        let id = self.next_id;
        self.next_id += 1;

        let mut order = Order {
            id,
            price,
            qty,
            side,
            order_type: OrderType::Market,
            tif: TimeInForce::Ioc,
        };
        self.match_order(&mut order, on_trade);
        id
    }

    /// Cancel a resting order by id.
    ///
    /// Returns `false` for an unknown id, or for a locator whose level has
    /// disappeared (the stale index entry is dropped on the way out).
    pub fn cancel(&mut self, id: OrderId) -> bool {
        let Some(&loc) = self.index.get(&id) else {
            return false;
        };
        let levels = match loc.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let Some(level) = levels.get_mut(&loc.price) else {
            self.index.remove(&id);
            return false;
        };

        level.unlink(&mut self.nodes, loc.node);
        let now_empty = level.is_empty();
        self.nodes.remove(loc.node);
        self.index.remove(&id);
        if now_empty {
            levels.remove(&loc.price);
        }
        true
    }

    /// Replace an existing order: cancel it (result ignored, so a vanished
    /// old id degrades to a plain new limit) and submit a fresh limit with
    /// the new parameters. The new order gets a new id and loses its place
    /// in the queue.
    pub fn replace(
        &mut self,
        old_id: OrderId,
        side: Side,
        price: Price,
        qty: Qty,
        tif: TimeInForce,
        on_trade: &mut impl FnMut(&Trade<'_>),
    ) -> OrderId {
        self.cancel(old_id);
        self.add_limit(side, price, qty, tif, on_trade)
    }

    /// True iff crossing levels on the opposite side hold at least `qty`
    /// in aggregate. Walks best-first and never mutates the book.
    pub fn can_fully_match(&self, side: Side, price: Price, qty: Qty) -> bool {
        if qty <= 0 {
            return true;
        }
        let mut need = qty;
        match side {
            Side::Buy => {
                for level in self.asks.range(..=price).map(|(_, l)| l) {
                    need -= level.total_qty;
                    if need <= 0 {
                        return true;
                    }
                }
            }
            Side::Sell => {
                for level in self.bids.range(price..).rev().map(|(_, l)| l) {
                    need -= level.total_qty;
                    if need <= 0 {
                        return true;
                    }
                }
            }
        }
        false
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.last_key_value().map(|(&p, _)| p)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first_key_value().map(|(&p, _)| p)
    }

    pub fn best_bid_size(&self) -> Option<Qty> {
        self.bids.last_key_value().map(|(_, l)| l.total_qty)
    }

    pub fn best_ask_size(&self) -> Option<Qty> {
        self.asks.first_key_value().map(|(_, l)| l.total_qty)
    }

    /// Truncated midpoint of the best prices; `None` if either side is empty.
    pub fn mid_price(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bb), Some(ba)) => Some((bb + ba) / 2),
            _ => None,
        }
    }

    /// Snapshot of the running trade statistics.
    pub fn stats(&self) -> BookStats {
        self.stats
    }

    /// Look up a resting order by id.
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        let loc = self.index.get(&id)?;
        self.nodes.get(loc.node).map(|n| &n.order)
    }

    /// Top `depth` bid levels, best first, as `(price, total_qty)`.
    pub fn bid_levels(&self, depth: usize) -> Vec<(Price, Qty)> {
        self.bids
            .iter()
            .rev()
            .take(depth)
            .map(|(&p, l)| (p, l.total_qty))
            .collect()
    }

    /// Top `depth` ask levels, best first, as `(price, total_qty)`.
    pub fn ask_levels(&self, depth: usize) -> Vec<(Price, Qty)> {
        self.asks
            .iter()
            .take(depth)
            .map(|(&p, l)| (p, l.total_qty))
            .collect()
    }

    /// Human-readable dump of the top `depth` levels on each side.
    pub fn print_book(&self, out: &mut impl Write, depth: usize) -> io::Result<()> {
        writeln!(out, "OrderBook({})", self.symbol)?;

        writeln!(out, "\tAsks:")?;
        let mut shown = 0;
        for (price, level) in self.asks.iter().take(depth) {
            writeln!(
                out,
                "\t\tpx={} total_qty={} (orders={})",
                price, level.total_qty, level.orders
            )?;
            shown += 1;
        }
        if shown == 0 {
            writeln!(out, "\t\t<empty>")?;
        }

        writeln!(out, "\tBids:")?;
        shown = 0;
        for (price, level) in self.bids.iter().rev().take(depth) {
            writeln!(
                out,
                "\t\tpx={} total_qty={} (orders={})",
                price, level.total_qty, level.orders
            )?;
            shown += 1;
        }
        if shown == 0 {
            writeln!(out, "\t\t<empty>")?;
        }
        Ok(())
    }

    /// Panics if the book's internal bookkeeping is inconsistent: level
    /// aggregates out of sync with their FIFOs, dangling index entries,
    /// empty levels, or a crossed resting book. Intended for tests and
    /// debugging; never called on the hot path.
    pub fn check_invariants(&self) {
        for (side, levels) in [(Side::Buy, &self.bids), (Side::Sell, &self.asks)] {
            for (&price, level) in levels {
                assert!(!level.is_empty(), "empty level left at px={price}");
                let mut sum: Qty = 0;
                let mut count = 0usize;
                let mut prev = None;
                let mut cursor = level.head;
                while let Some(idx) = cursor {
                    let node = &self.nodes[idx];
                    assert_eq!(node.prev, prev, "broken back-link at px={price}");
                    assert_eq!(node.order.side, side);
                    assert_eq!(node.order.price, price);
                    assert!(node.order.qty > 0, "resting order with qty <= 0");
                    let loc = self
                        .index
                        .get(&node.order.id)
                        .unwrap_or_else(|| panic!("order {} missing from index", node.order.id));
                    assert_eq!(loc.node, idx);
                    assert_eq!(loc.price, price);
                    assert_eq!(loc.side, side);
                    sum += node.order.qty;
                    count += 1;
                    prev = cursor;
                    cursor = node.next;
                }
                assert_eq!(level.tail, prev, "broken tail at px={price}");
                assert_eq!(level.total_qty, sum, "aggregate drift at px={price}");
                assert_eq!(level.orders, count, "order count drift at px={price}");
            }
        }
        for (&id, loc) in &self.index {
            let node = self
                .nodes
                .get(loc.node)
                .unwrap_or_else(|| panic!("index entry {id} points at a freed node"));
            assert_eq!(node.order.id, id);
        }
        if let (Some(bb), Some(ba)) = (self.best_bid(), self.best_ask()) {
            assert!(bb < ba, "resting book crossed: bid {bb} >= ask {ba}");
        }
    }

    // -------------------------------------------------------------------
    // Matching
    // -------------------------------------------------------------------

    fn match_order(&mut self, incoming: &mut Order, on_trade: &mut impl FnMut(&Trade<'_>)) {
        match incoming.side {
            Side::Buy => self.match_buy(incoming, on_trade),
            Side::Sell => self.match_sell(incoming, on_trade),
        }
    }

    /// Cross an incoming buy against resting asks, best (lowest) first,
    /// FIFO within each level. Trade price is the resting order's price.
    fn match_buy(&mut self, buy: &mut Order, on_trade: &mut impl FnMut(&Trade<'_>)) {
        let Self {
            asks,
            nodes,
            index,
            stats,
            symbol_id,
            symbol,
            ..
        } = self;
        let symbol_id = *symbol_id;
        let symbol: &str = &**symbol;

        while buy.qty > 0 {
            let Some(mut level_entry) = asks.first_entry() else {
                break;
            };
            let level_price = *level_entry.key();
            if buy.order_type == OrderType::Limit && buy.price < level_price {
                break;
            }

            let level = level_entry.get_mut();
            while buy.qty > 0 {
                let Some(head) = level.head else { break };
                let resting = &mut nodes[head].order;
                let traded = buy.qty.min(resting.qty);
                buy.qty -= traded;
                resting.qty -= traded;
                level.total_qty -= traded;
                let resting_id = resting.id;
                let resting_filled = resting.is_filled();

                stats.record(level_price, traded);
                on_trade(&Trade {
                    symbol_id,
                    symbol,
                    price: level_price,
                    qty: traded,
                    buy_id: buy.id,
                    sell_id: resting_id,
                });

                if resting_filled {
                    index.remove(&resting_id);
                    level.unlink(nodes, head);
                    nodes.remove(head);
                }
            }
            if level.is_empty() {
                level_entry.remove();
            }
        }
    }

    /// Mirror image of [`Self::match_buy`]: cross an incoming sell against
    /// resting bids, best (highest) first.
    fn match_sell(&mut self, sell: &mut Order, on_trade: &mut impl FnMut(&Trade<'_>)) {
        let Self {
            bids,
            nodes,
            index,
            stats,
            symbol_id,
            symbol,
            ..
        } = self;
        let symbol_id = *symbol_id;
        let symbol: &str = &**symbol;

        while sell.qty > 0 {
            let Some(mut level_entry) = bids.last_entry() else {
                break;
            };
            let level_price = *level_entry.key();
            if sell.order_type == OrderType::Limit && sell.price > level_price {
                break;
            }

            let level = level_entry.get_mut();
            while sell.qty > 0 {
                let Some(head) = level.head else { break };
                let resting = &mut nodes[head].order;
                let traded = sell.qty.min(resting.qty);
                sell.qty -= traded;
                resting.qty -= traded;
                level.total_qty -= traded;
                let resting_id = resting.id;
                let resting_filled = resting.is_filled();

                stats.record(level_price, traded);
                on_trade(&Trade {
                    symbol_id,
                    symbol,
                    price: level_price,
                    qty: traded,
                    buy_id: resting_id,
                    sell_id: sell.id,
                });

                if resting_filled {
                    index.remove(&resting_id);
                    level.unlink(nodes, head);
                    nodes.remove(head);
                }
            }
            if level.is_empty() {
                level_entry.remove();
            }
        }
    }

    /// Rest a GFD residual: pool a node, link it at the tail of its level,
    /// and record the locator for later cancel.
    fn rest(&mut self, order: Order) {
        let (side, price, id) = (order.side, order.price, order.id);
        let node = self.nodes.insert(OrderNode {
            order,
            prev: None,
            next: None,
        });
        let level = match side {
            Side::Buy => self.bids.entry(price).or_default(),
            Side::Sell => self.asks.entry(price).or_default(),
        };
        level.push_back(&mut self.nodes, node);
        self.index.insert(id, OrderLocator { side, price, node });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type RecordedTrade = (Price, Qty, OrderId, OrderId);

    fn book() -> OrderBook {
        OrderBook::new(0, Arc::from("TEST"))
    }

    fn recording(trades: &mut Vec<RecordedTrade>) -> impl FnMut(&Trade<'_>) + '_ {
        |t: &Trade<'_>| trades.push((t.price, t.qty, t.buy_id, t.sell_id))
    }

    #[test]
    fn limit_rests_when_nothing_crosses() {
        let mut b = book();
        let mut trades = Vec::new();
        let id = b.add_limit(Side::Sell, 100, 50, TimeInForce::Gfd, &mut recording(&mut trades));
        assert_eq!(id, 1);
        assert!(trades.is_empty());
        assert_eq!(b.best_ask(), Some(100));
        assert_eq!(b.best_ask_size(), Some(50));
        assert_eq!(b.best_bid(), None);
        b.check_invariants();
    }

    #[test]
    fn crossing_buy_fills_in_time_priority_at_maker_price() {
        let mut b = book();
        let mut trades = Vec::new();
        b.add_limit(Side::Sell, 100, 50, TimeInForce::Gfd, &mut recording(&mut trades));
        b.add_limit(Side::Sell, 100, 60, TimeInForce::Gfd, &mut recording(&mut trades));
        let buy = b.add_limit(Side::Buy, 105, 80, TimeInForce::Gfd, &mut recording(&mut trades));

        // Earliest sell fills first, both at the resting price of 100.
        assert_eq!(trades, vec![(100, 50, buy, 1), (100, 30, buy, 2)]);
        assert_eq!(b.best_ask(), Some(100));
        assert_eq!(b.best_ask_size(), Some(30));
        assert_eq!(b.best_bid(), None);
        b.check_invariants();
    }

    #[test]
    fn partially_filled_gfd_residual_rests() {
        let mut b = book();
        let mut trades = Vec::new();
        b.add_limit(Side::Sell, 100, 30, TimeInForce::Gfd, &mut recording(&mut trades));
        b.add_limit(Side::Buy, 100, 80, TimeInForce::Gfd, &mut recording(&mut trades));
        assert_eq!(trades, vec![(100, 30, 2, 1)]);
        assert_eq!(b.best_bid(), Some(100));
        assert_eq!(b.best_bid_size(), Some(50));
        assert_eq!(b.best_ask(), None);
        b.check_invariants();
    }

    #[test]
    fn ioc_drops_remainder() {
        let mut b = book();
        let mut trades = Vec::new();
        b.add_limit(Side::Sell, 100, 50, TimeInForce::Gfd, &mut recording(&mut trades));
        b.add_limit(Side::Buy, 100, 80, TimeInForce::Ioc, &mut recording(&mut trades));
        assert_eq!(trades, vec![(100, 50, 2, 1)]);
        assert_eq!(b.best_bid(), None);
        assert_eq!(b.best_ask(), None);
        b.check_invariants();
    }

    #[test]
    fn fok_rejects_then_accepts() {
        let mut b = book();
        let mut trades = Vec::new();
        b.add_limit(Side::Sell, 100, 50, TimeInForce::Gfd, &mut recording(&mut trades));

        // 80 > 50 available at or below 100: id consumed, nothing happens.
        let rejected = b.add_limit(Side::Buy, 100, 80, TimeInForce::Fok, &mut recording(&mut trades));
        assert_eq!(rejected, 2);
        assert!(trades.is_empty());
        assert_eq!(b.best_ask_size(), Some(50));
        assert!(b.order(rejected).is_none());

        let accepted = b.add_limit(Side::Buy, 100, 40, TimeInForce::Fok, &mut recording(&mut trades));
        assert_eq!(accepted, 3);
        assert_eq!(trades, vec![(100, 40, 3, 1)]);
        assert_eq!(b.best_ask_size(), Some(10));
        b.check_invariants();
    }

    #[test]
    fn fok_counts_liquidity_only_at_crossing_prices() {
        let mut b = book();
        let mut trades = Vec::new();
        b.add_limit(Side::Sell, 100, 30, TimeInForce::Gfd, &mut recording(&mut trades));
        b.add_limit(Side::Sell, 105, 100, TimeInForce::Gfd, &mut recording(&mut trades));

        // The 105 level must not count toward a buy limited at 102.
        assert!(!b.can_fully_match(Side::Buy, 102, 40));
        assert!(b.can_fully_match(Side::Buy, 102, 30));
        assert!(b.can_fully_match(Side::Buy, 105, 130));
        assert!(b.can_fully_match(Side::Buy, 105, 0));
        b.check_invariants();
    }

    #[test]
    fn market_sweeps_levels_and_drops_residual() {
        let mut b = book();
        let mut trades = Vec::new();
        b.add_limit(Side::Sell, 101, 20, TimeInForce::Gfd, &mut recording(&mut trades));
        b.add_limit(Side::Sell, 102, 30, TimeInForce::Gfd, &mut recording(&mut trades));
        let buy = b.add_market(Side::Buy, 100, &mut recording(&mut trades));

        // Crosses both levels at their own prices, residual 50 vanishes.
        assert_eq!(trades, vec![(101, 20, buy, 1), (102, 30, buy, 2)]);
        assert_eq!(b.best_ask(), None);
        assert_eq!(b.best_bid(), None);
        b.check_invariants();
    }

    #[test]
    fn market_against_empty_book_is_silent() {
        let mut b = book();
        let mut trades = Vec::new();
        let id = b.add_market(Side::Sell, 25, &mut recording(&mut trades));
        assert_eq!(id, 1);
        assert!(trades.is_empty());
        b.check_invariants();
    }

    #[test]
    fn cancel_unknown_id_returns_false() {
        let mut b = book();
        assert!(!b.cancel(42));
        b.check_invariants();
    }

    #[test]
    fn cancel_is_o1_and_idempotent() {
        let mut b = book();
        let mut trades = Vec::new();
        let id = b.add_limit(Side::Buy, 99, 10, TimeInForce::Gfd, &mut recording(&mut trades));
        assert!(b.cancel(id));
        assert!(!b.cancel(id));
        assert_eq!(b.best_bid(), None);
        b.check_invariants();
    }

    #[test]
    fn cancel_middle_of_level_preserves_fifo() {
        let mut b = book();
        let mut trades = Vec::new();
        let first = b.add_limit(Side::Sell, 100, 10, TimeInForce::Gfd, &mut recording(&mut trades));
        let second = b.add_limit(Side::Sell, 100, 20, TimeInForce::Gfd, &mut recording(&mut trades));
        let third = b.add_limit(Side::Sell, 100, 30, TimeInForce::Gfd, &mut recording(&mut trades));
        assert!(b.cancel(second));
        assert_eq!(b.best_ask_size(), Some(40));
        b.check_invariants();

        let buy = b.add_limit(Side::Buy, 100, 40, TimeInForce::Gfd, &mut recording(&mut trades));
        assert_eq!(trades, vec![(100, 10, buy, first), (100, 30, buy, third)]);
        b.check_invariants();
    }

    #[test]
    fn cancel_head_promotes_next_in_queue() {
        let mut b = book();
        let mut trades = Vec::new();
        let first = b.add_limit(Side::Buy, 100, 2, TimeInForce::Gfd, &mut recording(&mut trades));
        let second = b.add_limit(Side::Buy, 100, 3, TimeInForce::Gfd, &mut recording(&mut trades));
        assert!(b.cancel(first));
        let sell = b.add_limit(Side::Sell, 99, 2, TimeInForce::Gfd, &mut recording(&mut trades));
        assert_eq!(trades, vec![(100, 2, second, sell)]);
        assert_eq!(b.best_bid_size(), Some(1));
        b.check_invariants();
    }

    #[test]
    fn cancel_last_order_erases_the_level() {
        let mut b = book();
        let mut trades = Vec::new();
        let id = b.add_limit(Side::Sell, 100, 5, TimeInForce::Gfd, &mut recording(&mut trades));
        b.add_limit(Side::Sell, 101, 5, TimeInForce::Gfd, &mut recording(&mut trades));
        assert!(b.cancel(id));
        assert_eq!(b.best_ask(), Some(101));
        assert_eq!(b.ask_levels(10), vec![(101, 5)]);
        b.check_invariants();
    }

    #[test]
    fn replace_moves_order_and_loses_priority() {
        let mut b = book();
        let mut trades = Vec::new();
        let old = b.add_limit(Side::Sell, 100, 50, TimeInForce::Gfd, &mut recording(&mut trades));
        let new = b.replace(old, Side::Sell, 102, 30, TimeInForce::Gfd, &mut recording(&mut trades));
        assert_eq!(new, 2);
        assert!(b.order(old).is_none());
        assert_eq!(b.order(new).map(|o| (o.price, o.qty)), Some((102, 30)));

        // A buy below the new price no longer crosses.
        b.add_limit(Side::Buy, 101, 100, TimeInForce::Gfd, &mut recording(&mut trades));
        assert!(trades.is_empty());
        assert_eq!(b.best_bid(), Some(101));
        assert_eq!(b.best_ask(), Some(102));
        b.check_invariants();
    }

    #[test]
    fn replace_unknown_id_degrades_to_new_limit() {
        let mut b = book();
        let mut trades = Vec::new();
        let id = b.replace(999, Side::Buy, 95, 10, TimeInForce::Gfd, &mut recording(&mut trades));
        assert_eq!(id, 1);
        assert_eq!(b.best_bid(), Some(95));
        b.check_invariants();
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut b = book();
        let mut trades = Vec::new();
        let a = b.add_limit(Side::Buy, 90, 1, TimeInForce::Gfd, &mut recording(&mut trades));
        let c = b.add_limit(Side::Sell, 95, 1, TimeInForce::Fok, &mut recording(&mut trades));
        let d = b.add_market(Side::Sell, 1, &mut recording(&mut trades));
        assert!(a < c && c < d);
    }

    #[test]
    fn stats_accumulate_across_trades() {
        let mut b = book();
        let mut trades = Vec::new();
        b.add_limit(Side::Sell, 100, 50, TimeInForce::Gfd, &mut recording(&mut trades));
        b.add_limit(Side::Sell, 101, 50, TimeInForce::Gfd, &mut recording(&mut trades));
        b.add_limit(Side::Buy, 101, 70, TimeInForce::Gfd, &mut recording(&mut trades));

        let stats = b.stats();
        assert_eq!(stats.trade_count, 2);
        assert_eq!(stats.traded_qty, 70);
        assert_eq!(stats.last_trade_price, Some(101));
        assert_eq!(
            stats.traded_qty,
            trades.iter().map(|(_, q, _, _)| q).sum::<Qty>()
        );
    }

    #[test]
    fn mid_price_truncates_toward_zero() {
        let mut b = book();
        let mut trades = Vec::new();
        b.add_limit(Side::Buy, 99, 1, TimeInForce::Gfd, &mut recording(&mut trades));
        assert_eq!(b.mid_price(), None);
        b.add_limit(Side::Sell, 102, 1, TimeInForce::Gfd, &mut recording(&mut trades));
        assert_eq!(b.mid_price(), Some(100));
    }

    #[test]
    fn print_book_renders_both_sides_best_first() {
        let mut b = book();
        let mut trades = Vec::new();
        b.add_limit(Side::Buy, 98, 10, TimeInForce::Gfd, &mut recording(&mut trades));
        b.add_limit(Side::Buy, 99, 5, TimeInForce::Gfd, &mut recording(&mut trades));
        b.add_limit(Side::Sell, 101, 7, TimeInForce::Gfd, &mut recording(&mut trades));

        let mut out = Vec::new();
        b.print_book(&mut out, 5).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "OrderBook(TEST)\n\
             \tAsks:\n\
             \t\tpx=101 total_qty=7 (orders=1)\n\
             \tBids:\n\
             \t\tpx=99 total_qty=5 (orders=1)\n\
             \t\tpx=98 total_qty=10 (orders=1)\n"
        );
    }
}
