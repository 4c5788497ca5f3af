//! Synthetic randomized benchmarks for the sync and async paths.
//!
//! One symbol, a mix of new limits and cancels of previously issued ids,
//! fixed seed so runs are comparable across builds.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use matchbook_core::{
    AsyncMatchingEngine, Event, MatchingEngine, OrderId, Side, TimeInForce, TradeCallback,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: u64 = 12345;
const SYMBOL: &str = "FOO";

struct Counters {
    trades: Arc<AtomicU64>,
    qty: Arc<AtomicI64>,
}

fn counting_callback() -> (TradeCallback, Counters) {
    let trades = Arc::new(AtomicU64::new(0));
    let qty = Arc::new(AtomicI64::new(0));
    let counters = Counters {
        trades: Arc::clone(&trades),
        qty: Arc::clone(&qty),
    };
    let cb: TradeCallback = Box::new(move |t| {
        trades.fetch_add(1, Ordering::Relaxed);
        qty.fetch_add(t.qty, Ordering::Relaxed);
    });
    (cb, counters)
}

fn report_throughput(num_events: usize, elapsed_secs: f64) {
    println!(
        "Processed {} events in {:.3} s, ~{:.2} M events/s",
        num_events,
        elapsed_secs,
        num_events as f64 / elapsed_secs / 1e6
    );
}

/// Drive the synchronous engine directly. Cancels target real ids, since
/// the caller learns each assigned id immediately.
pub fn run_sync(num_events: usize) {
    let (cb, counters) = counting_callback();
    let mut engine = MatchingEngine::new(cb);
    let sym = engine.resolve_symbol(SYMBOL);

    let mut rng = StdRng::seed_from_u64(SEED);
    let mut live_orders: Vec<OrderId> = Vec::with_capacity(num_events);

    let start = Instant::now();
    for _ in 0..num_events {
        if !live_orders.is_empty() && rng.gen_range(0..10) == 0 {
            let idx = rng.gen_range(0..live_orders.len());
            let id = live_orders.swap_remove(idx);
            engine.cancel(sym, id);
        } else {
            let side = if rng.gen_range(0..2) == 0 {
                Side::Buy
            } else {
                Side::Sell
            };
            let price = rng.gen_range(95..=105);
            let qty = rng.gen_range(1..=100);
            let id = engine.new_limit(sym, 1, side, price, qty, TimeInForce::Gfd);
            live_orders.push(id);
        }
    }
    let elapsed = start.elapsed().as_secs_f64();

    report_throughput(num_events, elapsed);
    println!("{SYMBOL} {}", engine.top_of_book_by_name(SYMBOL));
    println!(
        "Trades executed: {}, total traded qty = {}",
        counters.trades.load(Ordering::Relaxed),
        counters.qty.load(Ordering::Relaxed)
    );
}

/// Push the same flow through the SPSC queue and worker thread. The
/// producer never learns assigned ids on this path (there is no ack
/// channel), so the flow is all limit orders.
pub fn run_async(num_events: usize) {
    let (cb, counters) = counting_callback();
    let mut async_eng = AsyncMatchingEngine::new(cb);

    let mut rng = StdRng::seed_from_u64(SEED);

    let start = Instant::now();
    for _ in 0..num_events {
        let side = if rng.gen_range(0..2) == 0 {
            Side::Buy
        } else {
            Side::Sell
        };
        let price = rng.gen_range(95..=105);
        let qty = rng.gen_range(1..=100);
        async_eng.submit(&Event::limit(SYMBOL, side, price, qty, TimeInForce::Gfd));
    }
    // Drain everything that was queued, then join the worker.
    async_eng.stop();
    let elapsed = start.elapsed().as_secs_f64();

    println!("--- Async benchmark ---");
    report_throughput(num_events, elapsed);
    if let Some(stats) = async_eng
        .engine()
        .and_then(|e| e.book_stats_by_name(SYMBOL))
    {
        print!("{SYMBOL} trades={} volume={}", stats.trade_count, stats.traded_qty);
        if let Some(px) = stats.last_trade_price {
            print!(" last_px={px}");
        }
        println!();
    }
    println!(
        "Trades executed: {}, total traded qty = {}",
        counters.trades.load(Ordering::Relaxed),
        counters.qty.load(Ordering::Relaxed)
    );
}
