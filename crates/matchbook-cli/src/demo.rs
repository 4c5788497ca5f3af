//! Scripted walkthrough of the engine's behaviors, printed to stdout.

use std::io::{self, Write};

use anyhow::Result;
use matchbook_core::{
    AsyncMatchingEngine, Event, MatchingEngine, Side, TimeInForce, Trade,
};

fn printing_callback(prefix: &'static str) -> matchbook_core::TradeCallback {
    Box::new(move |t: &Trade<'_>| {
        println!(
            "{prefix}TRADE symbol={} px={} qty={} buy={} sell={}",
            t.symbol, t.price, t.qty, t.buy_id, t.sell_id
        );
    })
}

fn print_tob(engine: &MatchingEngine, symbol: &str) {
    println!("{symbol} {}", engine.top_of_book_by_name(symbol));
}

pub fn run() -> Result<()> {
    let mut engine = MatchingEngine::new(printing_callback(""));
    let mut stdout = io::stdout();

    // Two resting asks at 100, then a crossing buy that sweeps most of them.
    engine.process(&Event::limit("FOO", Side::Sell, 100, 50, TimeInForce::Gfd));
    engine.process(&Event::limit("FOO", Side::Sell, 100, 60, TimeInForce::Gfd));
    engine.process(&Event::limit("FOO", Side::Buy, 100, 80, TimeInForce::Gfd));
    print_tob(&engine, "FOO");
    if let Some(book) = engine.book_by_name("FOO") {
        book.print_book(&mut stdout, 5)?;
    }

    // Cancel the residual second ask.
    let sym = engine.resolve_symbol("FOO");
    engine.cancel(sym, 2);
    print_tob(&engine, "FOO");
    if let Some(book) = engine.book_by_name("FOO") {
        book.print_book(&mut stdout, 5)?;
    }

    println!("\n--- IOC test (BAR) ---");
    engine.process(&Event::limit("BAR", Side::Sell, 100, 50, TimeInForce::Gfd));
    // Trades 50, the 30 left over is dropped instead of resting.
    engine.process(&Event::limit("BAR", Side::Buy, 100, 80, TimeInForce::Ioc));
    print_tob(&engine, "BAR");

    println!("\n--- FOK test (BAZ) ---");
    engine.process(&Event::limit("BAZ", Side::Sell, 100, 50, TimeInForce::Gfd));
    // 80 cannot fully fill against 50: no trades, book unchanged.
    engine.process(&Event::limit("BAZ", Side::Buy, 100, 80, TimeInForce::Fok));
    print_tob(&engine, "BAZ");
    // 40 can: one trade, 10 left on the ask.
    engine.process(&Event::limit("BAZ", Side::Buy, 100, 40, TimeInForce::Fok));
    print_tob(&engine, "BAZ");

    println!("\n--- Replace test (QUX) ---");
    let sym = engine.resolve_symbol("QUX");
    let old = engine.new_limit(sym, 1, Side::Sell, 100, 50, TimeInForce::Gfd);
    engine.process(&Event::replace("QUX", old, Side::Sell, 102, 30, TimeInForce::Gfd));
    // The replacement moved up to 102, so a 101 buy rests instead of trading.
    engine.process(&Event::limit("QUX", Side::Buy, 101, 100, TimeInForce::Gfd));
    print_tob(&engine, "QUX");

    if let Some(stats) = engine.book_stats_by_name("FOO") {
        print!("FOO trades={} volume={}", stats.trade_count, stats.traded_qty);
        if let Some(px) = stats.last_trade_price {
            print!(" last_px={px}");
        }
        println!();
    }

    println!("\n--- Async engine demo (ASY) ---");
    let mut async_eng = AsyncMatchingEngine::new(printing_callback("ASY "));
    async_eng.submit(&Event::limit("ASY", Side::Sell, 100, 50, TimeInForce::Gfd));
    async_eng.submit(&Event::limit("ASY", Side::Buy, 100, 50, TimeInForce::Gfd));
    async_eng.stop();
    if let Some(engine) = async_eng.engine() {
        print_tob(engine, "ASY");
    }

    stdout.flush()?;
    Ok(())
}
