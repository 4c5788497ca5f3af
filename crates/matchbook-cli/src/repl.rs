//! Interactive REPL: text-protocol commands on stdin against a
//! synchronous engine, with acknowledgements and a top-of-book line per
//! accepted order, plus append-only event and trade logs.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use matchbook_core::{Event, EventType, MatchingEngine, Trade};
use matchbook_protocol::{format_trade, parse_line, Command};
use tracing::error;

const EVENTS_LOG: &str = "events.log";
const TRADES_LOG: &str = "trades.log";

fn open_append(path: &str) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("could not open {path} for writing"))
}

pub fn run(track_users: bool) -> Result<()> {
    println!("\n--- Interactive mode (sync) ---");
    println!("Formats:");
    println!("  L,symbol,B|S,price,qty,GFD|IOC|FOK");
    println!("  M,symbol,B|S,qty");
    println!("  C,symbol,orderId");
    println!("  R,symbol,oldId,B|S,price,qty,GFD|IOC|FOK");
    println!("  D,symbol[,depth]   U,userId,symbol   q to quit");
    println!();

    let mut events_log = open_append(EVENTS_LOG)?;
    let mut trades_log = open_append(TRADES_LOG)?;

    let on_trade = Box::new(move |t: &Trade<'_>| {
        println!(
            "TRADE {} px={} qty={} buy={} sell={}",
            t.symbol, t.price, t.qty, t.buy_id, t.sell_id
        );
        let record = format_trade(t);
        if let Err(e) = writeln!(trades_log, "{record}").and_then(|()| trades_log.flush()) {
            error!("trade log write failed: {e}");
        }
    });
    let mut engine = if track_users {
        MatchingEngine::with_user_tracking(on_trade)
    } else {
        MatchingEngine::new(on_trade)
    };

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => {
                println!("Stopping order input.");
                break;
            }
            Ok(Some(Command::PrintBook { symbol, depth })) => match engine.book_by_name(&symbol) {
                Some(book) => {
                    let mut out = io::stdout().lock();
                    book.print_book(&mut out, depth)?;
                }
                None => println!("No book for symbol: {symbol}"),
            },
            Ok(Some(Command::UserPosition { user, symbol })) => {
                match engine.user_position(user, &symbol) {
                    Some(pos) => println!(
                        "User {user} {symbol} position={} traded_volume={}",
                        pos.position, pos.traded_volume
                    ),
                    None => println!("User {user} has no position in {symbol}"),
                }
            }
            Ok(Some(Command::Event(event))) => {
                writeln!(events_log, "{}", line.trim()).context("writing events.log")?;
                events_log.flush().context("flushing events.log")?;
                apply_event(&mut engine, &event);
            }
            Err(err) => eprintln!("{err}: {line}"),
        }
    }
    Ok(())
}

/// Apply one order event and print the acknowledgement plus the symbol's
/// top-of-book afterwards.
fn apply_event(engine: &mut MatchingEngine, e: &Event) {
    let sym = engine.resolve_symbol(&e.symbol);
    match e.kind {
        EventType::NewLimit => {
            let id = engine.new_limit(sym, e.user_id, e.side, e.price, e.qty, e.tif);
            println!(
                "ACK L id={id} symbol={} side={} px={} qty={} tif={}",
                e.symbol,
                e.side.as_char(),
                e.price,
                e.qty,
                e.tif.as_str()
            );
        }
        EventType::NewMarket => {
            let id = engine.new_market(sym, e.user_id, e.side, e.qty);
            println!(
                "ACK M id={id} symbol={} side={} qty={}",
                e.symbol,
                e.side.as_char(),
                e.qty
            );
        }
        EventType::Cancel => {
            let ok = engine.cancel(sym, e.id);
            let verdict = if ok { "ACK" } else { "REJECT" };
            println!("{verdict} C id={} symbol={}", e.id, e.symbol);
        }
        EventType::Replace => {
            let new_id = engine.replace(sym, e.user_id, e.id, e.side, e.price, e.qty, e.tif);
            println!("ACK R old_id={} new_id={new_id} symbol={}", e.id, e.symbol);
        }
        EventType::Stop => return,
    }
    println!("{} {}", e.symbol, engine.top_of_book(sym));
}
