//! Replay driver: feed an `events.log`-compatible file through a fresh
//! synchronous engine and print a per-symbol summary at the end.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use matchbook_core::MatchingEngine;
use matchbook_protocol::{parse_line, Command};

pub fn run(path: &Path) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("cannot open replay file: {}", path.display()))?;

    // Trades are not printed during replay; the summary speaks for itself.
    let mut engine = MatchingEngine::new(Box::new(|_| {}));
    let mut symbols: BTreeSet<String> = BTreeSet::new();

    for line in BufReader::new(file).lines() {
        let line = line.context("reading replay file")?;
        match parse_line(&line) {
            Ok(Some(Command::Event(event))) => {
                symbols.insert(event.symbol.clone());
                engine.process(&event);
            }
            // Depth and position queries may appear in captured sessions;
            // they carry no state and are skipped.
            Ok(_) => {}
            Err(err) => eprintln!("{err}: {line}"),
        }
    }

    println!("\n--- Replay summary for file: {} ---", path.display());
    for symbol in &symbols {
        println!("{symbol} {}", engine.top_of_book_by_name(symbol));
        if let Some(stats) = engine.book_stats_by_name(symbol) {
            print!("  trades={} volume={}", stats.trade_count, stats.traded_qty);
            if let Some(px) = stats.last_trade_price {
                print!(" last_px={px}");
            }
            println!();
        }
    }
    Ok(())
}
