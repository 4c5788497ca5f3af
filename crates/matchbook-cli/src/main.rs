//! Command-line front end for the matching engine.
//!
//! With no arguments: run the scripted demo, the synchronous and
//! asynchronous synthetic benchmarks, then an interactive REPL reading
//! the text protocol from stdin. With `--replay <file>`: feed the file
//! through a fresh engine and print a per-symbol summary.

mod bench;
mod demo;
mod repl;
mod replay;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// Number of randomized events each benchmark run pushes through.
const BENCH_EVENTS: usize = 1_000_000;

#[derive(Parser)]
#[clap(name = "matchbook")]
#[clap(about = "Price-time priority matching engine")]
struct Cli {
    /// Replay a line-oriented event file through a fresh engine and print
    /// per-symbol top-of-book and stats
    #[clap(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Enable per-user position tracking and risk checks in the REPL
    #[clap(long)]
    track_users: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    if let Some(path) = cli.replay {
        return replay::run(&path);
    }

    demo::run()?;

    println!("\n--- Running benchmark ---");
    bench::run_sync(BENCH_EVENTS);

    println!("\n--- Running async benchmark ---");
    bench::run_async(BENCH_EVENTS);

    println!();
    repl::run(cli.track_users)
}
