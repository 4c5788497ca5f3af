//! matchbook-protocol
//!
//! Wire-level text encoding for the matching engine: the line-oriented
//! command format consumed by the REPL and replay driver, and the CSV
//! trade-record format written to the trade log.

pub mod text_codec;

pub use text_codec::{format_trade, parse_line, Command, ParseError, DEFAULT_DEPTH};
