//! Line-oriented text protocol.
//!
//! One record per line, fields comma-separated, leading and trailing
//! whitespace trimmed per field. Blank lines and lines starting with `#`
//! are ignored.
//!
//! Input records (lines -> [`Command`]):
//!
//! - New limit:
//!   `L,symbol,side,price,qty,tif` (default user)
//!   `L,user,symbol,side,price,qty,tif` (explicit user)
//!
//! - New market:
//!   `M,symbol,side,qty`
//!   `M,user,symbol,side,qty`
//!
//! - Cancel:
//!   `C,symbol,orderId`
//!
//! - Replace:
//!   `R,symbol,oldId,side,price,qty,tif`
//!
//! - Depth dump (REPL only):
//!   `D,symbol[,depth]` (depth defaults to 5; non-positive falls back to 5)
//!
//! - User position query (REPL only):
//!   `U,userId,symbol`
//!
//! - Quit: `q` / `Q` / `quit` / `QUIT`
//!
//! `side` is `B` or `S`; `tif` is `GFD`, `IOC` or `FOK`. Quantities must
//! be positive: the book itself does not validate them, this parser is
//! the designated filter.
//!
//! Output record (trade log): `T,symbol,price,qty,buyId,sellId`.

use std::fmt;

use matchbook_core::{Event, Qty, Side, TimeInForce, Trade, UserId};

/// Default number of levels shown by a depth dump.
pub const DEFAULT_DEPTH: usize = 5;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// An order event (`L` / `M` / `C` / `R`) for the engine.
    Event(Event),
    /// `D,symbol[,depth]`: print the top of the book.
    PrintBook { symbol: String, depth: usize },
    /// `U,userId,symbol`: query a user's position.
    UserPosition { user: UserId, symbol: String },
    /// End of input.
    Quit,
}

/// Why a line was rejected. Malformed lines never mutate engine state;
/// the caller reports the error and drops the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// First field is not a known record type.
    UnknownType(String),
    /// Wrong number of fields for the record type.
    FieldCount { kind: char, got: usize },
    /// A numeric field failed to parse.
    InvalidInt { field: &'static str, value: String },
    /// Side field was not `B` or `S`.
    InvalidSide(String),
    /// Time-in-force field was not `GFD`, `IOC` or `FOK`.
    InvalidTif(String),
    /// Quantity was zero or negative.
    InvalidQty(Qty),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownType(t) => write!(f, "unknown record type '{t}'"),
            ParseError::FieldCount { kind, got } => {
                write!(f, "wrong field count for '{kind}' record (got {got})")
            }
            ParseError::InvalidInt { field, value } => {
                write!(f, "invalid {field} '{value}'")
            }
            ParseError::InvalidSide(s) => write!(f, "invalid side '{s}' (expected B or S)"),
            ParseError::InvalidTif(s) => {
                write!(f, "invalid tif '{s}' (expected GFD, IOC or FOK)")
            }
            ParseError::InvalidQty(q) => write!(f, "quantity must be positive (got {q})"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse one line. `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    if matches!(trimmed, "q" | "Q" | "quit" | "QUIT") {
        return Ok(Some(Command::Quit));
    }

    let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    let kind = fields[0];

    let command = match kind.chars().next() {
        Some('L') => parse_limit(&fields)?,
        Some('M') => parse_market(&fields)?,
        Some('C') => parse_cancel(&fields)?,
        Some('R') => parse_replace(&fields)?,
        Some('D') => parse_depth(&fields)?,
        Some('U') => parse_user_query(&fields)?,
        _ => return Err(ParseError::UnknownType(kind.to_string())),
    };
    Ok(Some(command))
}

/// Trade-log record: `T,symbol,price,qty,buyId,sellId`.
pub fn format_trade(t: &Trade<'_>) -> String {
    format!(
        "T,{},{},{},{},{}",
        t.symbol, t.price, t.qty, t.buy_id, t.sell_id
    )
}

// ---------------------------------------------------------------------------
// Per-record parsers
// ---------------------------------------------------------------------------

fn parse_limit(fields: &[&str]) -> Result<Command, ParseError> {
    // L,symbol,side,price,qty,tif  |  L,user,symbol,side,price,qty,tif
    let (user, rest) = match fields.len() {
        6 => (matchbook_core::DEFAULT_USER, &fields[1..]),
        7 => (parse_int("user id", fields[1])?, &fields[2..]),
        got => return Err(ParseError::FieldCount { kind: 'L', got }),
    };
    let symbol = rest[0].to_string();
    let side = parse_side(rest[1])?;
    let price = parse_int("price", rest[2])?;
    let qty = parse_qty(rest[3])?;
    let tif = parse_tif(rest[4])?;
    Ok(Command::Event(Event::limit_for_user(
        user, symbol, side, price, qty, tif,
    )))
}

fn parse_market(fields: &[&str]) -> Result<Command, ParseError> {
    // M,symbol,side,qty  |  M,user,symbol,side,qty
    let (user, rest) = match fields.len() {
        4 => (matchbook_core::DEFAULT_USER, &fields[1..]),
        5 => (parse_int("user id", fields[1])?, &fields[2..]),
        got => return Err(ParseError::FieldCount { kind: 'M', got }),
    };
    let symbol = rest[0].to_string();
    let side = parse_side(rest[1])?;
    let qty = parse_qty(rest[2])?;
    Ok(Command::Event(Event::market_for_user(
        user, symbol, side, qty,
    )))
}

fn parse_cancel(fields: &[&str]) -> Result<Command, ParseError> {
    // C,symbol,orderId
    if fields.len() != 3 {
        return Err(ParseError::FieldCount {
            kind: 'C',
            got: fields.len(),
        });
    }
    let symbol = fields[1].to_string();
    let id = parse_int("order id", fields[2])?;
    Ok(Command::Event(Event::cancel(symbol, id)))
}

fn parse_replace(fields: &[&str]) -> Result<Command, ParseError> {
    // R,symbol,oldId,side,price,qty,tif
    if fields.len() != 7 {
        return Err(ParseError::FieldCount {
            kind: 'R',
            got: fields.len(),
        });
    }
    let symbol = fields[1].to_string();
    let old_id = parse_int("order id", fields[2])?;
    let side = parse_side(fields[3])?;
    let price = parse_int("price", fields[4])?;
    let qty = parse_qty(fields[5])?;
    let tif = parse_tif(fields[6])?;
    Ok(Command::Event(Event::replace(
        symbol, old_id, side, price, qty, tif,
    )))
}

fn parse_depth(fields: &[&str]) -> Result<Command, ParseError> {
    // D,symbol[,depth]
    if fields.len() < 2 || fields.len() > 3 {
        return Err(ParseError::FieldCount {
            kind: 'D',
            got: fields.len(),
        });
    }
    let symbol = fields[1].to_string();
    let depth = if fields.len() == 3 {
        let raw: i64 = parse_int("depth", fields[2])?;
        if raw <= 0 {
            DEFAULT_DEPTH
        } else {
            raw as usize
        }
    } else {
        DEFAULT_DEPTH
    };
    Ok(Command::PrintBook { symbol, depth })
}

fn parse_user_query(fields: &[&str]) -> Result<Command, ParseError> {
    // U,userId,symbol
    if fields.len() != 3 {
        return Err(ParseError::FieldCount {
            kind: 'U',
            got: fields.len(),
        });
    }
    let user = parse_int("user id", fields[1])?;
    let symbol = fields[2].to_string();
    Ok(Command::UserPosition { user, symbol })
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn parse_int(field: &'static str, value: &str) -> Result<i64, ParseError> {
    value.parse::<i64>().map_err(|_| ParseError::InvalidInt {
        field,
        value: value.to_string(),
    })
}

fn parse_qty(value: &str) -> Result<Qty, ParseError> {
    let qty = parse_int("qty", value)?;
    if qty <= 0 {
        return Err(ParseError::InvalidQty(qty));
    }
    Ok(qty)
}

fn parse_side(value: &str) -> Result<Side, ParseError> {
    let mut chars = value.chars();
    match (chars.next().and_then(Side::from_char), chars.next()) {
        (Some(side), None) => Ok(side),
        _ => Err(ParseError::InvalidSide(value.to_string())),
    }
}

fn parse_tif(value: &str) -> Result<TimeInForce, ParseError> {
    TimeInForce::from_str(value).ok_or_else(|| ParseError::InvalidTif(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchbook_core::EventType;

    fn event(line: &str) -> Event {
        match parse_line(line) {
            Ok(Some(Command::Event(e))) => e,
            other => panic!("expected event for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn parses_limit_with_default_user() {
        let e = event("L,FOO,B,100,50,GFD");
        assert_eq!(e.kind, EventType::NewLimit);
        assert_eq!(e.symbol, "FOO");
        assert_eq!(e.side, Side::Buy);
        assert_eq!(e.price, 100);
        assert_eq!(e.qty, 50);
        assert_eq!(e.tif, TimeInForce::Gfd);
        assert_eq!(e.user_id, matchbook_core::DEFAULT_USER);
    }

    #[test]
    fn parses_limit_with_explicit_user() {
        let e = event("L,42,FOO,S,99,10,IOC");
        assert_eq!(e.user_id, 42);
        assert_eq!(e.symbol, "FOO");
        assert_eq!(e.side, Side::Sell);
        assert_eq!(e.tif, TimeInForce::Ioc);
    }

    #[test]
    fn parses_negative_prices() {
        let e = event("L,SPREAD,B,-5,10,GFD");
        assert_eq!(e.price, -5);
    }

    #[test]
    fn parses_market_both_forms() {
        let e = event("M,FOO,S,25");
        assert_eq!(e.kind, EventType::NewMarket);
        assert_eq!(e.tif, TimeInForce::Ioc);
        assert_eq!(e.user_id, matchbook_core::DEFAULT_USER);

        let e = event("M,7,FOO,B,25");
        assert_eq!(e.user_id, 7);
        assert_eq!(e.side, Side::Buy);
    }

    #[test]
    fn parses_cancel_and_replace() {
        let e = event("C,FOO,12");
        assert_eq!(e.kind, EventType::Cancel);
        assert_eq!(e.id, 12);

        let e = event("R,FOO,12,S,105,40,FOK");
        assert_eq!(e.kind, EventType::Replace);
        assert_eq!(e.id, 12);
        assert_eq!(e.price, 105);
        assert_eq!(e.qty, 40);
        assert_eq!(e.tif, TimeInForce::Fok);
    }

    #[test]
    fn parses_depth_with_default_and_fallback() {
        assert_eq!(
            parse_line("D,FOO").unwrap(),
            Some(Command::PrintBook {
                symbol: "FOO".to_string(),
                depth: DEFAULT_DEPTH
            })
        );
        assert_eq!(
            parse_line("D,FOO,3").unwrap(),
            Some(Command::PrintBook {
                symbol: "FOO".to_string(),
                depth: 3
            })
        );
        // Non-positive depth falls back to the default.
        assert_eq!(
            parse_line("D,FOO,-2").unwrap(),
            Some(Command::PrintBook {
                symbol: "FOO".to_string(),
                depth: DEFAULT_DEPTH
            })
        );
    }

    #[test]
    fn parses_user_query_and_quit() {
        assert_eq!(
            parse_line("U,7,FOO").unwrap(),
            Some(Command::UserPosition {
                user: 7,
                symbol: "FOO".to_string()
            })
        );
        for line in ["q", "Q", "quit", "QUIT", "  quit  "] {
            assert_eq!(parse_line(line).unwrap(), Some(Command::Quit));
        }
    }

    #[test]
    fn ignores_blank_lines_and_comments() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# L,FOO,B,1,1,GFD").unwrap(), None);
    }

    #[test]
    fn trims_whitespace_around_fields() {
        let e = event("  L , FOO , B , 100 , 50 , GFD  ");
        assert_eq!(e.symbol, "FOO");
        assert_eq!(e.price, 100);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(matches!(
            parse_line("X,FOO,B,1,1,GFD"),
            Err(ParseError::UnknownType(_))
        ));
        assert!(matches!(
            parse_line("L,FOO,B,100,50"),
            Err(ParseError::FieldCount { kind: 'L', got: 5 })
        ));
        assert!(matches!(
            parse_line("L,FOO,X,100,50,GFD"),
            Err(ParseError::InvalidSide(_))
        ));
        assert!(matches!(
            parse_line("L,FOO,B,abc,50,GFD"),
            Err(ParseError::InvalidInt { field: "price", .. })
        ));
        assert!(matches!(
            parse_line("L,FOO,B,100,50,DAY"),
            Err(ParseError::InvalidTif(_))
        ));
        assert!(matches!(
            parse_line("L,FOO,B,100,0,GFD"),
            Err(ParseError::InvalidQty(0))
        ));
        assert!(matches!(
            parse_line("M,FOO,B,-3"),
            Err(ParseError::InvalidQty(-3))
        ));
        assert!(matches!(
            parse_line("C,FOO"),
            Err(ParseError::FieldCount { kind: 'C', got: 2 })
        ));
    }

    #[test]
    fn formats_trade_records() {
        let t = Trade {
            symbol_id: 0,
            symbol: "FOO",
            price: 100,
            qty: 50,
            buy_id: 3,
            sell_id: 1,
        };
        assert_eq!(format_trade(&t), "T,FOO,100,50,3,1");
    }
}
