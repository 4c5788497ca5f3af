//! Top-of-book snapshot for a single symbol.

use std::fmt;

use crate::types::{Price, Qty};

/// Best bid / best ask and their aggregate sizes, plus the truncated
/// mid price. Every field is `None` when the corresponding side (or
/// the whole book) is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopOfBook {
    pub best_bid: Option<Price>,
    pub bid_size: Option<Qty>,
    pub best_ask: Option<Price>,
    pub ask_size: Option<Qty>,
    pub mid_price: Option<Price>,
}

impl fmt::Display for TopOfBook {
    /// Renders `bid=<px|none> x <sz|0>   ask=<px|none> x <sz|0>[   mid=<px>]`,
    /// the one-line form the REPL and replay summary print after each event.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.best_bid {
            Some(px) => write!(f, "bid={}", px)?,
            None => write!(f, "bid=none")?,
        }
        write!(f, " x {}", self.bid_size.unwrap_or(0))?;
        match self.best_ask {
            Some(px) => write!(f, "   ask={}", px)?,
            None => write!(f, "   ask=none")?,
        }
        write!(f, " x {}", self.ask_size.unwrap_or(0))?;
        if let Some(mid) = self.mid_price {
            write!(f, "   mid={}", mid)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TopOfBook;

    #[test]
    fn formats_empty_book() {
        let tob = TopOfBook::default();
        assert_eq!(tob.to_string(), "bid=none x 0   ask=none x 0");
    }

    #[test]
    fn formats_two_sided_book_with_mid() {
        let tob = TopOfBook {
            best_bid: Some(99),
            bid_size: Some(10),
            best_ask: Some(102),
            ask_size: Some(7),
            mid_price: Some(100),
        };
        assert_eq!(tob.to_string(), "bid=99 x 10   ask=102 x 7   mid=100");
    }
}
