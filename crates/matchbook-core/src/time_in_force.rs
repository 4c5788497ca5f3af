//! Time-in-force policies for limit orders.

/// How long an order is allowed to work.
///
/// - `Gfd` (good for day): any unmatched remainder rests on the book.
/// - `Ioc` (immediate or cancel): match what is possible, drop the rest.
/// - `Fok` (fill or kill): match the full quantity immediately or do
///   nothing at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimeInForce {
    Gfd,
    Ioc,
    Fok,
}

impl TimeInForce {
    /// Wire representation (`"GFD"` / `"IOC"` / `"FOK"`).
    pub fn as_str(self) -> &'static str {
        match self {
            TimeInForce::Gfd => "GFD",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
        }
    }

    /// Try to parse from the wire representation (case-sensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GFD" => Some(TimeInForce::Gfd),
            "IOC" => Some(TimeInForce::Ioc),
            "FOK" => Some(TimeInForce::Fok),
            _ => None,
        }
    }
}
