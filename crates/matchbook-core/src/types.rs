//! Primitive aliases shared across the engine.
//!
//! Prices and quantities are plain signed 64-bit integers (ticks and
//! units); there are no fractional prices anywhere in the engine.

/// Price in integer ticks. Market orders use `Price::MAX` / `Price::MIN`
/// internally to cross everything on the opposite side.
pub type Price = i64;

/// Quantity in integer units.
pub type Qty = i64;

/// Order identifier, assigned per book, monotonic and starting at 1.
/// The value 0 is never issued and doubles as the risk-reject sentinel.
pub type OrderId = i64;

/// Dense symbol identifier, assigned per engine, monotonic from 0.
pub type SymbolId = u32;

/// User / account identifier carried on events.
pub type UserId = i64;
