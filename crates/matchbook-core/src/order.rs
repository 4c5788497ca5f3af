//! Order representation used inside the book.

use crate::order_type::OrderType;
use crate::side::Side;
use crate::time_in_force::TimeInForce;
use crate::types::{OrderId, Price, Qty};

/// A single order, resting or in flight.
///
/// `qty` is the remaining (unfilled) quantity; it is decremented in place
/// as the order trades. Orders are created by the book, which assigns the
/// id, and destroyed on full fill, cancel, or replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub price: Price,
    pub qty: Qty,
    pub side: Side,
    pub order_type: OrderType,
    pub tif: TimeInForce,
}

impl Order {
    /// Returns `true` once the order has no quantity left.
    pub fn is_filled(&self) -> bool {
        self.qty == 0
    }
}
