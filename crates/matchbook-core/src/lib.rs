//! matchbook-core
//!
//! Price-time priority matching core:
//! - shared data model (events, orders, trades, statistics)
//! - per-symbol order book with pooled FIFO levels and O(1) cancel
//! - symbol interning with stable name storage
//! - multi-symbol engine with lazy book creation and a trade callback
//! - bounded SPSC queue and the single-worker async shell

pub mod types;
pub mod side;
pub mod order_type;
pub mod time_in_force;
pub mod order;
pub mod trade;
pub mod top_of_book;
pub mod events;
pub mod symbol_index;
pub mod order_book;
pub mod user_tracking;
pub mod matching_engine;
pub mod spsc;
pub mod async_engine;

pub use types::{OrderId, Price, Qty, SymbolId, UserId};

pub use side::Side;
pub use order_type::OrderType;
pub use time_in_force::TimeInForce;

pub use events::{Event, EventType, InternalEvent, DEFAULT_USER};
pub use order::Order;
pub use top_of_book::TopOfBook;
pub use trade::{BookStats, Trade};

pub use order_book::OrderBook;
pub use symbol_index::{SymbolIndex, SymbolTable};
pub use user_tracking::UserSymbolPosition;

pub use matching_engine::{MatchingEngine, TradeCallback, DEFAULT_MAX_ABS_POSITION};

pub use async_engine::{AsyncMatchingEngine, DEFAULT_QUEUE_CAPACITY};
pub use spsc::SpscQueue;
