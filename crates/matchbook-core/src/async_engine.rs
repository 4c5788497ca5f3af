//! Asynchronous shell around [`MatchingEngine`].
//!
//! One dedicated worker thread owns the engine and drains a bounded SPSC
//! queue of [`InternalEvent`]s in submission order, so per-symbol event
//! ordering is total. The submitting thread resolves symbol names into
//! ids before enqueueing; the worker never mutates the symbol table.
//!
//! Known limitation: the producer does not learn the order ids the books
//! assign, only the worker sees them. There is no acknowledgement channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::events::{Event, EventType, InternalEvent};
use crate::matching_engine::{MatchingEngine, TradeCallback};
use crate::spsc::SpscQueue;
use crate::symbol_index::SymbolTable;

/// Default ring capacity: 2^20 events.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1 << 20;

/// Single-producer async wrapper: submit events from one thread, matching
/// happens on the worker. Call [`stop`](Self::stop) (or drop the engine)
/// to drain and join; the processed engine is available for queries after
/// that.
pub struct AsyncMatchingEngine {
    symbols: SymbolTable,
    queue: Arc<SpscQueue<InternalEvent>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<MatchingEngine>>,
    engine: Option<MatchingEngine>,
}

impl AsyncMatchingEngine {
    pub fn new(on_trade: TradeCallback) -> Self {
        Self::with_capacity(on_trade, DEFAULT_QUEUE_CAPACITY)
    }

    /// Spawn the worker with an explicit queue capacity (rounded up to a
    /// power of two).
    pub fn with_capacity(on_trade: TradeCallback, queue_capacity: usize) -> Self {
        let engine = MatchingEngine::new(on_trade);
        let symbols = engine.symbol_table().clone();
        let queue = Arc::new(SpscQueue::new(queue_capacity));
        let running = Arc::new(AtomicBool::new(true));

        let worker = {
            let queue = Arc::clone(&queue);
            let running = Arc::clone(&running);
            thread::spawn(move || run_worker(engine, queue, running))
        };

        AsyncMatchingEngine {
            symbols,
            queue,
            running,
            worker: Some(worker),
            engine: None,
        }
    }

    /// Submit an external event. The symbol is resolved here, on the
    /// producer side; the worker only ever sees the dense id.
    pub fn submit(&self, e: &Event) {
        let symbol = self.symbols.get_or_create(&e.symbol);
        self.submit_internal(InternalEvent::from_event(e, symbol));
    }

    /// Pre-resolved fast path: no string handling at all. Spins with a
    /// yield while the queue is full; events are never dropped.
    pub fn submit_internal(&self, event: InternalEvent) {
        let mut pending = event;
        while let Err(back) = self.queue.push(pending) {
            pending = back;
            thread::yield_now();
        }
    }

    /// Stop the worker: flip the running flag, enqueue a single `Stop`
    /// sentinel so the worker wakes, and join it. Events submitted before
    /// the sentinel are fully processed first. Idempotent; also invoked
    /// from `Drop`.
    pub fn stop(&mut self) {
        if self
            .running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        self.submit_internal(InternalEvent::stop());
        if let Some(handle) = self.worker.take() {
            match handle.join() {
                Ok(engine) => self.engine = Some(engine),
                Err(_) => error!("matching worker panicked; engine state lost"),
            }
        }
    }

    /// The drained engine, available once [`stop`](Self::stop) has run.
    pub fn engine(&self) -> Option<&MatchingEngine> {
        self.engine.as_ref()
    }

    /// Consume the shell and hand back the drained engine.
    pub fn into_engine(mut self) -> Option<MatchingEngine> {
        self.stop();
        self.engine.take()
    }
}

impl Drop for AsyncMatchingEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker loop: drain the queue FIFO, yield when momentarily empty, exit
/// on the `Stop` sentinel (or when the running flag drops with the queue
/// drained). Returns the engine to the joiner for post-run queries.
fn run_worker(
    mut engine: MatchingEngine,
    queue: Arc<SpscQueue<InternalEvent>>,
    running: Arc<AtomicBool>,
) -> MatchingEngine {
    debug!("matching worker started");
    loop {
        while let Some(event) = queue.pop() {
            if event.kind == EventType::Stop {
                debug!("matching worker stopping");
                return engine;
            }
            engine.process_internal(&event);
        }
        if !running.load(Ordering::Acquire) && queue.is_empty() {
            debug!("matching worker drained");
            return engine;
        }
        thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    use crate::side::Side;
    use crate::time_in_force::TimeInForce;

    #[test]
    fn events_round_trip_through_the_worker() {
        let trades = Arc::new(AtomicU64::new(0));
        let qty = Arc::new(AtomicU64::new(0));
        let cb = {
            let trades = Arc::clone(&trades);
            let qty = Arc::clone(&qty);
            Box::new(move |t: &crate::Trade<'_>| {
                trades.fetch_add(1, Ordering::Relaxed);
                qty.fetch_add(t.qty as u64, Ordering::Relaxed);
            })
        };

        let mut eng = AsyncMatchingEngine::with_capacity(cb, 64);
        eng.submit(&Event::limit("ASY", Side::Sell, 100, 50, TimeInForce::Gfd));
        eng.submit(&Event::limit("ASY", Side::Buy, 100, 50, TimeInForce::Gfd));
        eng.stop();

        assert_eq!(trades.load(Ordering::Relaxed), 1);
        assert_eq!(qty.load(Ordering::Relaxed), 50);

        let engine = eng.engine().unwrap();
        let tob = engine.top_of_book_by_name("ASY");
        assert_eq!(tob.best_bid, None);
        assert_eq!(tob.best_ask, None);
        let stats = engine.book_stats_by_name("ASY").unwrap();
        assert_eq!(stats.trade_count, 1);
        assert_eq!(stats.traded_qty, 50);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut eng = AsyncMatchingEngine::with_capacity(Box::new(|_| {}), 16);
        eng.submit(&Event::limit("FOO", Side::Buy, 10, 5, TimeInForce::Gfd));
        eng.stop();
        eng.stop();
        assert!(eng.engine().is_some());
        assert_eq!(
            eng.engine().unwrap().top_of_book_by_name("FOO").best_bid,
            Some(10)
        );
    }

    #[test]
    fn drop_joins_the_worker() {
        let eng = AsyncMatchingEngine::with_capacity(Box::new(|_| {}), 16);
        eng.submit(&Event::limit("FOO", Side::Buy, 10, 5, TimeInForce::Gfd));
        drop(eng);
    }

    #[test]
    fn into_engine_returns_processed_state() {
        let eng = AsyncMatchingEngine::with_capacity(Box::new(|_| {}), 16);
        eng.submit(&Event::limit("BAR", Side::Sell, 7, 3, TimeInForce::Gfd));
        let engine = eng.into_engine().unwrap();
        assert_eq!(engine.top_of_book_by_name("BAR").best_ask, Some(7));
    }
}
