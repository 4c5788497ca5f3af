//! Bounded lock-free single-producer / single-consumer ring buffer.
//!
//! Hands events by value from the submission thread to the matching
//! worker with no locks and no per-event allocation. Capacity is rounded
//! up to a power of two so index wrapping is a mask.
//!
//! Memory ordering: the producer publishes a slot with a Release store of
//! `head`; the consumer observes it with an Acquire load, and vice versa
//! for `tail`. Producer and consumer indices live on separate cache lines
//! to avoid false sharing.
//!
//! # Safety contract
//!
//! At most one thread may call [`SpscQueue::push`] and at most one thread
//! may call [`SpscQueue::pop`] at any time. The async engine upholds this
//! structurally: the submitting side is the sole producer, the worker
//! thread the sole consumer.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Pads an index onto its own cache line.
#[repr(align(64))]
struct CacheAligned<T>(T);

pub struct SpscQueue<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    mask: usize,
    /// Next write position; owned by the producer.
    head: CacheAligned<AtomicUsize>,
    /// Next read position; owned by the consumer.
    tail: CacheAligned<AtomicUsize>,
}

unsafe impl<T: Send> Send for SpscQueue<T> {}
unsafe impl<T: Send> Sync for SpscQueue<T> {}

impl<T> SpscQueue<T> {
    /// Create a queue holding at least `capacity` elements (rounded up to
    /// a power of two, minimum 2).
    pub fn new(capacity: usize) -> Self {
        let cap = capacity.next_power_of_two().max(2);
        let slots = (0..cap)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        SpscQueue {
            slots,
            mask: cap - 1,
            head: CacheAligned(AtomicUsize::new(0)),
            tail: CacheAligned(AtomicUsize::new(0)),
        }
    }

    /// Producer side: enqueue `value`, or hand it back if the ring is full.
    pub fn push(&self, value: T) -> Result<(), T> {
        let head = self.head.0.load(Ordering::Relaxed);
        let tail = self.tail.0.load(Ordering::Acquire);
        if head.wrapping_sub(tail) > self.mask {
            return Err(value);
        }
        let idx = head & self.mask;
        unsafe {
            (*self.slots[idx].get()).write(value);
        }
        self.head.0.store(head.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Consumer side: dequeue the oldest value, if any.
    pub fn pop(&self) -> Option<T> {
        let tail = self.tail.0.load(Ordering::Relaxed);
        let head = self.head.0.load(Ordering::Acquire);
        if tail == head {
            return None;
        }
        let idx = tail & self.mask;
        let value = unsafe { (*self.slots[idx].get()).assume_init_read() };
        self.tail.0.store(tail.wrapping_add(1), Ordering::Release);
        Some(value)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the number of queued elements. Exact only when called
    /// from the producer or consumer thread.
    pub fn len(&self) -> usize {
        let head = self.head.0.load(Ordering::Acquire);
        let tail = self.tail.0.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }

    /// Usable capacity of the ring.
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }
}

impl<T> Drop for SpscQueue<T> {
    fn drop(&mut self) {
        // Exclusive access here, so draining through pop is race-free.
        while self.pop().is_some() {}
    }
}
