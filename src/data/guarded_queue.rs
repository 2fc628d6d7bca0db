//! Mutex-guarded wrapper that makes [`RingBuffer`] safe to share between tasks.
//!
//! Every operation takes the lock for exactly the duration of the underlying ring
//! operation and releases it before returning. The critical sections are O(1) (or O(n) for
//! [`GuardedQueue::drain`]) and never await, print or block on anything else, so contention
//! windows stay short even when a periodic task and the command interface collide.
//!
//! The queue does not report overflows itself. [`GuardedQueue::enqueue`] returns an
//! [`Admission`] whose `overflow_started` flag is set once per overflow episode; the caller
//! decides how to surface it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::ring_buffer::{EnqueueOutcome, OverwritePolicy, RingBuffer};
use crate::error::QueueError;

/// Outcome of [`GuardedQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Admission {
    /// What the ring did with the value.
    pub outcome: EnqueueOutcome,
    /// True on the first rejection of an overflow episode.
    pub overflow_started: bool,
}

/// Point-in-time view of a queue, taken under a single lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// Live elements.
    pub len: usize,
    /// Usable slots.
    pub usable_capacity: usize,
    /// Whether an overflow episode is in progress.
    pub overflowing: bool,
}

/// A named [`RingBuffer`] behind a mutex.
#[derive(Debug)]
pub struct GuardedQueue<T> {
    name: String,
    ring: Mutex<RingBuffer<T>>,
}

impl<T> GuardedQueue<T> {
    /// Create a queue with `capacity` slots (`capacity - 1` usable).
    ///
    /// # Errors
    /// Returns [`QueueError::InvalidCapacity`] when `capacity < 2`.
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self, QueueError> {
        Ok(Self {
            name: name.into(),
            ring: Mutex::new(RingBuffer::new(capacity)?),
        })
    }

    /// Name used in diagnostics, e.g. `"acquisition"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue `value` under `policy`.
    pub fn enqueue(&self, value: T, policy: OverwritePolicy) -> Admission {
        let mut ring = self.lock();
        let outcome = ring.enqueue(value, policy);
        let overflow_started = outcome == EnqueueOutcome::Rejected && ring.note_overflow();
        Admission {
            outcome,
            overflow_started,
        }
    }

    /// Remove and return the oldest value.
    pub fn dequeue(&self) -> Option<T> {
        self.lock().dequeue()
    }

    /// Remove every value, oldest first, in one critical section.
    pub fn drain(&self) -> Vec<T> {
        let mut ring = self.lock();
        let mut items = Vec::with_capacity(ring.len());
        while let Some(value) = ring.dequeue() {
            items.push(value);
        }
        items
    }

    /// Empty the queue and reset its overflow state.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no element is live.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Total slots, including the reserved one.
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Length, usable capacity and overflow state in one acquisition.
    pub fn snapshot(&self) -> QueueSnapshot {
        let ring = self.lock();
        QueueSnapshot {
            len: ring.len(),
            usable_capacity: ring.usable_capacity(),
            overflowing: ring.overflow_notified(),
        }
    }

    // A panic while holding the guard cannot leave the ring half-updated: every ring
    // method restores its invariants before returning. Recover instead of propagating.
    fn lock(&self) -> MutexGuard<'_, RingBuffer<T>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
