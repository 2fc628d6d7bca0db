//! Fixed-capacity circular buffer with an explicit overflow policy.
//!
//! The buffer owns `N` slots and keeps one of them free so that "full" and "empty" remain
//! distinguishable from the indices alone; at most `N - 1` elements are live at any time.
//! An explicit `count` is tracked as well, so `count == 0` is the authoritative emptiness
//! test regardless of where `head` and `tail` point.
//!
//! # Index scheme
//! ```text
//!   head ──► next slot to read
//!   tail ──► last slot written
//!
//!   enqueue:  tail = (tail + 1) % N ; slots[tail] = value
//!   dequeue:  value = slots[head]   ; head = (head + 1) % N
//! ```
//!
//! The buffer is not synchronised. Shared access goes through
//! [`GuardedQueue`](super::guarded_queue::GuardedQueue).

use crate::error::QueueError;

/// What to do when an enqueue finds the buffer at its last free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Drop the new value and leave the buffer untouched.
    Reject,
    /// Evict the oldest value to make room for the new one.
    Overwrite,
}

/// Result of a single enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum EnqueueOutcome {
    /// The value was stored in a free slot.
    Accepted,
    /// The buffer was full under [`OverwritePolicy::Reject`]; the value was dropped.
    Rejected,
    /// The buffer was full under [`OverwritePolicy::Overwrite`]; the oldest value was evicted.
    AcceptedWithEviction,
}

impl EnqueueOutcome {
    /// True when the value made it into the buffer.
    pub fn is_stored(self) -> bool {
        !matches!(self, EnqueueOutcome::Rejected)
    }
}

/// Fixed-capacity FIFO ring.
#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    count: usize,
    overflow_notified: bool,
}

impl<T> RingBuffer<T> {
    /// Create a buffer with `capacity` slots, `capacity - 1` of which are usable.
    ///
    /// # Errors
    /// Returns [`QueueError::InvalidCapacity`] when `capacity < 2`.
    ///
    /// # Example
    /// ```
    /// use sampleq::data::ring_buffer::{EnqueueOutcome, OverwritePolicy, RingBuffer};
    ///
    /// let mut rb = RingBuffer::new(4).unwrap();
    /// assert_eq!(rb.enqueue(1.0, OverwritePolicy::Reject), EnqueueOutcome::Accepted);
    /// assert_eq!(rb.dequeue(), Some(1.0));
    /// ```
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity < 2 {
            return Err(QueueError::InvalidCapacity { capacity });
        }
        let slots = std::iter::repeat_with(|| None)
            .take(capacity)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            slots,
            head: 0,
            tail: capacity - 1,
            count: 0,
            overflow_notified: false,
        })
    }

    /// Store `value`, applying `policy` if the buffer is at its last free slot.
    pub fn enqueue(&mut self, value: T, policy: OverwritePolicy) -> EnqueueOutcome {
        if self.count < self.usable_capacity() {
            self.tail = self.wrap(self.tail + 1);
            self.slots[self.tail] = Some(value);
            self.count += 1;
            self.overflow_notified = false;
            return EnqueueOutcome::Accepted;
        }

        match policy {
            OverwritePolicy::Reject => EnqueueOutcome::Rejected,
            OverwritePolicy::Overwrite => {
                self.slots[self.head] = None;
                self.head = self.wrap(self.head + 1);
                self.tail = self.wrap(self.tail + 1);
                self.slots[self.tail] = Some(value);
                EnqueueOutcome::AcceptedWithEviction
            }
        }
    }

    /// Remove and return the oldest value, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let value = self.slots[self.head].take();
        self.head = self.wrap(self.head + 1);
        self.count -= 1;
        value
    }

    /// Forget every stored value and return to the freshly created state.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.tail = self.slots.len() - 1;
        self.count = 0;
        self.overflow_notified = false;
    }

    /// Raise the overflow flag.
    ///
    /// Returns `true` only for the first call of an overflow episode; the flag stays high
    /// until the next accepted enqueue or [`clear`](Self::clear).
    pub fn note_overflow(&mut self) -> bool {
        let first = !self.overflow_notified;
        self.overflow_notified = true;
        first
    }

    /// Whether the current overflow episode has already been reported.
    pub fn overflow_notified(&self) -> bool {
        self.overflow_notified
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when no element is live.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True when the next enqueue would reject or evict.
    pub fn is_full(&self) -> bool {
        self.count == self.usable_capacity()
    }

    /// Total number of slots, including the reserved one.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Maximum number of live elements (`capacity - 1`).
    pub fn usable_capacity(&self) -> usize {
        self.slots.len() - 1
    }

    #[inline]
    fn wrap(&self, index: usize) -> usize {
        index % self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::VecDeque;

    #[test]
    fn test_rejects_invalid_capacity() {
        assert_eq!(
            RingBuffer::<f64>::new(0).unwrap_err(),
            QueueError::InvalidCapacity { capacity: 0 }
        );
        assert!(RingBuffer::<f64>::new(1).is_err());
        assert!(RingBuffer::<f64>::new(2).is_ok());
    }

    #[test]
    fn test_new_buffer_is_empty() {
        let rb = RingBuffer::<u32>::new(8).unwrap();
        assert!(rb.is_empty());
        assert!(!rb.is_full());
        assert_eq!(rb.len(), 0);
        assert_eq!(rb.capacity(), 8);
        assert_eq!(rb.usable_capacity(), 7);
        assert!(!rb.overflow_notified());
    }

    #[test]
    fn test_reject_scenario() {
        let mut rb = RingBuffer::new(4).unwrap();

        assert_eq!(rb.enqueue(1, OverwritePolicy::Reject), EnqueueOutcome::Accepted);
        assert_eq!(rb.enqueue(2, OverwritePolicy::Reject), EnqueueOutcome::Accepted);
        assert_eq!(rb.enqueue(3, OverwritePolicy::Reject), EnqueueOutcome::Accepted);
        assert!(rb.is_full());
        assert_eq!(rb.enqueue(4, OverwritePolicy::Reject), EnqueueOutcome::Rejected);
        assert_eq!(rb.len(), 3);

        assert_eq!(rb.dequeue(), Some(1));
        assert_eq!(rb.enqueue(4, OverwritePolicy::Reject), EnqueueOutcome::Accepted);

        assert_eq!(rb.dequeue(), Some(2));
        assert_eq!(rb.dequeue(), Some(3));
        assert_eq!(rb.dequeue(), Some(4));
        assert_eq!(rb.dequeue(), None);
    }

    #[test]
    fn test_overwrite_keeps_newest_values() {
        let n = 5;
        let mut rb = RingBuffer::new(n).unwrap();

        for v in 1..=n {
            let outcome = rb.enqueue(v, OverwritePolicy::Overwrite);
            if v < n {
                assert_eq!(outcome, EnqueueOutcome::Accepted);
            } else {
                assert_eq!(outcome, EnqueueOutcome::AcceptedWithEviction);
            }
        }
        assert_eq!(
            rb.enqueue(n + 1, OverwritePolicy::Overwrite),
            EnqueueOutcome::AcceptedWithEviction
        );
        assert_eq!(rb.len(), n - 1);

        let drained: Vec<_> = std::iter::from_fn(|| rb.dequeue()).collect();
        assert_eq!(drained, (3..=n + 1).collect::<Vec<_>>());
    }

    #[test]
    fn test_eviction_does_not_raise_overflow_flag() {
        let mut rb = RingBuffer::new(2).unwrap();
        let _ = rb.enqueue(1, OverwritePolicy::Overwrite);
        let _ = rb.enqueue(2, OverwritePolicy::Overwrite);
        assert!(!rb.overflow_notified());
        assert_eq!(rb.dequeue(), Some(2));
    }

    #[test]
    fn test_clear_behaves_like_fresh_buffer() {
        let mut rb = RingBuffer::new(4).unwrap();
        for v in 0..10 {
            let _ = rb.enqueue(v, OverwritePolicy::Overwrite);
        }
        rb.clear();
        assert_eq!(rb.dequeue(), None);
        assert!(rb.is_empty());

        assert_eq!(rb.enqueue(42, OverwritePolicy::Reject), EnqueueOutcome::Accepted);
        assert_eq!(rb.len(), 1);
        assert_eq!(rb.dequeue(), Some(42));
    }

    #[test]
    fn test_overflow_flag_once_per_episode() {
        let mut rb = RingBuffer::new(2).unwrap();
        let _ = rb.enqueue(1, OverwritePolicy::Reject);

        assert_eq!(rb.enqueue(2, OverwritePolicy::Reject), EnqueueOutcome::Rejected);
        assert!(rb.note_overflow());
        assert_eq!(rb.enqueue(3, OverwritePolicy::Reject), EnqueueOutcome::Rejected);
        assert!(!rb.note_overflow());

        // Room frees up, but the flag only drops on the next accepted enqueue.
        assert_eq!(rb.dequeue(), Some(1));
        assert!(rb.overflow_notified());
        assert_eq!(rb.enqueue(4, OverwritePolicy::Reject), EnqueueOutcome::Accepted);
        assert!(!rb.overflow_notified());

        assert_eq!(rb.enqueue(5, OverwritePolicy::Reject), EnqueueOutcome::Rejected);
        assert!(rb.note_overflow());

        rb.clear();
        assert!(!rb.overflow_notified());
    }

    #[test]
    fn test_dropped_values_are_released() {
        use std::rc::Rc;

        let tracked = Rc::new(());
        let mut rb = RingBuffer::new(3).unwrap();
        let _ = rb.enqueue(Rc::clone(&tracked), OverwritePolicy::Reject);
        let _ = rb.enqueue(Rc::clone(&tracked), OverwritePolicy::Reject);
        let _ = rb.enqueue(Rc::clone(&tracked), OverwritePolicy::Overwrite);
        assert_eq!(Rc::strong_count(&tracked), 3);

        rb.clear();
        assert_eq!(Rc::strong_count(&tracked), 1);
    }

    /// Random operation sequences checked against a `VecDeque` model.
    #[test]
    fn test_random_sequences_match_model() {
        let mut rng = StdRng::seed_from_u64(0x5A3F);

        for capacity in 2..9 {
            let mut rb = RingBuffer::new(capacity).unwrap();
            let mut model = VecDeque::new();
            let mut accepted = 0usize;
            let mut dequeued = 0usize;

            for step in 0..2_000u32 {
                match rng.gen_range(0..10) {
                    0..=5 => match rb.enqueue(step, OverwritePolicy::Reject) {
                        EnqueueOutcome::Accepted => {
                            model.push_back(step);
                            accepted += 1;
                        }
                        EnqueueOutcome::Rejected => {
                            assert_eq!(model.len(), capacity - 1);
                        }
                        EnqueueOutcome::AcceptedWithEviction => {
                            panic!("reject policy must never evict")
                        }
                    },
                    6..=8 => {
                        let got = rb.dequeue();
                        if got.is_some() {
                            dequeued += 1;
                        }
                        assert_eq!(got, model.pop_front());
                    }
                    _ => {
                        if rng.gen_bool(0.1) {
                            rb.clear();
                            model.clear();
                            accepted = 0;
                            dequeued = 0;
                        }
                    }
                }

                assert_eq!(rb.len(), accepted - dequeued);
                assert!(rb.len() <= capacity - 1);
                assert_eq!(rb.len(), model.len());
            }
        }
    }
}
