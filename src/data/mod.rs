//! Sample storage: the ring buffer and its mutex-guarded wrapper.
pub mod guarded_queue;
pub mod ring_buffer;

pub use guarded_queue::{Admission, GuardedQueue, QueueSnapshot};
pub use ring_buffer::{EnqueueOutcome, OverwritePolicy, RingBuffer};

/// The sample type moved through the pipeline.
pub type Sample = f64;

/// Queue shared between the pipeline tasks.
pub type SampleQueue = GuardedQueue<Sample>;
