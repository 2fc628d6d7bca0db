//! Custom error types for the application.
//!
//! Two layers of errors exist:
//!
//! - **`QueueError`**: raised when a ring buffer or guarded queue cannot be created. This is the
//!   only failure the queue layer itself can produce; full or empty queues are ordinary
//!   outcomes reported through return values (`EnqueueOutcome`, `Option`).
//! - **`SampleqError`**: the application-level error. It wraps configuration loading failures
//!   from `figment`, semantic validation failures, queue creation failures and I/O errors.
//!
//! Any `SampleqError` seen before the pipeline starts is fatal: without both queues the
//! pipeline cannot provide its core guarantee, so the binary exits before spawning tasks.

use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, SampleqError>;

/// Errors produced while creating queue storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// One slot is reserved to tell "full" from "empty", so at least two are needed.
    #[error("Invalid queue capacity {capacity}: at least 2 slots are required")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum SampleqError {
    /// The configuration sources could not be read or deserialized.
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The configuration parsed but holds values the pipeline cannot run with.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// A queue could not be created.
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// Console or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for SampleqError {
    fn from(value: figment::Error) -> Self {
        SampleqError::Config(Box::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_error_converts_into_app_error() {
        let app: SampleqError = QueueError::InvalidCapacity { capacity: 1 }.into();
        match app {
            SampleqError::Queue(QueueError::InvalidCapacity { capacity }) => {
                assert_eq!(capacity, 1)
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn invalid_capacity_message_names_the_capacity() {
        let err = QueueError::InvalidCapacity { capacity: 0 };
        assert!(err.to_string().contains("capacity 0"));
    }
}
