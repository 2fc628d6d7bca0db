//! # sampleq
//!
//! Fixed-capacity, mutex-guarded sample queues connecting a fast periodic acquisition task,
//! a slower processing task and an on-demand command interface.
//!
//! ## Crate Structure
//!
//! - **`data`**: the `RingBuffer<T>` and the `GuardedQueue<T>` that serialises access to it.
//!   This is where the capacity, overflow-policy and FIFO guarantees live.
//! - **`pipeline`**: the periodic task bodies (`SampleSource`, `SampleProcessor`), the runtime
//!   status reporter, and the `Pipeline` driver that wires them onto the tokio runtime.
//! - **`command`**: the line-buffered `CommandInterface` (fetch / clear).
//! - **`console`**: output sink and non-blocking character input abstractions.
//! - **`config`**: layered `Settings` loaded with figment (defaults, TOML, environment).
//! - **`logging`**: tracing subscriber setup.
//! - **`error`**: `QueueError` and the application-wide `SampleqError`.

pub mod command;
pub mod config;
pub mod console;
pub mod data;
pub mod error;
pub mod logging;
pub mod pipeline;
