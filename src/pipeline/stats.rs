//! Per-task runtime counters.
//!
//! Tasks update their [`TaskStats`] with relaxed atomics after each cycle; the status
//! reporter reads them without taking any lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters for one task.
#[derive(Debug)]
pub struct TaskStats {
    name: String,
    cycles: AtomicU64,
    items: AtomicU64,
    lost: AtomicU64,
    busy_nanos: AtomicU64,
}

/// Copy of a [`TaskStats`] at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatsSnapshot {
    /// Task name.
    pub name: String,
    /// Completed cycles (or handled commands, for the command task).
    pub cycles: u64,
    /// Samples handled.
    pub items: u64,
    /// Samples rejected or evicted.
    pub lost: u64,
    /// Time spent inside cycle bodies.
    pub busy: Duration,
}

impl TaskStats {
    /// Zeroed counters for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cycles: AtomicU64::new(0),
            items: AtomicU64::new(0),
            lost: AtomicU64::new(0),
            busy_nanos: AtomicU64::new(0),
        }
    }

    /// Task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Account for one completed cycle.
    pub fn record_cycle(&self, busy: Duration, items: u64, lost: u64) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.items.fetch_add(items, Ordering::Relaxed);
        self.lost.fetch_add(lost, Ordering::Relaxed);
        let nanos = u64::try_from(busy.as_nanos()).unwrap_or(u64::MAX);
        self.busy_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> TaskStatsSnapshot {
        TaskStatsSnapshot {
            name: self.name.clone(),
            cycles: self.cycles.load(Ordering::Relaxed),
            items: self.items.load(Ordering::Relaxed),
            lost: self.lost.load(Ordering::Relaxed),
            busy: Duration::from_nanos(self.busy_nanos.load(Ordering::Relaxed)),
        }
    }
}
