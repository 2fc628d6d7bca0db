//! Simulated CPU load for the periodic tasks.

use std::time::{Duration, Instant};

/// Busy-spins for a fixed duration each cycle, standing in for real acquisition or
/// processing cost. A zero duration makes [`SimulatedWorkload::run`] a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatedWorkload {
    duration: Duration,
}

impl SimulatedWorkload {
    /// Spin for `duration` per cycle.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// No simulated load.
    pub fn none() -> Self {
        Self::default()
    }

    /// Configured spin time.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Burn CPU for the configured duration without yielding.
    pub fn run(&self) {
        if self.duration.is_zero() {
            return;
        }
        let started = Instant::now();
        while started.elapsed() < self.duration {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_workload_returns_immediately() {
        let started = Instant::now();
        SimulatedWorkload::none().run();
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_workload_spins_at_least_its_duration() {
        let workload = SimulatedWorkload::new(Duration::from_millis(5));
        let started = Instant::now();
        workload.run();
        assert!(started.elapsed() >= workload.duration());
    }
}
