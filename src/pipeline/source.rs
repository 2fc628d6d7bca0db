//! Acquisition task: one sample per tick into the acquisition queue.
//!
//! Each cycle computes `elapsed = index × period`, asks the generator for the value at that
//! time, runs the simulated workload and enqueues with [`OverwritePolicy::Reject`]. A full
//! queue drops the sample; the first drop of an overflow episode prints
//! `"<queue> buffer overflow"` on the console. Later drops in the same episode are only
//! counted.
//!
//! The cycle index wraps to zero at `cycle_wrap`. The generator then sees elapsed time zero
//! again, so the waveform restarts its phase at the wrap point.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use super::signal::SampleGenerator;
use super::stats::TaskStats;
use super::workload::SimulatedWorkload;
use crate::console::Console;
use crate::data::{Admission, EnqueueOutcome, OverwritePolicy, SampleQueue};

/// Periodic sample producer.
pub struct SampleSource {
    queue: Arc<SampleQueue>,
    generator: Box<dyn SampleGenerator>,
    console: Arc<dyn Console>,
    period: Duration,
    cycle_wrap: u64,
    index: u64,
    workload: SimulatedWorkload,
    stats: Arc<TaskStats>,
}

impl SampleSource {
    /// Producer writing into `queue` every `period`.
    pub fn new(
        queue: Arc<SampleQueue>,
        generator: Box<dyn SampleGenerator>,
        console: Arc<dyn Console>,
        period: Duration,
    ) -> Self {
        Self {
            queue,
            generator,
            console,
            period,
            cycle_wrap: u64::MAX,
            index: 0,
            workload: SimulatedWorkload::none(),
            stats: Arc::new(TaskStats::new("acquisition")),
        }
    }

    /// Wrap the cycle index to zero once it reaches `cycle_wrap` (must be positive).
    pub fn with_cycle_wrap(mut self, cycle_wrap: u64) -> Self {
        self.cycle_wrap = cycle_wrap.max(1);
        self
    }

    /// Spin for `workload` every cycle.
    pub fn with_workload(mut self, workload: SimulatedWorkload) -> Self {
        self.workload = workload;
        self
    }

    /// Report into shared counters.
    pub fn with_stats(mut self, stats: Arc<TaskStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Index of the next cycle.
    pub fn cycle_index(&self) -> u64 {
        self.index
    }

    /// Counters updated by this task.
    pub fn stats(&self) -> &Arc<TaskStats> {
        &self.stats
    }

    /// Run one production cycle.
    pub fn produce(&mut self) -> Admission {
        let started = Instant::now();
        let elapsed = self.period.mul_f64(self.index as f64);
        let sample = self.generator.sample(elapsed);
        self.workload.run();

        let admission = self.queue.enqueue(sample, OverwritePolicy::Reject);
        if admission.overflow_started {
            self.console
                .print(format_args!("{} buffer overflow\n", self.queue.name()));
            warn!(queue = self.queue.name(), index = self.index, "buffer overflow");
        }
        trace!(index = self.index, sample, outcome = ?admission.outcome, "produced sample");

        self.index += 1;
        if self.index >= self.cycle_wrap {
            debug!(cycle_wrap = self.cycle_wrap, "cycle index wrapped");
            self.index = 0;
        }

        let lost = u64::from(admission.outcome == EnqueueOutcome::Rejected);
        self.stats
            .record_cycle(started.elapsed(), 1 - lost, lost);
        admission
    }

    /// Produce forever on absolute deadlines spaced `period` apart.
    pub async fn run(mut self) {
        info!(
            queue = self.queue.name(),
            period = ?self.period,
            "acquisition task started"
        );
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        loop {
            ticker.tick().await;
            let _ = self.produce();
        }
    }
}
