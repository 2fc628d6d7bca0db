//! Processing task: drain the acquisition queue, transform, publish results.
//!
//! Processing runs at a coarser period than acquisition, so several samples pile up between
//! cycles. Each cycle therefore dequeues until the acquisition queue reports empty, and
//! pushes every transformed value into the result queue with
//! [`OverwritePolicy::Overwrite`]: results are most-recent-value telemetry, and the oldest
//! unread result is silently evicted when the queue is full.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::signal::SampleTransform;
use super::stats::TaskStats;
use super::workload::SimulatedWorkload;
use crate::data::{EnqueueOutcome, OverwritePolicy, SampleQueue};

/// Periodic drain-and-transform stage.
pub struct SampleProcessor {
    acquisition: Arc<SampleQueue>,
    results: Arc<SampleQueue>,
    transform: Box<dyn SampleTransform>,
    period: Duration,
    workload: SimulatedWorkload,
    stats: Arc<TaskStats>,
}

impl SampleProcessor {
    /// Processor moving samples from `acquisition` to `results` every `period`.
    pub fn new(
        acquisition: Arc<SampleQueue>,
        results: Arc<SampleQueue>,
        transform: Box<dyn SampleTransform>,
        period: Duration,
    ) -> Self {
        Self {
            acquisition,
            results,
            transform,
            period,
            workload: SimulatedWorkload::none(),
            stats: Arc::new(TaskStats::new("processing")),
        }
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

    /// Counters updated by this task.
    pub fn stats(&self) -> &Arc<TaskStats> {
        &self.stats
    }

    /// Run one processing cycle and return the number of samples moved.
    pub fn process(&mut self) -> usize {
        let started = Instant::now();
        let mut moved = 0usize;
        let mut evicted = 0u64;

        while let Some(sample) = self.acquisition.dequeue() {
            let result = self.transform.apply(sample);
            let admission = self.results.enqueue(result, OverwritePolicy::Overwrite);
            if admission.outcome == EnqueueOutcome::AcceptedWithEviction {
                evicted += 1;
            }
            moved += 1;
        }
        self.workload.run();

        if moved > 0 {
            debug!(moved, evicted, "processed samples");
        }
        self.stats
            .record_cycle(started.elapsed(), moved as u64, evicted);
        moved
    }

    /// Process forever on absolute deadlines spaced `period` apart.
    pub async fn run(mut self) {
        info!(
            from = self.acquisition.name(),
            to = self.results.name(),
            period = ?self.period,
            "processing task started"
        );
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        loop {
            ticker.tick().await;
            self.process();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::signal::Gain;

    fn queues(acq: usize, res: usize) -> (Arc<SampleQueue>, Arc<SampleQueue>) {
        (
            Arc::new(SampleQueue::new("acquisition", acq).unwrap()),
            Arc::new(SampleQueue::new("result", res).unwrap()),
        )
    }

    #[test]
    fn test_drains_everything_and_applies_transform() {
        let (acq, res) = queues(8, 8);
        for v in [1.0, 2.0, 3.0] {
            let _ = acq.enqueue(v, OverwritePolicy::Reject);
        }
        let mut processor = SampleProcessor::new(
            Arc::clone(&acq),
            Arc::clone(&res),
            Box::new(Gain(2.0)),
            Duration::from_millis(100),
        );

        assert_eq!(processor.process(), 3);
        assert!(acq.is_empty());
        assert_eq!(res.drain(), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_empty_acquisition_queue_ends_cycle() {
        let (acq, res) = queues(4, 4);
        let mut processor = SampleProcessor::new(
            acq,
            Arc::clone(&res),
            Box::new(Gain(1.0)),
            Duration::from_millis(100),
        );
        assert_eq!(processor.process(), 0);
        assert!(res.is_empty());
        assert_eq!(processor.stats().snapshot().cycles, 1);
    }

    #[test]
    fn test_full_result_queue_keeps_newest() {
        let (acq, res) = queues(16, 4);
        for v in 1..=10 {
            let _ = acq.enqueue(f64::from(v), OverwritePolicy::Reject);
        }
        let mut processor = SampleProcessor::new(
            Arc::clone(&acq),
            Arc::clone(&res),
            Box::new(|s: f64| s * 10.0),
            Duration::from_millis(100),
        );

        assert_eq!(processor.process(), 10);
        assert_eq!(res.drain(), vec![80.0, 90.0, 100.0]);

        let snap = processor.stats().snapshot();
        assert_eq!(snap.items, 10);
        assert_eq!(snap.lost, 7);
    }
}
