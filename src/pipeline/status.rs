//! Best-effort runtime status reporter.
//!
//! Periodically prints one line per task (cycles, busy time, samples handled and lost) and
//! one line per queue (occupancy against usable capacity). Reading task counters is
//! lock-free; each queue is locked once for its snapshot.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use super::stats::TaskStats;
use crate::console::Console;
use crate::data::SampleQueue;

/// Periodic status printer.
pub struct StatusReporter {
    tasks: Vec<Arc<TaskStats>>,
    queues: Vec<Arc<SampleQueue>>,
    console: Arc<dyn Console>,
    period: Duration,
}

impl StatusReporter {
    /// Reporter printing to `console` every `period`.
    pub fn new(
        tasks: Vec<Arc<TaskStats>>,
        queues: Vec<Arc<SampleQueue>>,
        console: Arc<dyn Console>,
        period: Duration,
    ) -> Self {
        Self {
            tasks,
            queues,
            console,
            period,
        }
    }

    /// Format the current status table.
    pub fn render(&self) -> String {
        let mut out = String::from("TASKS RUNTIME STATUS:\n");
        let _ = writeln!(
            out,
            "{:<14}{:>12}{:>14}{:>12}{:>10}",
            "task", "cycles", "busy_us", "samples", "lost"
        );
        for stats in &self.tasks {
            let snap = stats.snapshot();
            let _ = writeln!(
                out,
                "{:<14}{:>12}{:>14}{:>12}{:>10}",
                snap.name,
                snap.cycles,
                snap.busy.as_micros(),
                snap.items,
                snap.lost
            );
        }
        for queue in &self.queues {
            let snap = queue.snapshot();
            let _ = writeln!(
                out,
                "{:<14}{:>12}{:>14}",
                format!("{} queue", queue.name()),
                format!("{}/{}", snap.len, snap.usable_capacity),
                if snap.overflowing { "overflowing" } else { "ok" }
            );
        }
        out
    }

    /// Print the table once.
    pub fn report(&self) {
        self.console.print(format_args!("{}", self.render()));
    }

    /// Report forever, skipping missed ticks: a late report is not worth catching up on.
    pub async fn run(self) {
        info!(period = ?self.period, "status reporter started");
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.period,
            self.period,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.report();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MemoryConsole;
    use crate::data::OverwritePolicy;

    #[test]
    fn test_render_lists_tasks_and_queues() {
        let acq = Arc::new(SampleQueue::new("acquisition", 3).unwrap());
        let _ = acq.enqueue(1.0, OverwritePolicy::Reject);
        let _ = acq.enqueue(2.0, OverwritePolicy::Reject);
        let _ = acq.enqueue(3.0, OverwritePolicy::Reject);

        let stats = Arc::new(TaskStats::new("acquisition"));
        stats.record_cycle(Duration::from_micros(42), 1, 0);

        let console = MemoryConsole::new();
        let reporter = StatusReporter::new(
            vec![stats],
            vec![acq],
            Arc::new(console.clone()),
            Duration::from_secs(3),
        );
        reporter.report();

        let text = console.contents();
        assert!(text.starts_with("TASKS RUNTIME STATUS:\n"));
        let task_line = text.lines().nth(2).unwrap();
        assert!(task_line.starts_with("acquisition"));
        assert!(task_line.contains("42"));
        let queue_line = text.lines().nth(3).unwrap();
        assert!(queue_line.starts_with("acquisition queue"));
        assert!(queue_line.contains("2/2"));
        assert!(queue_line.contains("overflowing"));
    }
}
