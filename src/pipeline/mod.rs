//! Periodic acquisition/processing pipeline and its driver.
//!
//! ```text
//!   SampleSource ──Reject──► [acquisition queue] ──► SampleProcessor ──Overwrite──► [result queue]
//!     (1 ms)                                            (100 ms)                        │
//!                                                                                       ▼
//!                                        CommandInterface (fetch / clear, polled) ◄─────┘
//! ```
//!
//! [`Pipeline::build`] creates both queues and all task bodies from [`Settings`]; a queue
//! that cannot be created is fatal and no task is started. [`Pipeline::spawn`] hands each
//! body to the tokio runtime. Periodic tasks wake on absolute deadlines
//! (`tokio::time::interval`), so cycle time never drifts by the length of a cycle body.
//! Termination is process-wide: [`PipelineHandle::shutdown`] aborts every task at once.

pub mod processor;
pub mod signal;
pub mod source;
pub mod stats;
pub mod status;
pub mod workload;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

pub use processor::SampleProcessor;
pub use signal::{Gain, SampleGenerator, SampleTransform, SineGenerator};
pub use source::SampleSource;
pub use stats::{TaskStats, TaskStatsSnapshot};
pub use status::StatusReporter;
pub use workload::SimulatedWorkload;

use crate::command::CommandInterface;
use crate::config::Settings;
use crate::console::{CharSource, Console};
use crate::data::SampleQueue;
use crate::error::AppResult;

/// Fully constructed, not yet running pipeline.
pub struct Pipeline {
    acquisition: Arc<SampleQueue>,
    results: Arc<SampleQueue>,
    source: SampleSource,
    processor: SampleProcessor,
    command: CommandInterface,
    status: Option<StatusReporter>,
    stats: Vec<Arc<TaskStats>>,
}

impl Pipeline {
    /// Build queues and task bodies with the default sine generator and gain transform.
    pub fn build(settings: &Settings, console: Arc<dyn Console>) -> AppResult<Self> {
        let generator = Box::new(SineGenerator::from_config(&settings.acquisition.generator));
        let transform = Box::new(Gain(settings.processing.gain));
        Self::build_with(settings, console, generator, transform)
    }

    /// Build with a caller-supplied generator and transform.
    pub fn build_with(
        settings: &Settings,
        console: Arc<dyn Console>,
        generator: Box<dyn SampleGenerator>,
        transform: Box<dyn SampleTransform>,
    ) -> AppResult<Self> {
        settings.validate()?;

        let acquisition = Arc::new(SampleQueue::new(
            "acquisition",
            settings.acquisition.capacity,
        )?);
        let results = Arc::new(SampleQueue::new("result", settings.processing.capacity)?);

        let source_stats = Arc::new(TaskStats::new("acquisition"));
        let processor_stats = Arc::new(TaskStats::new("processing"));
        let command_stats = Arc::new(TaskStats::new("command"));

        let source = SampleSource::new(
            Arc::clone(&acquisition),
            generator,
            Arc::clone(&console),
            settings.acquisition.period,
        )
        .with_cycle_wrap(settings.acquisition.cycle_wrap)
        .with_workload(SimulatedWorkload::new(settings.acquisition.workload))
        .with_stats(Arc::clone(&source_stats));

        let processor = SampleProcessor::new(
            Arc::clone(&acquisition),
            Arc::clone(&results),
            transform,
            settings.processing.period,
        )
        .with_workload(SimulatedWorkload::new(settings.processing.workload))
        .with_stats(Arc::clone(&processor_stats));

        let command = CommandInterface::new(
            Arc::clone(&acquisition),
            Arc::clone(&results),
            Arc::clone(&console),
            &settings.command,
        )
        .with_stats(Arc::clone(&command_stats));

        let stats = vec![source_stats, processor_stats, command_stats];
        let status = settings.status.enabled.then(|| {
            StatusReporter::new(
                stats.clone(),
                vec![Arc::clone(&acquisition), Arc::clone(&results)],
                console,
                settings.status.period,
            )
        });

        Ok(Self {
            acquisition,
            results,
            source,
            processor,
            command,
            status,
            stats,
        })
    }

    /// Acquisition queue.
    pub fn acquisition(&self) -> &Arc<SampleQueue> {
        &self.acquisition
    }

    /// Result queue.
    pub fn results(&self) -> &Arc<SampleQueue> {
        &self.results
    }

    /// Start every task on the current tokio runtime.
    pub fn spawn(self, input: Box<dyn CharSource>) -> PipelineHandle {
        let mut tasks = vec![
            tokio::spawn(self.source.run()),
            tokio::spawn(self.processor.run()),
            tokio::spawn(self.command.run(input)),
        ];
        if let Some(status) = self.status {
            tasks.push(tokio::spawn(status.run()));
        }
        info!(tasks = tasks.len(), "pipeline started");

        PipelineHandle {
            acquisition: self.acquisition,
            results: self.results,
            stats: self.stats,
            tasks,
        }
    }
}

/// Running pipeline.
pub struct PipelineHandle {
    acquisition: Arc<SampleQueue>,
    results: Arc<SampleQueue>,
    stats: Vec<Arc<TaskStats>>,
    tasks: Vec<JoinHandle<()>>,
}

impl PipelineHandle {
    /// Acquisition queue.
    pub fn acquisition(&self) -> &Arc<SampleQueue> {
        &self.acquisition
    }

    /// Result queue.
    pub fn results(&self) -> &Arc<SampleQueue> {
        &self.results
    }

    /// Counters of the acquisition, processing and command tasks.
    pub fn stats(&self) -> Vec<TaskStatsSnapshot> {
        self.stats.iter().map(|s| s.snapshot()).collect()
    }

    /// Abort every task and wait until they are gone.
    pub async fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
        for task in self.tasks {
            // Aborted tasks resolve with a cancellation error.
            let _ = task.await;
        }
        info!("pipeline stopped");
    }
}
