//! Command interface: line-buffered commands against the two sample queues.
//!
//! Input arrives one character at a time from a [`CharSource`]. When a `'\n'` completes a
//! line:
//!
//! | line           | effect                                                    |
//! |----------------|-----------------------------------------------------------|
//! | fetch token    | drain the result queue and print it as one report         |
//! | clear token    | clear both queues, print two confirmation lines           |
//! | anything else  | print `Undefined command`                                 |
//!
//! The fetch report reads `Samples = [ v1\tv2\t...]` with six decimals per value. Queue
//! locks are released before anything is printed.

pub mod line_buffer;

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

pub use line_buffer::{LineBuffer, LineEvent};

use crate::config::{CommandConfig, COMMAND_TOKEN_LEN};
use crate::console::{CharSource, Console, Input};
use crate::data::{Sample, SampleQueue};
use crate::pipeline::stats::TaskStats;

/// A recognised command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Drain and print the result queue.
    Fetch,
    /// Clear both queues.
    Clear,
}

/// What a completed line did.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Results drained by a fetch, oldest first.
    Fetched(Vec<Sample>),
    /// Both queues were cleared.
    Cleared,
    /// The line was not a command.
    Undefined,
}

/// Result of one [`CommandInterface::poll`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PollOutcome {
    /// Commands completed during this poll, in input order.
    pub outcomes: Vec<CommandOutcome>,
    /// The input source reported it is closed.
    pub closed: bool,
}

/// Render a fetch report.
pub fn format_samples(samples: &[Sample]) -> String {
    let mut out = String::from("Samples = [ ");
    for sample in samples {
        let _ = write!(out, "{sample:.6}\t");
    }
    out.push_str("]\n");
    out
}

/// Event-driven consumer of console commands.
pub struct CommandInterface {
    acquisition: Arc<SampleQueue>,
    results: Arc<SampleQueue>,
    console: Arc<dyn Console>,
    line: LineBuffer,
    fetch_token: String,
    clear_token: String,
    poll_interval: Duration,
    stats: Arc<TaskStats>,
}

impl CommandInterface {
    /// Interface over both queues using the configured tokens and poll interval.
    pub fn new(
        acquisition: Arc<SampleQueue>,
        results: Arc<SampleQueue>,
        console: Arc<dyn Console>,
        config: &CommandConfig,
    ) -> Self {
        Self {
            acquisition,
            results,
            console,
            line: LineBuffer::new(COMMAND_TOKEN_LEN),
            fetch_token: config.fetch_token.clone(),
            clear_token: config.clear_token.clone(),
            poll_interval: config.poll_interval,
            stats: Arc::new(TaskStats::new("command")),
        }
    }

    /// Report into shared counters.
    pub fn with_stats(mut self, stats: Arc<TaskStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Match a completed line against the command tokens.
    pub fn parse(&self, line: &str) -> Option<Command> {
        if line == self.fetch_token {
            Some(Command::Fetch)
        } else if line == self.clear_token {
            Some(Command::Clear)
        } else {
            None
        }
    }

    /// Feed one character; returns the outcome when it completed a line.
    pub fn feed(&mut self, c: char) -> Option<CommandOutcome> {
        let command = match self.line.push(c) {
            LineEvent::Pending => return None,
            LineEvent::Overlong => None,
            LineEvent::Complete(line) => self.parse(&line),
        };
        let started = Instant::now();
        let outcome = self.execute(command);
        self.stats.record_cycle(started.elapsed(), 0, 0);
        Some(outcome)
    }

    /// Consume every pending character without blocking.
    pub fn poll(&mut self, input: &mut dyn CharSource) -> PollOutcome {
        let mut poll = PollOutcome::default();
        loop {
            match input.poll_char() {
                Input::Char(c) => poll.outcomes.extend(self.feed(c)),
                Input::NoData => break,
                Input::Closed => {
                    poll.closed = true;
                    break;
                }
            }
        }
        poll
    }

    /// Poll `input` every `poll_interval` until it closes.
    pub async fn run(mut self, mut input: Box<dyn CharSource>) {
        info!(poll_interval = ?self.poll_interval, "command interface started");
        loop {
            if self.poll(input.as_mut()).closed {
                info!("command input closed");
                return;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    fn execute(&self, command: Option<Command>) -> CommandOutcome {
        match command {
            Some(Command::Fetch) => {
                let samples = self.results.drain();
                debug!(count = samples.len(), "fetch");
                self.console.print(format_args!("{}", format_samples(&samples)));
                CommandOutcome::Fetched(samples)
            }
            Some(Command::Clear) => {
                self.console.print(format_args!("Clearing buffers...\n"));
                self.acquisition.clear();
                self.results.clear();
                info!("buffers cleared");
                self.console.print(format_args!("Buffers cleared\n"));
                CommandOutcome::Cleared
            }
            None => {
                self.console.print(format_args!("Undefined command\n"));
                CommandOutcome::Undefined
            }
        }
    }
}
