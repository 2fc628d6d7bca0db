//! CLI entry point for sampleq
//!
//! Runs the acquisition/processing pipeline with commands read from stdin:
//!
//! ```bash
//! sampleq run --config config/sampleq.toml
//! obter      # prints "Samples = [ ... ]" and empties the result queue
//! zerar      # clears both queues
//! ```
//!
//! Print the effective configuration:
//!
//! ```bash
//! sampleq config
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sampleq::config::{Settings, DEFAULT_CONFIG_PATH};
use sampleq::console::{Console, StdinSource, StdoutConsole};
use sampleq::logging;
use sampleq::pipeline::Pipeline;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Exit status after an interactive Ctrl+C.
const INTERRUPTED_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(name = "sampleq")]
#[command(about = "Periodic sample acquisition through guarded ring buffers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline, reading commands from stdin
    Run {
        /// Configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Stop after this long (e.g. "30s") instead of waiting for Ctrl+C
        #[arg(long, value_parser = humantime::parse_duration)]
        duration: Option<Duration>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, duration } => run(config, duration).await,
        Commands::Config { config } => {
            let settings = Settings::load_from(&config)
                .with_context(|| format!("Failed to load {}", config.display()))?;
            print!("{}", settings.to_toml()?);
            Ok(())
        }
    }
}

async fn run(config: PathBuf, duration: Option<Duration>) -> Result<()> {
    let settings = Settings::load_from(&config)
        .with_context(|| format!("Failed to load {}", config.display()))?;
    logging::init_from_settings(&settings)?;

    let console: Arc<dyn Console> = Arc::new(StdoutConsole);
    console.print(format_args!("Starting main app\n"));

    // Queue creation failures end the process here, before any task runs.
    let pipeline = Pipeline::build(&settings, Arc::clone(&console))
        .context("Failed to create sample queues")?;
    let input = StdinSource::spawn().context("Failed to start stdin reader")?;
    let handle = pipeline.spawn(Box::new(input));

    match duration {
        Some(limit) => {
            tokio::select! {
                _ = tokio::time::sleep(limit) => {
                    handle.shutdown().await;
                    Ok(())
                }
                signal = tokio::signal::ctrl_c() => interrupted(signal, console.as_ref()),
            }
        }
        None => interrupted(tokio::signal::ctrl_c().await, console.as_ref()),
    }
}

fn interrupted(signal: std::io::Result<()>, console: &dyn Console) -> Result<()> {
    signal.context("Failed to listen for Ctrl+C")?;
    console.print(format_args!("\nExecution stopped by user (by hitting Ctrl+C)\n"));
    std::process::exit(INTERRUPTED_EXIT_CODE);
}
