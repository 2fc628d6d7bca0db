//! Configuration system using Figment
//!
//! Settings are layered, later sources overriding earlier ones:
//! 1. Built-in defaults (`Settings::default()`)
//! 2. A TOML file (`config/sampleq.toml` unless another path is given)
//! 3. Environment variables prefixed with `SAMPLEQ_`, using `__` between nested keys
//!
//! Durations are humantime strings (`"1ms"`, `"3s"`).
//!
//! # Example
//! ```no_run
//! use sampleq::config::Settings;
//!
//! // SAMPLEQ_ACQUISITION__CAPACITY=2000 overrides acquisition.capacity
//! let settings = Settings::load()?;
//! println!("Acquisition period: {:?}", settings.acquisition.period);
//! # Ok::<(), sampleq::error::SampleqError>(())
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{AppResult, SampleqError};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/sampleq.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SAMPLEQ_";

/// Length of a command token, excluding the `'\n'` terminator.
pub const COMMAND_TOKEN_LEN: usize = 5;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Application settings
    pub application: ApplicationConfig,
    /// Producer task and acquisition queue
    pub acquisition: AcquisitionConfig,
    /// Processor task and result queue
    pub processing: ProcessingConfig,
    /// Command interface
    pub command: CommandConfig,
    /// Runtime status reporter
    pub status: StatusConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Application name
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Log output format (pretty, compact, json)
    pub log_format: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "sampleq".to_string(),
            log_level: "info".to_string(),
            log_format: "compact".to_string(),
        }
    }
}

/// Acquisition stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Slots in the acquisition queue (one is reserved)
    pub capacity: usize,
    /// Producer cycle period
    #[serde(with = "humantime_serde")]
    pub period: Duration,
    /// Cycle index at which the counter returns to zero
    pub cycle_wrap: u64,
    /// Simulated CPU load per cycle (zero disables it)
    #[serde(with = "humantime_serde")]
    pub workload: Duration,
    /// Sample generator parameters
    pub generator: GeneratorConfig,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            period: Duration::from_millis(1),
            cycle_wrap: 1_000_000,
            workload: Duration::ZERO,
            generator: GeneratorConfig::default(),
        }
    }
}

/// Sine generator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Peak amplitude
    pub amplitude: f64,
    /// Frequency in Hz
    pub frequency_hz: f64,
    /// Peak amplitude of additive uniform noise (0 = none)
    pub noise: f64,
    /// Seed for the noise source
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            frequency_hz: 1.0,
            noise: 0.0,
            seed: 0,
        }
    }
}

/// Processing stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Slots in the result queue (one is reserved)
    pub capacity: usize,
    /// Processor cycle period
    #[serde(with = "humantime_serde")]
    pub period: Duration,
    /// Scalar applied to every sample
    pub gain: f64,
    /// Simulated CPU load per cycle (zero disables it)
    #[serde(with = "humantime_serde")]
    pub workload: Duration,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            period: Duration::from_millis(100),
            gain: 2.0,
            workload: Duration::ZERO,
        }
    }
}

/// Command interface configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Sleep between input polls
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Command that drains and prints the result queue
    pub fetch_token: String,
    /// Command that empties both queues
    pub clear_token: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            fetch_token: "obter".to_string(),
            clear_token: "zerar".to_string(),
        }
    }
}

/// Runtime status reporter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Whether the reporter task runs at all
    pub enabled: bool,
    /// Report period
    #[serde(with = "humantime_serde")]
    pub period: Duration,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            period: Duration::from_secs(3),
        }
    }
}

impl Settings {
    /// Load from [`DEFAULT_CONFIG_PATH`] and the environment.
    pub fn load() -> AppResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from a specific file path and the environment, then validate.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let settings: Settings = Self::figment(path.as_ref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The layered provider stack, exposed for callers that want to add their own layers.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> AppResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SampleqError::Configuration(format!("Cannot render settings: {e}")))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> AppResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.to_lowercase().as_str()) {
            return Err(invalid(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.application.log_format.as_str()) {
            return Err(invalid(format!(
                "Invalid log_format '{}'. Must be one of: {}",
                self.application.log_format,
                valid_formats.join(", ")
            )));
        }

        for (section, capacity) in [
            ("acquisition", self.acquisition.capacity),
            ("processing", self.processing.capacity),
        ] {
            if capacity < 2 {
                return Err(invalid(format!(
                    "Invalid {section}.capacity {capacity}. Must be at least 2"
                )));
            }
        }

        for (key, period) in [
            ("acquisition.period", self.acquisition.period),
            ("processing.period", self.processing.period),
            ("command.poll_interval", self.command.poll_interval),
            ("status.period", self.status.period),
        ] {
            if period.is_zero() {
                return Err(invalid(format!("Invalid {key}: must be greater than zero")));
            }
        }

        if self.acquisition.cycle_wrap == 0 {
            return Err(invalid("Invalid acquisition.cycle_wrap 0. Must be positive".into()));
        }

        let generator = &self.acquisition.generator;
        if !generator.amplitude.is_finite()
            || !generator.frequency_hz.is_finite()
            || !generator.noise.is_finite()
            || generator.noise < 0.0
        {
            return Err(invalid(
                "Invalid acquisition.generator: amplitude and frequency must be finite, noise finite and non-negative".into(),
            ));
        }

        if !self.processing.gain.is_finite() {
            return Err(invalid("Invalid processing.gain: must be finite".into()));
        }

        for (key, token) in [
            ("fetch_token", &self.command.fetch_token),
            ("clear_token", &self.command.clear_token),
        ] {
            if token.chars().count() != COMMAND_TOKEN_LEN || token.contains('\n') {
                return Err(invalid(format!(
                    "Invalid command.{key} '{}'. Must be exactly {COMMAND_TOKEN_LEN} characters without newline",
                    token.escape_default()
                )));
            }
        }
        if self.command.fetch_token == self.command.clear_token {
            return Err(invalid(format!(
                "Duplicate command token: {}",
                self.command.fetch_token
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> SampleqError {
    SampleqError::Configuration(message)
}
