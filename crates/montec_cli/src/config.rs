//! Run settings management
//!
//! Settings come from a TOML file, overridden by CLI arguments. clap fills
//! unset arguments from `MONTEC_*` environment variables, so the effective
//! priority is CLI > environment > file > defaults.

use clap::ValueEnum;
use montec_core::engine::{ConfigError, SamplerConfig, Weighting, DEFAULT_BLOCK_SIZE};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings error types
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error(transparent)]
    Engine(#[from] ConfigError),
}

/// Verbosity of the tracing output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// Result output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => f.write_str("table"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Sampling run settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Requested number of trials
    pub iterations: u64,
    /// Worker threads (None = one per logical CPU)
    pub threads: Option<usize>,
    /// Trials per block
    pub block_size: usize,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
    pub log_level: LogLevel,
    pub format: OutputFormat,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            iterations: 1_000_000,
            threads: None,
            block_size: DEFAULT_BLOCK_SIZE,
            seed: None,
            log_level: LogLevel::Info,
            format: OutputFormat::Table,
        }
    }
}

impl RunSettings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::FileError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| SettingsError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Overlay every argument that was given on the command line or in the
    /// environment
    pub fn merge_with_cli(&mut self, cli: &CliArgs) {
        if let Some(iterations) = cli.iterations {
            self.iterations = iterations;
        }
        if let Some(threads) = cli.threads {
            self.threads = Some(threads);
        }
        if let Some(block_size) = cli.block_size {
            self.block_size = block_size;
        }
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if let Some(format) = cli.format {
            self.format = format;
        }
    }

    /// Build the engine configuration for `weighting`
    pub fn sampler_config(&self, weighting: Weighting) -> Result<SamplerConfig, ConfigError> {
        let mut builder = SamplerConfig::builder()
            .iterations(self.iterations)
            .block_size(self.block_size)
            .weighting(weighting);
        if let Some(threads) = self.threads {
            builder = builder.threads(threads);
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        builder.build()
    }

    /// Validate the settings against the engine's limits
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.sampler_config(Weighting::default())?;
        Ok(())
    }
}

/// Arguments forwarded from the command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Settings file path
    pub config_file: Option<PathBuf>,
    pub iterations: Option<u64>,
    pub threads: Option<usize>,
    pub block_size: Option<usize>,
    pub seed: Option<u64>,
    pub log_level: Option<LogLevel>,
    pub format: Option<OutputFormat>,
}

/// Build settings from the file (if any) and the command line
pub fn build_settings(cli: &CliArgs) -> Result<RunSettings, SettingsError> {
    let mut settings = match &cli.config_file {
        Some(path) => RunSettings::from_file(path)?,
        None => RunSettings::default(),
    };

    settings.merge_with_cli(cli);
    settings.validate()?;

    Ok(settings)
}
