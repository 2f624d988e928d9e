//! CLI error types

use montec_core::engine::{ConfigError, SamplerError};
use thiserror::Error;

use crate::config::SettingsError;

/// Errors surfaced by `montec` commands
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid trial parameters: {0}")]
    Trial(#[from] ConfigError),

    #[error("Sampling failed: {0}")]
    Sampler(#[from] SamplerError),

    #[error("Failed to serialise report: {0}")]
    Serialisation(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
