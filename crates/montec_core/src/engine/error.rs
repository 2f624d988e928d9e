//! Error types for the sampling engine.
//!
//! Configuration problems surface synchronously from the builder or from
//! [`Dispatcher::configure`](super::Dispatcher::configure). Run-time failures
//! come back from [`Dispatcher::run`](super::Dispatcher::run). Trial
//! rejection is not an error and never appears here.

use thiserror::Error;

/// Invalid engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Requested trial count above the supported maximum.
    #[error("Invalid iteration count {0}: must not exceed 2^53")]
    InvalidIterations(u64),

    /// Thread count of zero or above the supported maximum.
    #[error("Invalid thread count {0}: must be in range [1, 1024]")]
    InvalidThreadCount(usize),

    /// Block size of zero or above the supported maximum.
    #[error("Invalid block size {0}: must be in range [1, 1_048_576]")]
    InvalidBlockSize(usize),

    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
}

/// Failure of a sampling run.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// The engine was misconfigured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Nothing to average: zero blocks, or zero accepted trials under
    /// valid-trial weighting.
    #[error("No samples: the run produced nothing to normalise by")]
    NoSamples,

    /// The run was cancelled before every block was claimed.
    #[error("Run cancelled after {blocks_completed} of {total_blocks} blocks")]
    Cancelled {
        /// Blocks fully processed before cancellation took effect.
        blocks_completed: u64,
        /// Blocks the run was configured for.
        total_blocks: u64,
    },

    /// A worker thread panicked; the whole run is discarded.
    #[error("Worker {worker_id} panicked")]
    WorkerPanicked {
        /// Identifier of the failed worker.
        worker_id: usize,
    },

    /// The operating system refused to start a worker thread.
    #[error("Failed to spawn worker {worker_id}: {source}")]
    Spawn {
        /// Identifier of the worker that could not start.
        worker_id: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A count could not be represented in the output type.
    #[error("Count {0} is not representable in the output type")]
    NumericConversion(u64),
}
