//! Block-dispatched parallel sampling engine.
//!
//! # Architecture
//!
//! ```text
//! Dispatcher
//! ├── SamplerConfig   (trial count, threads, block size, weighting)
//! ├── WorkCounter     (shared atomic block index, cancel token)
//! └── Worker × threads
//!     ├── input buffer (block_size slots, reused)
//!     ├── KahanSum     (accepted outputs)
//!     └── counters     (blocks claimed, valid trials)
//! ```
//!
//! The calling thread is worker 0. The remaining `threads - 1` workers run
//! on scoped threads and are joined before any partial result is read, so
//! aggregation never races with accumulation.
//!
//! # Normalisation
//!
//! Under [`Weighting::BlocksClaimed`] every worker contributes
//! `mean * blocks_claimed`; the estimate is the sum of contributions divided
//! by the run's total block count. This is the mean over every executed
//! trial, with rejected trials counting as zero.
//!
//! Under [`Weighting::ValidTrials`] the estimate is the mean over accepted
//! trials only.
//!
//! # Examples
//!
//! ```rust
//! use montec_core::engine::{Dispatcher, SamplerConfig};
//! use montec_core::trials::QuarterCircle;
//!
//! let config = SamplerConfig::builder()
//!     .iterations(200_000)
//!     .threads(4)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let mut dispatcher = Dispatcher::new(QuarterCircle, config);
//! let report = dispatcher.run().unwrap();
//! assert!((report.estimate - std::f64::consts::PI).abs() < 0.05);
//! ```

pub mod config;
pub mod counter;
pub mod dispatcher;
pub mod error;
pub mod report;
pub mod worker;

// Re-exports for convenient access
pub use config::{
    SamplerConfig, SamplerConfigBuilder, Weighting, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE,
    MAX_ITERATIONS, MAX_THREADS,
};
pub use counter::{CancelToken, WorkCounter};
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, SamplerError};
pub use report::{RunReport, WorkerSummary};
pub use worker::Worker;
