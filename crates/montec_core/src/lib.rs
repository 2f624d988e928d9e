//! # montec_core
//!
//! Parallel statistical-sampling engine.
//!
//! A run splits a requested number of independent trials into fixed-size
//! blocks. A fixed pool of worker threads (the caller's thread among them)
//! claims blocks from a lock-free counter, generates and evaluates each
//! block's trials, and accumulates accepted outputs with compensated
//! summation. The partial results are then combined into one normalised
//! estimate.
//!
//! ## Modules
//!
//! - [`accumulator`]: Kahan summation
//! - [`trial`]: the caller-supplied generate/evaluate capability
//! - [`engine`]: dispatcher, workers, configuration, errors
//! - [`rng`]: per-block random streams
//! - [`trials`]: ready-made trial domains
//!
//! ## Usage Example
//!
//! ```rust
//! use montec_core::engine::{Dispatcher, SamplerConfig, SamplerError};
//! use montec_core::trials::QuarterCircle;
//!
//! let config = SamplerConfig::builder()
//!     .iterations(0)
//!     .threads(4)
//!     .build()
//!     .unwrap();
//!
//! // Zero trials is reported, never divided by.
//! let mut dispatcher = Dispatcher::new(QuarterCircle, config);
//! assert!(matches!(dispatcher.run(), Err(SamplerError::NoSamples)));
//! ```

pub mod accumulator;
pub mod engine;
pub mod rng;
pub mod trial;
pub mod trials;

pub use accumulator::KahanSum;
pub use engine::{Dispatcher, RunReport, SamplerConfig, SamplerError, Weighting};
pub use trial::{FnTrial, SlotContext, Trial};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
