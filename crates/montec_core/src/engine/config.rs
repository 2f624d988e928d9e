//! Sampling run configuration.
//!
//! This module provides [`SamplerConfig`] and its builder. A configuration
//! fixes the requested trial count, the worker thread count, the block size
//! and the normalisation policy for one engine instance.

use super::error::ConfigError;

/// Default number of trials per block.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Maximum number of trials per block.
pub const MAX_BLOCK_SIZE: usize = 1 << 20;

/// Maximum number of worker threads, the calling thread included.
pub const MAX_THREADS: usize = 1024;

/// Maximum requested trial count. Counts up to 2^53 convert to `f64` exactly.
pub const MAX_ITERATIONS: u64 = 1 << 53;

/// How worker partial results are normalised into one estimate.
///
/// - `BlocksClaimed`: mean over every executed trial; rejected trials add
///   zero to the numerator but still count in the denominator.
/// - `ValidTrials`: mean over accepted trials only (a conditional mean).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Weighting {
    /// Weight each worker by the blocks it claimed.
    #[default]
    BlocksClaimed,

    /// Weight each worker by the trials it accepted.
    ValidTrials,
}

/// Engine configuration.
///
/// Use [`SamplerConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use montec_core::engine::SamplerConfig;
///
/// let config = SamplerConfig::builder()
///     .iterations(10_000)
///     .threads(4)
///     .block_size(1000)
///     .seed(42)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.total_blocks(), 10);
/// assert_eq!(config.threads(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Requested number of trials.
    iterations: u64,
    /// Worker threads, the calling thread included.
    threads: usize,
    /// Trials per block.
    block_size: usize,
    /// Optional seed for reproducibility.
    seed: Option<u64>,
    /// Normalisation policy.
    weighting: Weighting,
}

impl SamplerConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SamplerConfigBuilder {
        SamplerConfigBuilder::default()
    }

    /// Returns the requested number of trials.
    #[inline]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Returns the worker thread count.
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Returns the block size.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the optional seed.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the normalisation policy.
    #[inline]
    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Number of blocks needed to cover the requested trials (rounded up).
    #[inline]
    pub fn total_blocks(&self) -> u64 {
        self.iterations.div_ceil(self.block_size as u64)
    }

    /// Number of trials actually executed: `total_blocks * block_size`.
    #[inline]
    pub fn trials_scheduled(&self) -> u64 {
        self.total_blocks() * self.block_size as u64
    }

    /// Replaces the trial and thread counts, re-validating the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the new counts are out of range. On error
    /// `self` is left untouched.
    pub fn reconfigure(&mut self, iterations: u64, threads: usize) -> Result<(), ConfigError> {
        let candidate = Self {
            iterations,
            threads,
            ..self.clone()
        };
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `iterations` is greater than 2^53
    /// - `threads` is 0 or greater than 1024
    /// - `block_size` is 0 or greater than 2^20
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations > MAX_ITERATIONS {
            return Err(ConfigError::InvalidIterations(self.iterations));
        }
        if self.threads == 0 || self.threads > MAX_THREADS {
            return Err(ConfigError::InvalidThreadCount(self.threads));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize(self.block_size));
        }
        Ok(())
    }
}

/// Builder for [`SamplerConfig`].
///
/// `iterations` is required. `threads` defaults to the number of logical
/// CPUs, `block_size` to [`DEFAULT_BLOCK_SIZE`].
#[derive(Clone, Debug, Default)]
pub struct SamplerConfigBuilder {
    iterations: Option<u64>,
    threads: Option<usize>,
    block_size: Option<usize>,
    seed: Option<u64>,
    weighting: Weighting,
}

impl SamplerConfigBuilder {
    /// Sets the requested number of trials.
    #[inline]
    pub fn iterations(mut self, iterations: u64) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Sets the worker thread count (calling thread included).
    #[inline]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Sets the number of trials per block.
    #[inline]
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = Some(block_size);
        self
    }

    /// Sets the seed for reproducibility.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the normalisation policy.
    #[inline]
    pub fn weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `iterations` is missing or any value is out
    /// of range.
    pub fn build(self) -> Result<SamplerConfig, ConfigError> {
        let iterations = self.iterations.ok_or(ConfigError::InvalidParameter {
            name: "iterations",
            value: "must be specified".to_string(),
        })?;

        let config = SamplerConfig {
            iterations,
            threads: self.threads.unwrap_or_else(num_cpus::get),
            block_size: self.block_size.unwrap_or(DEFAULT_BLOCK_SIZE),
            seed: self.seed,
            weighting: self.weighting,
        };

        config.validate()?;
        Ok(config)
    }
}
