//! Run orchestration: thread pool, completion, and normalisation.
//!
//! A [`Dispatcher`] bundles everything a run shares (the trial, the
//! configuration and the [`WorkCounter`]) in one instance, so independent
//! dispatchers can run concurrently without interfering.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, ScopedJoinHandle};
use std::time::Instant;

use num_traits::ToPrimitive;
use tracing::{debug, info, warn};

use super::config::{SamplerConfig, Weighting};
use super::counter::{CancelToken, WorkCounter};
use super::error::{ConfigError, SamplerError};
use super::report::RunReport;
use super::worker::{count_to_float, Worker};
use crate::accumulator::kahan_sum;
use crate::trial::Trial;

/// Parallel sampling engine for one trial domain.
///
/// # Examples
///
/// ```rust
/// use montec_core::engine::{Dispatcher, SamplerConfig};
/// use montec_core::trial::{FnTrial, SlotContext};
///
/// let config = SamplerConfig::builder()
///     .iterations(10 * 256)
///     .block_size(256)
///     .threads(2)
///     .build()
///     .unwrap();
///
/// let ones = FnTrial::new(|_: &mut f64, _: &mut SlotContext<'_>| {}, |_: &f64| Some(1.0_f64));
/// let mut dispatcher = Dispatcher::new(ones, config);
///
/// let report = dispatcher.run().unwrap();
/// assert_eq!(report.estimate, 1.0);
/// assert_eq!(report.blocks_processed(), 10);
/// ```
pub struct Dispatcher<R: Trial> {
    trial: R,
    config: SamplerConfig,
    counter: WorkCounter,
    cancel: CancelToken,
}

impl<R: Trial> Dispatcher<R> {
    /// Creates a dispatcher for `trial` under `config`.
    pub fn new(trial: R, config: SamplerConfig) -> Self {
        let cancel = CancelToken::new();
        let counter = WorkCounter::with_cancel(config.total_blocks(), cancel.clone());
        Self {
            trial,
            config,
            counter,
            cancel,
        }
    }

    /// Sets the requested trial count and thread count.
    ///
    /// Recomputes the block total, rewinds the work counter and clears any
    /// previous cancellation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `threads` is 0 or either count is out of
    /// range; the previous configuration is kept.
    pub fn configure(&mut self, iterations: u64, threads: usize) -> Result<(), ConfigError> {
        self.config.reconfigure(iterations, threads)?;
        self.counter.reset(self.config.total_blocks());
        self.cancel.clear();
        Ok(())
    }

    /// Returns the current configuration.
    #[inline]
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Returns the trial domain.
    #[inline]
    pub fn trial(&self) -> &R {
        &self.trial
    }

    /// Returns a token that stops the run at the next block claim.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Claims the next block from this dispatcher's counter.
    #[inline]
    pub fn claim_next_block(&self) -> Option<u64> {
        self.counter.claim_next_block()
    }

    /// Runs every block to completion and returns the normalised estimate.
    ///
    /// The calling thread is worker 0; `threads - 1` scoped threads are
    /// spawned alongside it and joined before any partial result is read.
    ///
    /// # Errors
    ///
    /// - [`SamplerError::NoSamples`] if the run has zero blocks, or zero
    ///   accepted trials under [`Weighting::ValidTrials`]
    /// - [`SamplerError::Cancelled`] if the cancel token fired before every
    ///   block was claimed
    /// - [`SamplerError::WorkerPanicked`] / [`SamplerError::Spawn`] if a
    ///   worker thread failed
    pub fn run(&mut self) -> Result<RunReport<R::Output>, SamplerError> {
        let total_blocks = self.config.total_blocks();
        if total_blocks == 0 {
            warn!(iterations = self.config.iterations(), "run has no blocks");
            return Err(SamplerError::NoSamples);
        }
        self.counter.reset(total_blocks);

        let threads = self.config.threads();
        let block_size = self.config.block_size();
        let seed = self.config.seed().unwrap_or_else(rand::random);
        info!(total_blocks, block_size, threads, seed, "starting sampling run");

        let started = Instant::now();
        let workers = drain(&self.trial, &self.counter, threads, block_size, seed)?;
        let elapsed = started.elapsed();

        let blocks_completed: u64 = workers.iter().map(Worker::blocks_claimed).sum();
        if blocks_completed < total_blocks {
            warn!(blocks_completed, total_blocks, "sampling run cancelled");
            return Err(SamplerError::Cancelled {
                blocks_completed,
                total_blocks,
            });
        }

        let weighting = self.config.weighting();
        let estimate = match weighting {
            Weighting::BlocksClaimed => {
                let weighted = workers
                    .iter()
                    .map(Worker::weighted_sum)
                    .collect::<Result<Vec<_>, _>>()?;
                kahan_sum(&weighted) / count_to_float::<R::Output>(total_blocks)?
            }
            Weighting::ValidTrials => {
                let valid: u64 = workers.iter().map(Worker::valid_trials).sum();
                if valid == 0 {
                    warn!(total_blocks, "every trial was rejected");
                    return Err(SamplerError::NoSamples);
                }
                let sums: Vec<R::Output> = workers.iter().map(Worker::sum).collect();
                kahan_sum(&sums) / count_to_float::<R::Output>(valid)?
            }
        };

        info!(
            estimate = estimate.to_f64().unwrap_or(f64::NAN),
            elapsed_ms = elapsed.as_millis() as u64,
            "sampling run complete"
        );

        Ok(RunReport {
            estimate,
            weighting,
            total_blocks,
            block_size,
            threads,
            seed,
            workers: workers.iter().map(Worker::summary).collect(),
            elapsed,
        })
    }
}

type Secondary<'scope, 'a, R> = (usize, Arc<AtomicBool>, ScopedJoinHandle<'scope, Worker<'a, R>>);

/// Starts the secondary workers, drains on the calling thread, then joins.
///
/// Workers are returned in id order, the calling thread's first.
fn drain<'a, R: Trial>(
    trial: &'a R,
    counter: &'a WorkCounter,
    threads: usize,
    block_size: usize,
    seed: u64,
) -> Result<Vec<Worker<'a, R>>, SamplerError> {
    thread::scope(|scope| {
        let mut secondary: Vec<Secondary<'_, 'a, R>> = Vec::with_capacity(threads - 1);
        let mut spawn_error = None;

        for id in 1..threads {
            let worker = Worker::new(id, trial, counter, seed, block_size);
            let status = worker.status();
            match worker.start(scope) {
                Ok(handle) => secondary.push((id, status, handle)),
                Err(err) => {
                    // Let the workers already running stop at their next claim.
                    counter.exhaust();
                    spawn_error = Some(err);
                    break;
                }
            }
        }

        let mut primary = Worker::new(0, trial, counter, seed, block_size);
        let primary_panicked =
            panic::catch_unwind(AssertUnwindSafe(|| primary.main_loop())).is_err();
        if primary_panicked {
            counter.exhaust();
        }

        let still_running = secondary
            .iter()
            .filter(|(_, status, _)| status.load(Ordering::Acquire))
            .count();
        debug!(still_running, "calling thread drained; joining workers");

        let mut workers = Vec::with_capacity(threads);
        workers.push(primary);
        let mut panicked = primary_panicked.then_some(0);
        for (id, _, handle) in secondary {
            match handle.join() {
                Ok(worker) => workers.push(worker),
                Err(_) => {
                    panicked.get_or_insert(id);
                }
            }
        }

        if let Some(err) = spawn_error {
            return Err(err);
        }
        if let Some(worker_id) = panicked {
            return Err(SamplerError::WorkerPanicked { worker_id });
        }
        Ok(workers)
    })
}
