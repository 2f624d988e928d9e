//! Result of a completed sampling run.

use std::time::Duration;

use super::config::Weighting;

/// Final counters of one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkerSummary {
    /// Worker identifier; 0 is the calling thread.
    pub worker_id: usize,
    /// Blocks this worker claimed and processed.
    pub blocks_claimed: u64,
    /// Trials the evaluator accepted.
    pub valid_trials: u64,
    /// Trials the evaluator rejected.
    pub rejected_trials: u64,
}

/// Normalised estimate plus the bookkeeping that produced it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport<T> {
    /// The normalised estimate.
    pub estimate: T,
    /// Policy used to normalise `estimate`.
    pub weighting: Weighting,
    /// Blocks in the run.
    pub total_blocks: u64,
    /// Trials per block.
    pub block_size: usize,
    /// Threads used, the calling thread included.
    pub threads: usize,
    /// Seed the per-block streams were derived from.
    pub seed: u64,
    /// Per-worker counters, ordered by worker id.
    pub workers: Vec<WorkerSummary>,
    /// Wall-clock time spent in the run.
    pub elapsed: Duration,
}

impl<T> RunReport<T> {
    /// Total trials executed across all workers.
    pub fn trials_executed(&self) -> u64 {
        self.total_blocks * self.block_size as u64
    }

    /// Total accepted trials across all workers.
    pub fn valid_trials(&self) -> u64 {
        self.workers.iter().map(|w| w.valid_trials).sum()
    }

    /// Total blocks processed across all workers.
    pub fn blocks_processed(&self) -> u64 {
        self.workers.iter().map(|w| w.blocks_claimed).sum()
    }

    /// Fraction of executed trials the evaluator accepted.
    pub fn acceptance_rate(&self) -> f64 {
        let executed = self.trials_executed();
        if executed == 0 {
            return 0.0;
        }
        self.valid_trials() as f64 / executed as f64
    }
}
