//! Per-thread sampling worker.
//!
//! A [`Worker`] owns a reusable buffer of `block_size` trial inputs and a
//! [`KahanSum`] of accepted outputs. Its loop claims blocks from the shared
//! [`WorkCounter`] until none remain; for each block it regenerates every
//! input slot and then evaluates them. Generation and evaluation of one
//! block complete before the next claim, so the buffer is never aliased.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, Scope, ScopedJoinHandle};

use num_traits::{Float, Zero};
use tracing::debug;

use super::counter::WorkCounter;
use super::error::SamplerError;
use super::report::WorkerSummary;
use crate::accumulator::KahanSum;
use crate::rng::BlockRng;
use crate::trial::{SlotContext, Trial};

/// Converts a count into the output type.
#[inline]
pub(crate) fn count_to_float<T: Float>(count: u64) -> Result<T, SamplerError> {
    T::from(count).ok_or(SamplerError::NumericConversion(count))
}

/// Clears the liveness flag when the worker loop returns or unwinds.
struct ActiveGuard(Arc<AtomicBool>);

impl ActiveGuard {
    fn engage(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One sampling thread's private state.
pub struct Worker<'a, R: Trial> {
    id: usize,
    trial: &'a R,
    counter: &'a WorkCounter,
    seed: u64,
    inputs: Vec<R::Input>,
    sum: KahanSum<R::Output>,
    blocks_claimed: u64,
    valid_trials: u64,
    active: Arc<AtomicBool>,
}

impl<'a, R: Trial> Worker<'a, R> {
    /// Creates an idle worker with a buffer of `block_size` default inputs.
    pub fn new(
        id: usize,
        trial: &'a R,
        counter: &'a WorkCounter,
        seed: u64,
        block_size: usize,
    ) -> Self {
        let mut inputs = Vec::with_capacity(block_size);
        inputs.resize_with(block_size, R::Input::default);

        Self {
            id,
            trial,
            counter,
            seed,
            inputs,
            sum: KahanSum::new(),
            blocks_claimed: 0,
            valid_trials: 0,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Worker identifier; 0 is the calling thread.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns whether the worker loop is currently running.
    #[inline]
    pub fn active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Handle on the liveness flag that stays valid after the worker moves
    /// into its thread.
    #[inline]
    pub fn status(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active)
    }

    /// Blocks claimed so far.
    #[inline]
    pub fn blocks_claimed(&self) -> u64 {
        self.blocks_claimed
    }

    /// Accepted trials so far.
    #[inline]
    pub fn valid_trials(&self) -> u64 {
        self.valid_trials
    }

    /// Compensated sum of accepted outputs.
    #[inline]
    pub fn sum(&self) -> R::Output {
        self.sum.val()
    }

    /// Overwrites every buffer slot with a fresh input for `block_index`.
    pub fn gen_input_block(&mut self, block_index: u64) {
        let mut rng = BlockRng::for_block(self.seed, block_index);
        let base = block_index * self.inputs.len() as u64;
        for (slot_index, slot) in self.inputs.iter_mut().enumerate() {
            let mut ctx = SlotContext::new(base + slot_index as u64, &mut rng);
            self.trial.generate(slot, &mut ctx);
        }
    }

    /// Evaluates the buffer, accumulating accepted outputs.
    pub fn process_block(&mut self) {
        for input in &self.inputs {
            if let Some(value) = self.trial.evaluate(input) {
                self.sum.add(value);
                self.valid_trials += 1;
            }
        }
    }

    /// Claims and processes blocks until the counter is exhausted.
    pub fn main_loop(&mut self) {
        let _active = ActiveGuard::engage(Arc::clone(&self.active));

        while let Some(block_index) = self.counter.claim_next_block() {
            self.blocks_claimed += 1;
            self.gen_input_block(block_index);
            self.process_block();
        }

        debug!(
            worker = self.id,
            blocks = self.blocks_claimed,
            valid_trials = self.valid_trials,
            "worker drained"
        );
    }

    /// Runs [`main_loop`](Self::main_loop) on a new scoped thread.
    ///
    /// The liveness flag is raised before the spawn and cleared only when
    /// the loop itself returns. Joining the handle gives the worker back.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::Spawn`] if the thread could not be created.
    pub fn start<'scope, 'env>(
        mut self,
        scope: &'scope Scope<'scope, 'env>,
    ) -> Result<ScopedJoinHandle<'scope, Self>, SamplerError>
    where
        'a: 'scope,
        R::Input: 'scope,
        R::Output: 'scope,
    {
        let id = self.id;
        let active = self.status();
        active.store(true, Ordering::Release);

        thread::Builder::new()
            .name(format!("montec-worker-{id}"))
            .spawn_scoped(scope, move || {
                self.main_loop();
                self
            })
            .map_err(|source| {
                active.store(false, Ordering::Release);
                SamplerError::Spawn {
                    worker_id: id,
                    source,
                }
            })
    }

    /// Per-trial mean over every trial this worker was granted.
    ///
    /// Rejected trials count in the denominator. Zero for an idle worker.
    pub fn mean(&self) -> Result<R::Output, SamplerError> {
        if self.blocks_claimed == 0 {
            return Ok(R::Output::zero());
        }
        let granted = self.blocks_claimed * self.inputs.len() as u64;
        Ok(self.sum.val() / count_to_float::<R::Output>(granted)?)
    }

    /// [`mean`](Self::mean) scaled by the number of blocks claimed.
    ///
    /// Summing this over all workers and dividing by the total block count
    /// gives the block-weighted mean of the whole run.
    pub fn weighted_sum(&self) -> Result<R::Output, SamplerError> {
        Ok(self.mean()? * count_to_float::<R::Output>(self.blocks_claimed)?)
    }

    /// Snapshot of this worker's counters.
    pub fn summary(&self) -> WorkerSummary {
        let granted = self.blocks_claimed * self.inputs.len() as u64;
        WorkerSummary {
            worker_id: self.id,
            blocks_claimed: self.blocks_claimed,
            valid_trials: self.valid_trials,
            rejected_trials: granted - self.valid_trials,
        }
    }
}
