//! Lock-free block dispatch.
//!
//! [`WorkCounter`] is the only state shared between workers during a run.
//! Each call to [`WorkCounter::claim_next_block`] performs a single
//! `fetch_add`, so every caller observes a distinct, strictly increasing
//! index and exactly `total_blocks` calls are granted across all threads.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Shared flag that makes further block claims report exhaustion.
///
/// Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; blocks already claimed still complete.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn clear(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}

/// Atomic block counter in `[0, total_blocks]`.
#[derive(Debug)]
pub struct WorkCounter {
    next: AtomicU64,
    total_blocks: u64,
    cancel: CancelToken,
}

impl WorkCounter {
    /// Creates a counter for `total_blocks` blocks.
    pub fn new(total_blocks: u64) -> Self {
        Self::with_cancel(total_blocks, CancelToken::new())
    }

    /// Creates a counter that stops granting blocks once `cancel` fires.
    pub fn with_cancel(total_blocks: u64, cancel: CancelToken) -> Self {
        Self {
            next: AtomicU64::new(0),
            total_blocks,
            cancel,
        }
    }

    /// Rewinds the counter to zero for `total_blocks` blocks.
    ///
    /// Takes `&mut self`: no worker can be claiming while this runs.
    pub fn reset(&mut self, total_blocks: u64) {
        *self.next.get_mut() = 0;
        self.total_blocks = total_blocks;
    }

    /// Returns the number of blocks in this run.
    #[inline]
    pub fn total_blocks(&self) -> u64 {
        self.total_blocks
    }

    /// Claims the next block, returning its index, or `None` once every
    /// block has been handed out or the run was cancelled.
    #[inline]
    pub fn claim_next_block(&self) -> Option<u64> {
        if self.cancel.is_cancelled() {
            return None;
        }
        // Relaxed suffices: uniqueness comes from the RMW itself, and block
        // contents are published to the aggregator by thread join.
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        (index < self.total_blocks).then_some(index)
    }

    /// Makes every subsequent claim fail without rewinding the counter.
    #[inline]
    pub fn exhaust(&self) {
        self.next.fetch_max(self.total_blocks, Ordering::Relaxed);
    }

    /// Counter position capped at `total_blocks`.
    ///
    /// Equals the number of blocks handed out unless [`exhaust`](Self::exhaust)
    /// was called.
    #[inline]
    pub fn claimed(&self) -> u64 {
        self.next.load(Ordering::Relaxed).min(self.total_blocks)
    }

    /// Returns whether the counter's cancel token has fired.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_sequential_claims() {
        let counter = WorkCounter::new(3);
        assert_eq!(counter.claim_next_block(), Some(0));
        assert_eq!(counter.claim_next_block(), Some(1));
        assert_eq!(counter.claim_next_block(), Some(2));
        assert_eq!(counter.claim_next_block(), None);
        assert_eq!(counter.claim_next_block(), None);
        assert_eq!(counter.claimed(), 3);
    }

    #[test]
    fn test_zero_blocks_never_granted() {
        let counter = WorkCounter::new(0);
        assert_eq!(counter.claim_next_block(), None);
        assert_eq!(counter.claimed(), 0);
    }

    #[test]
    fn test_reset_rewinds() {
        let mut counter = WorkCounter::new(1);
        assert_eq!(counter.claim_next_block(), Some(0));
        assert_eq!(counter.claim_next_block(), None);

        counter.reset(2);
        assert_eq!(counter.total_blocks(), 2);
        assert_eq!(counter.claim_next_block(), Some(0));
        assert_eq!(counter.claim_next_block(), Some(1));
        assert_eq!(counter.claim_next_block(), None);
    }

    #[test]
    fn test_cancel_stops_claims() {
        let token = CancelToken::new();
        let counter = WorkCounter::with_cancel(100, token.clone());
        assert_eq!(counter.claim_next_block(), Some(0));

        token.cancel();
        assert!(counter.is_cancelled());
        assert_eq!(counter.claim_next_block(), None);
        assert_eq!(counter.claimed(), 1);

        token.clear();
        assert_eq!(counter.claim_next_block(), Some(1));
    }

    #[test]
    fn test_exhaust() {
        let counter = WorkCounter::new(10);
        assert_eq!(counter.claim_next_block(), Some(0));
        counter.exhaust();
        assert_eq!(counter.claim_next_block(), None);
        assert_eq!(counter.claimed(), 10);
    }

    #[test]
    fn test_concurrent_claims_are_unique() {
        let total = 10_000;
        let counter = WorkCounter::new(total);

        let per_thread: Vec<Vec<u64>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    scope.spawn(|| {
                        let mut claimed = Vec::new();
                        while let Some(index) = counter.claim_next_block() {
                            claimed.push(index);
                        }
                        claimed
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mut seen = HashSet::new();
        for index in per_thread.iter().flatten() {
            assert!(*index < total);
            assert!(seen.insert(*index), "block {} claimed twice", index);
        }
        assert_eq!(seen.len() as u64, total);
        assert_eq!(counter.claim_next_block(), None);
    }
}
