//! End-to-end properties of the sampling engine.
//!
//! # Test Categories
//!
//! 1. **Dispatch**: every block is processed exactly once, whatever the
//!    thread count
//! 2. **Normalisation**: constant, rejecting and conditional trials
//! 3. **Determinism**: seeded runs agree across thread counts
//! 4. **Convergence**: bundled trials approach their exact values

use std::sync::Mutex;
use std::thread;

use approx::assert_relative_eq;
use montec_core::engine::{Dispatcher, SamplerConfig, SamplerError, Weighting};
use montec_core::trial::{FnTrial, SlotContext, Trial};
use montec_core::trials::{NormalTail, QuarterCircle, UniformIntegral};
use proptest::prelude::*;

fn config(iterations: u64, threads: usize, block_size: usize) -> SamplerConfig {
    SamplerConfig::builder()
        .iterations(iterations)
        .threads(threads)
        .block_size(block_size)
        .seed(20_240_601)
        .build()
        .unwrap()
}

fn constant_one() -> impl Trial<Input = f64, Output = f64> {
    FnTrial::new(|_: &mut f64, _: &mut SlotContext<'_>| {}, |_: &f64| Some(1.0))
}

/// Records the index of every block as its first slot is generated.
struct BlockRecorder {
    block_size: u64,
    seen: Mutex<Vec<u64>>,
}

impl BlockRecorder {
    fn new(block_size: usize) -> Self {
        Self {
            block_size: block_size as u64,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn sorted(&self) -> Vec<u64> {
        let mut seen = self.seen.lock().unwrap().clone();
        seen.sort_unstable();
        seen
    }
}

impl Trial for BlockRecorder {
    type Input = u64;
    type Output = f64;

    fn generate(&self, slot: &mut u64, ctx: &mut SlotContext<'_>) {
        if ctx.trial_index() % self.block_size == 0 {
            self.seen.lock().unwrap().push(ctx.block_index());
        }
        *slot = ctx.block_index();
    }

    fn evaluate(&self, _input: &u64) -> Option<f64> {
        Some(1.0)
    }
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_every_block_processed_exactly_once_under_contention() {
    let block_size = 4;
    let recorder = BlockRecorder::new(block_size);
    let mut dispatcher = Dispatcher::new(&recorder, config(4 * 5000, 32, block_size));

    let report = dispatcher.run().unwrap();

    let expected: Vec<u64> = (0..5000).collect();
    assert_eq!(recorder.sorted(), expected);
    assert_eq!(report.blocks_processed(), 5000);
    assert_eq!(report.workers.len(), 32);
}

#[test]
fn test_work_conservation() {
    let mut dispatcher = Dispatcher::new(constant_one(), config(1_000_003, 6, 1000));
    let report = dispatcher.run().unwrap();

    assert_eq!(report.total_blocks, 1001);
    assert_eq!(report.blocks_processed(), report.total_blocks);
    assert_eq!(report.trials_executed(), 1_001_000);
    assert_eq!(report.valid_trials(), 1_001_000);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_claims_cover_all_blocks(
        iterations in 0u64..4000,
        block_size in 1usize..64,
        threads in 1usize..9,
    ) {
        let recorder = BlockRecorder::new(block_size);
        let cfg = config(iterations, threads, block_size);
        let total_blocks = cfg.total_blocks();
        let mut dispatcher = Dispatcher::new(&recorder, cfg);

        match dispatcher.run() {
            Ok(report) => {
                let expected: Vec<u64> = (0..total_blocks).collect();
                prop_assert_eq!(recorder.sorted(), expected);
                prop_assert_eq!(report.blocks_processed(), total_blocks);
                prop_assert_eq!(report.estimate, 1.0);
            }
            Err(SamplerError::NoSamples) => {
                prop_assert_eq!(total_blocks, 0);
            }
            Err(other) => {
                prop_assert!(false, "unexpected error: {}", other);
            }
        }
    }
}

// ============================================================================
// Normalisation
// ============================================================================

#[test]
fn test_constant_one_single_thread_exact() {
    let block_size = 2048;
    let cfg = config(block_size as u64 * 10, 1, block_size);
    let mut dispatcher = Dispatcher::new(constant_one(), cfg);
    let report = dispatcher.run().unwrap();
    assert_eq!(report.estimate, 1.0);
}

#[test]
fn test_zero_iterations_returns_no_samples() {
    let mut dispatcher = Dispatcher::new(constant_one(), config(0, 4, 1024));
    let result = dispatcher.run();
    assert!(matches!(result, Err(SamplerError::NoSamples)));
}

#[test]
fn test_rejected_blocks_keep_denominator() {
    // Odd blocks are accepted with value 1, even blocks rejected entirely.
    let trial = FnTrial::new(
        |slot: &mut u64, ctx: &mut SlotContext<'_>| *slot = ctx.block_index(),
        |block: &u64| (block % 2 == 1).then_some(1.0_f64),
    );
    let mut dispatcher = Dispatcher::new(trial, config(100 * 64, 4, 64));
    let report = dispatcher.run().unwrap();

    assert_relative_eq!(report.estimate, 0.5, max_relative = 1e-14);
    assert_eq!(report.blocks_processed(), 100);
    assert_eq!(report.valid_trials(), 50 * 64);
    assert_relative_eq!(report.acceptance_rate(), 0.5);
    let rejected: u64 = report.workers.iter().map(|w| w.rejected_trials).sum();
    assert_eq!(rejected, 50 * 64);
}

#[test]
fn test_valid_trial_weighting_is_conditional_mean() {
    let trial = FnTrial::new(
        |slot: &mut u64, ctx: &mut SlotContext<'_>| *slot = ctx.block_index(),
        |block: &u64| (block % 2 == 1).then_some(3.0_f64),
    );
    let cfg = SamplerConfig::builder()
        .iterations(100 * 64)
        .threads(4)
        .block_size(64)
        .weighting(Weighting::ValidTrials)
        .build()
        .unwrap();

    let mut dispatcher = Dispatcher::new(trial, cfg);
    let report = dispatcher.run().unwrap();

    assert_eq!(report.weighting, Weighting::ValidTrials);
    assert_relative_eq!(report.estimate, 3.0, max_relative = 1e-14);
}

#[test]
fn test_f32_output() {
    let trial = FnTrial::new(
        |_: &mut f32, _: &mut SlotContext<'_>| {},
        |_: &f32| Some(0.25_f32),
    );
    let mut dispatcher = Dispatcher::new(trial, config(10_000, 3, 100));
    let report = dispatcher.run().unwrap();
    assert_relative_eq!(report.estimate, 0.25_f32, max_relative = 1e-6);
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_single_and_multi_thread_agree() {
    let iterations = 300_000;
    let single = Dispatcher::new(QuarterCircle, config(iterations, 1, 1024))
        .run()
        .unwrap();
    let multi = Dispatcher::new(QuarterCircle, config(iterations, 8, 1024))
        .run()
        .unwrap();

    assert_relative_eq!(single.estimate, multi.estimate, max_relative = 1e-12);
    assert_eq!(single.valid_trials(), multi.valid_trials());
}

#[test]
fn test_same_seed_same_result() {
    let first = Dispatcher::new(NormalTail::new(0.5), config(50_000, 2, 500))
        .run()
        .unwrap();
    let second = Dispatcher::new(NormalTail::new(0.5), config(50_000, 2, 500))
        .run()
        .unwrap();
    assert_relative_eq!(first.estimate, second.estimate, max_relative = 1e-12);
    assert_eq!(first.seed, second.seed);
}

#[test]
fn test_independent_dispatchers_run_concurrently() {
    let (a, b) = thread::scope(|scope| {
        let a = scope.spawn(|| {
            Dispatcher::new(constant_one(), config(64 * 500, 3, 64))
                .run()
                .unwrap()
        });
        let b = scope.spawn(|| {
            let trial = FnTrial::new(
                |_: &mut f64, _: &mut SlotContext<'_>| {},
                |_: &f64| Some(2.0_f64),
            );
            Dispatcher::new(trial, config(32 * 900, 5, 32)).run().unwrap()
        });
        (a.join().unwrap(), b.join().unwrap())
    });

    assert_eq!(a.estimate, 1.0);
    assert_eq!(a.blocks_processed(), 500);
    assert_eq!(b.estimate, 2.0);
    assert_eq!(b.blocks_processed(), 900);
}

// ============================================================================
// Convergence
// ============================================================================

#[test]
fn test_pi_converges() {
    let report = Dispatcher::new(QuarterCircle, config(2_000_000, 4, 2048))
        .run()
        .unwrap();
    // Standard error is about 0.0012 at two million samples.
    assert!((report.estimate - std::f64::consts::PI).abs() < 0.01);
}

#[test]
fn test_normal_tail_conditional_mean() {
    let cfg = SamplerConfig::builder()
        .iterations(1_000_000)
        .threads(4)
        .seed(11)
        .weighting(Weighting::ValidTrials)
        .build()
        .unwrap();
    let report = Dispatcher::new(NormalTail::new(0.0), cfg).run().unwrap();

    // E[X | X > 0] = sqrt(2 / pi)
    let exact = (2.0 / std::f64::consts::PI).sqrt();
    assert!((report.estimate - exact).abs() < 0.01);
    assert_relative_eq!(report.acceptance_rate(), 0.5, epsilon = 0.01);
}

#[test]
fn test_uniform_integral_of_square() {
    let integral = UniformIntegral::new(0.0, 3.0, |x: f64| x * x).unwrap();
    let report = Dispatcher::new(integral, config(1_000_000, 4, 1024))
        .run()
        .unwrap();
    // ∫_0^3 x² dx = 9
    assert_relative_eq!(report.estimate, 9.0, max_relative = 0.01);
}
