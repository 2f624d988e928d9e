//! Trial capability: the caller-supplied half of a sampling run.
//!
//! The engine knows nothing about what a trial is. It only needs two
//! operations:
//!
//! - [`Trial::generate`] fills one reusable input slot, typically by drawing
//!   randomness from the block's [`SlotContext`].
//! - [`Trial::evaluate`] maps an input to `Some(output)` or `None` when the
//!   trial is rejected. Rejection is ordinary control flow, not an error.
//!
//! Both are called concurrently from every worker thread on independent
//! slots, so implementations must not share mutable state between calls.
//!
//! # Examples
//!
//! ```rust
//! use montec_core::trial::{FnTrial, SlotContext, Trial};
//!
//! // Constant-one trial: every sample is accepted with value 1.0.
//! let ones = FnTrial::new(
//!     |_slot: &mut f64, _ctx: &mut SlotContext<'_>| {},
//!     |_x: &f64| Some(1.0_f64),
//! );
//! assert_eq!(ones.evaluate(&0.0), Some(1.0));
//! ```

use num_traits::Float;

use crate::rng::BlockRng;

/// Generation context handed to [`Trial::generate`] for one slot.
pub struct SlotContext<'a> {
    trial_index: u64,
    rng: &'a mut BlockRng,
}

impl<'a> SlotContext<'a> {
    /// Creates a context for the trial at global index `trial_index`.
    #[inline]
    pub fn new(trial_index: u64, rng: &'a mut BlockRng) -> Self {
        Self { trial_index, rng }
    }

    /// Global trial index (`block_index * block_size + slot`).
    #[inline]
    pub fn trial_index(&self) -> u64 {
        self.trial_index
    }

    /// Index of the block being generated.
    #[inline]
    pub fn block_index(&self) -> u64 {
        self.rng.block_index()
    }

    /// Random stream shared by all slots of the current block.
    #[inline]
    pub fn rng(&mut self) -> &mut BlockRng {
        self.rng
    }
}

/// A pluggable trial domain.
pub trait Trial: Sync {
    /// One trial input; slots are allocated once per worker and overwritten.
    type Input: Default + Send;
    /// Numeric output accumulated by the engine.
    type Output: Float + Send;

    /// Overwrites `slot` with a fresh input.
    fn generate(&self, slot: &mut Self::Input, ctx: &mut SlotContext<'_>);

    /// Evaluates one input; `None` rejects the trial.
    fn evaluate(&self, input: &Self::Input) -> Option<Self::Output>;
}

impl<R: Trial + ?Sized> Trial for &R {
    type Input = R::Input;
    type Output = R::Output;

    #[inline]
    fn generate(&self, slot: &mut Self::Input, ctx: &mut SlotContext<'_>) {
        (**self).generate(slot, ctx)
    }

    #[inline]
    fn evaluate(&self, input: &Self::Input) -> Option<Self::Output> {
        (**self).evaluate(input)
    }
}

/// [`Trial`] assembled from a generator closure and an evaluator closure.
pub struct FnTrial<I, O, G, E> {
    generate: G,
    evaluate: E,
    _marker: std::marker::PhantomData<fn(I) -> O>,
}

impl<I, O, G, E> FnTrial<I, O, G, E>
where
    I: Default + Send,
    O: Float + Send,
    G: Fn(&mut I, &mut SlotContext<'_>) + Sync,
    E: Fn(&I) -> Option<O> + Sync,
{
    /// Wraps the two closures.
    pub fn new(generate: G, evaluate: E) -> Self {
        Self {
            generate,
            evaluate,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<I, O, G, E> Trial for FnTrial<I, O, G, E>
where
    I: Default + Send,
    O: Float + Send,
    G: Fn(&mut I, &mut SlotContext<'_>) + Sync,
    E: Fn(&I) -> Option<O> + Sync,
{
    type Input = I;
    type Output = O;

    #[inline]
    fn generate(&self, slot: &mut I, ctx: &mut SlotContext<'_>) {
        (self.generate)(slot, ctx)
    }

    #[inline]
    fn evaluate(&self, input: &I) -> Option<O> {
        (self.evaluate)(input)
    }
}
