use crate::trial::{SlotContext, Trial};

/// Conditional mean `E[X | X > threshold]` of a standard normal.
///
/// Draws below the threshold are rejected, so this domain is meant to run
/// under [`Weighting::ValidTrials`](crate::engine::Weighting::ValidTrials).
/// The exact value is `φ(k) / (1 - Φ(k))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalTail {
    /// Rejection threshold `k`.
    pub threshold: f64,
}

impl NormalTail {
    /// Creates the domain for threshold `k`.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Trial for NormalTail {
    type Input = f64;
    type Output = f64;

    #[inline]
    fn generate(&self, slot: &mut f64, ctx: &mut SlotContext<'_>) {
        *slot = ctx.rng().gen_normal();
    }

    #[inline]
    fn evaluate(&self, input: &f64) -> Option<f64> {
        (*input > self.threshold).then_some(*input)
    }
}
