use crate::trial::{SlotContext, Trial};

/// Estimates π from points drawn uniformly in the unit square.
///
/// Points inside the quarter disc are accepted with value 4; the rest are
/// rejected. Under block weighting rejected points count as zero, so the
/// estimate is `4 * inside / total`.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuarterCircle;

impl Trial for QuarterCircle {
    type Input = [f64; 2];
    type Output = f64;

    #[inline]
    fn generate(&self, slot: &mut [f64; 2], ctx: &mut SlotContext<'_>) {
        let rng = ctx.rng();
        *slot = [rng.gen_uniform(), rng.gen_uniform()];
    }

    #[inline]
    fn evaluate(&self, input: &[f64; 2]) -> Option<f64> {
        let [x, y] = *input;
        (x * x + y * y <= 1.0).then_some(4.0)
    }
}
