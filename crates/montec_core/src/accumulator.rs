//! Compensated (Kahan) summation.
//!
//! Each worker owns one [`KahanSum`] and feeds every accepted trial output
//! into it. The compensation term recovers the low-order bits lost by each
//! addition, so the absolute error of [`KahanSum::val`] stays bounded by a
//! small multiple of machine epsilon regardless of how many values were added.
//!
//! # Examples
//!
//! ```rust
//! use montec_core::accumulator::KahanSum;
//!
//! let mut sum = KahanSum::<f64>::new();
//! for _ in 0..10 {
//!     sum.add(0.1);
//! }
//! assert!((sum.val() - 1.0).abs() < 1e-15);
//! ```

use num_traits::Float;

/// Running sum with a Kahan compensation term.
///
/// # Type Parameters
///
/// * `T` - Floating-point type (e.g., `f64`, `f32`)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KahanSum<T: Float> {
    /// Best estimate of the sum so far.
    sum: T,
    /// Negated low-order bits lost by the last addition.
    compensation: T,
}

impl<T: Float> KahanSum<T> {
    /// Creates an empty accumulator.
    #[inline]
    pub fn new() -> Self {
        Self::with_initial(T::zero())
    }

    /// Creates an accumulator that starts from `initial`.
    #[inline]
    pub fn with_initial(initial: T) -> Self {
        Self {
            sum: initial,
            compensation: T::zero(),
        }
    }

    /// Adds `value` to the running sum.
    ///
    /// The update order is significant: reassociating the four steps
    /// cancels the compensation term algebraically.
    #[inline]
    pub fn add(&mut self, value: T) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// Returns the compensated sum.
    #[inline]
    pub fn val(&self) -> T {
        self.sum
    }

    /// Returns the current compensation term.
    #[inline]
    pub fn compensation(&self) -> T {
        self.compensation
    }

    /// Resets the accumulator to zero.
    #[inline]
    pub fn reset(&mut self) {
        self.sum = T::zero();
        self.compensation = T::zero();
    }
}

impl<T: Float> Default for KahanSum<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> Extend<T> for KahanSum<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: Float> FromIterator<T> for KahanSum<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut sum = Self::new();
        sum.extend(iter);
        sum
    }
}

/// Sums a slice with compensated summation.
///
/// # Examples
///
/// ```rust
/// use montec_core::accumulator::kahan_sum;
///
/// let values = [1.0e16_f64, 1.0, 1.0, -1.0e16];
/// assert_eq!(kahan_sum(&values), 2.0);
/// ```
pub fn kahan_sum<T: Float>(values: &[T]) -> T {
    values.iter().copied().collect::<KahanSum<T>>().val()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero() {
        let sum = KahanSum::<f64>::new();
        assert_eq!(sum.val(), 0.0);
        assert_eq!(sum.compensation(), 0.0);
    }

    #[test]
    fn test_with_initial() {
        let mut sum = KahanSum::with_initial(2.5_f64);
        sum.add(1.5);
        assert_eq!(sum.val(), 4.0);
    }

    #[test]
    fn test_reset_clears_compensation() {
        let mut sum = KahanSum::<f64>::new();
        for _ in 0..1000 {
            sum.add(0.1);
        }
        sum.reset();
        assert_eq!(sum.val(), 0.0);
        assert_eq!(sum.compensation(), 0.0);
        sum.add(3.0);
        assert_eq!(sum.val(), 3.0);
    }

    #[test]
    fn test_beats_naive_summation_f64() {
        let n = 1_000_000;
        let exact = 100_000.0_f64;

        let mut naive = 0.0_f64;
        let mut compensated = KahanSum::<f64>::new();
        for _ in 0..n {
            naive += 0.1;
            compensated.add(0.1);
        }

        let naive_err = (naive - exact).abs();
        let kahan_err = (compensated.val() - exact).abs();
        assert!(
            kahan_err < naive_err,
            "kahan error {} not below naive error {}",
            kahan_err,
            naive_err
        );
        assert!(kahan_err < 1e-9);
    }

    #[test]
    fn test_beats_naive_summation_f32() {
        let n = 1_000_000;
        let exact = 100_000.0_f64;

        let mut naive = 0.0_f32;
        let mut compensated = KahanSum::<f32>::new();
        for _ in 0..n {
            naive += 0.1;
            compensated.add(0.1);
        }

        let naive_err = (naive as f64 - exact).abs();
        let kahan_err = (compensated.val() as f64 - exact).abs();
        assert!(kahan_err < naive_err);
        assert!(kahan_err < 1.0);
    }

    #[test]
    fn test_mixed_magnitudes() {
        let values = [1.0e16_f64, 1.0, 1.0, -1.0e16];
        assert_eq!(kahan_sum(&values), 2.0);
    }

    #[test]
    fn test_from_iterator_and_extend() {
        let mut sum: KahanSum<f64> = (1..=4).map(|i| i as f64).collect();
        assert_eq!(sum.val(), 10.0);
        sum.extend([5.0, 6.0]);
        assert_eq!(sum.val(), 21.0);
    }

    #[test]
    fn test_empty_slice() {
        let values: [f64; 0] = [];
        assert_eq!(kahan_sum(&values), 0.0);
    }
}
