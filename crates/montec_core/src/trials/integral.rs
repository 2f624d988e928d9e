use crate::engine::ConfigError;
use crate::trial::{SlotContext, Trial};

/// Definite integral `∫_a^b f(x) dx` by uniform sampling on `[a, b)`.
///
/// Every trial is accepted with value `(b - a) * f(x)`.
///
/// # Examples
///
/// ```rust
/// use montec_core::trials::UniformIntegral;
///
/// let square = UniformIntegral::new(0.0, 1.0, |x: f64| x * x).unwrap();
/// assert_eq!(square.width(), 1.0);
/// assert!(UniformIntegral::new(1.0, 1.0, |x: f64| x).is_err());
/// ```
pub struct UniformIntegral<F> {
    lower: f64,
    upper: f64,
    integrand: F,
}

impl<F> UniformIntegral<F>
where
    F: Fn(f64) -> f64 + Sync,
{
    /// Creates the domain for `integrand` over `[lower, upper)`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidParameter` unless both bounds are finite
    /// and `lower < upper`.
    pub fn new(lower: f64, upper: f64, integrand: F) -> Result<Self, ConfigError> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(ConfigError::InvalidParameter {
                name: "bounds",
                value: format!("need finite lower < upper, got [{}, {})", lower, upper),
            });
        }
        Ok(Self {
            lower,
            upper,
            integrand,
        })
    }

    /// Interval width `b - a`.
    #[inline]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl<F> Trial for UniformIntegral<F>
where
    F: Fn(f64) -> f64 + Sync,
{
    type Input = f64;
    type Output = f64;

    #[inline]
    fn generate(&self, slot: &mut f64, ctx: &mut SlotContext<'_>) {
        *slot = self.lower + self.width() * ctx.rng().gen_uniform();
    }

    #[inline]
    fn evaluate(&self, input: &f64) -> Option<f64> {
        Some(self.width() * (self.integrand)(*input))
    }
}
