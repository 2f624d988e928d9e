//! Integrate command implementation
//!
//! Estimates a definite integral of a built-in function by uniform sampling.

use clap::ValueEnum;
use montec_core::engine::Weighting;
use montec_core::trials::UniformIntegral;
use tracing::info;

use crate::config::RunSettings;
use crate::Result;

/// Built-in integrands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Integrand {
    Sin,
    Square,
    Exp,
}

impl Integrand {
    /// Evaluates the function at `x`.
    pub fn eval(self, x: f64) -> f64 {
        match self {
            Integrand::Sin => x.sin(),
            Integrand::Square => x * x,
            Integrand::Exp => x.exp(),
        }
    }

    /// Closed-form integral over `[lower, upper]`.
    pub fn exact(self, lower: f64, upper: f64) -> f64 {
        match self {
            Integrand::Sin => lower.cos() - upper.cos(),
            Integrand::Square => (upper.powi(3) - lower.powi(3)) / 3.0,
            Integrand::Exp => upper.exp() - lower.exp(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Integrand::Sin => "sin(x)",
            Integrand::Square => "x^2",
            Integrand::Exp => "exp(x)",
        }
    }
}

/// Run the integrate command
pub fn run(settings: &RunSettings, function: Integrand, lower: f64, upper: f64) -> Result<()> {
    let integral = UniformIntegral::new(lower, upper, move |x: f64| function.eval(x))?;

    info!("Integrating {} over [{}, {}]...", function.label(), lower, upper);
    let report = super::execute(integral, settings, Weighting::BlocksClaimed)?;
    super::print_report(
        &format!("Integral of {} over [{}, {}]", function.label(), lower, upper),
        &report,
        Some(function.exact(lower, upper)),
        settings.format,
    )?;
    info!("Integration complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_values() {
        assert_relative_eq!(
            Integrand::Sin.exact(0.0, std::f64::consts::PI),
            2.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(Integrand::Square.exact(0.0, 3.0), 9.0, epsilon = 1e-12);
        assert_relative_eq!(
            Integrand::Exp.exact(0.0, 1.0),
            std::f64::consts::E - 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_eval() {
        assert_eq!(Integrand::Square.eval(3.0), 9.0);
        assert_eq!(Integrand::Exp.eval(0.0), 1.0);
        assert_eq!(Integrand::Sin.eval(0.0), 0.0);
    }

    #[test]
    fn test_sampled_integral_close_to_exact() {
        let settings = RunSettings {
            iterations: 400_000,
            threads: Some(2),
            seed: Some(5),
            ..Default::default()
        };
        let integral = UniformIntegral::new(0.0, 1.0, |x: f64| Integrand::Exp.eval(x)).unwrap();
        let report = super::super::execute(integral, &settings, Weighting::BlocksClaimed).unwrap();
        assert_relative_eq!(
            report.estimate,
            Integrand::Exp.exact(0.0, 1.0),
            max_relative = 0.01
        );
    }
}
