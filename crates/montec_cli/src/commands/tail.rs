//! Tail command implementation
//!
//! Estimates E[X | X > k] for a standard normal X.

use montec_core::engine::Weighting;
use montec_core::trials::NormalTail;
use tracing::info;

use crate::config::RunSettings;
use crate::{CliError, Result};

/// Run the tail command
pub fn run(settings: &RunSettings, threshold: f64) -> Result<()> {
    if !threshold.is_finite() {
        return Err(CliError::InvalidArgument(format!("Threshold must be finite, got {threshold}")));
    }

    info!("Estimating normal tail mean above {}...", threshold);
    let report = super::execute(NormalTail::new(threshold), settings, Weighting::ValidTrials)?;
    super::print_report(
        &format!("E[X | X > {}], X ~ N(0, 1)", threshold),
        &report,
        None,
        settings.format,
    )?;
    info!("Tail estimate complete");
    Ok(())
}
