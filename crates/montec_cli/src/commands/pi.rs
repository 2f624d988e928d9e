//! Pi command implementation
//!
//! Estimates π by sampling the unit square.

use montec_core::engine::Weighting;
use montec_core::trials::QuarterCircle;
use tracing::info;

use crate::config::RunSettings;
use crate::Result;

/// Run the pi command
pub fn run(settings: &RunSettings) -> Result<()> {
    info!("Estimating pi...");
    let report = super::execute(QuarterCircle, settings, Weighting::BlocksClaimed)?;
    super::print_report(
        "Quarter-circle estimate of pi",
        &report,
        Some(std::f64::consts::PI),
        settings.format,
    )?;
    info!("Pi estimate complete");
    Ok(())
}
