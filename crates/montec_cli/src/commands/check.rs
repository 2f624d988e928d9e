//! Check command implementation
//!
//! Validates the resolved settings and runs a short self-test.

use montec_core::engine::{Dispatcher, SamplerConfig, Weighting};
use montec_core::trial::{FnTrial, SlotContext};
use tracing::{info, warn};

use crate::config::RunSettings;
use crate::{CliError, Result};

const SELF_TEST_BLOCKS: u64 = 64;

/// Run the check command
pub fn run(settings: &RunSettings) -> Result<()> {
    info!("Checking system configuration...");

    println!("montec_core {}", montec_core::VERSION);
    let config = settings.sampler_config(Weighting::BlocksClaimed)?;
    println!("  Iterations:   {}", config.iterations());
    println!("  Threads:      {}", config.threads());
    println!("  Block size:   {}", config.block_size());
    println!("  Total blocks: {}", config.total_blocks());
    match config.seed() {
        Some(seed) => println!("  Seed:         {}", seed),
        None => println!("  Seed:         (random)"),
    }
    println!("  Log level:    {}", settings.log_level);
    println!("  Format:       {}", settings.format);

    if config.total_blocks() == 0 {
        warn!("Configured run has no trials; sampling commands will fail");
    }

    // Every thread must contribute to a constant evaluator exactly.
    let self_test = SamplerConfig::builder()
        .iterations(SELF_TEST_BLOCKS * config.block_size() as u64)
        .threads(config.threads())
        .block_size(config.block_size())
        .seed(0)
        .build()?;
    let trial = FnTrial::new(
        |_: &mut f64, _: &mut SlotContext<'_>| {},
        |_: &f64| Some(1.0_f64),
    );
    let report = Dispatcher::new(trial, self_test).run()?;
    if report.estimate != 1.0 || report.blocks_processed() != SELF_TEST_BLOCKS {
        return Err(CliError::InvalidArgument(format!(
            "Self-test failed: estimate {} over {} blocks",
            report.estimate,
            report.blocks_processed()
        )));
    }

    println!("  Self-test:    ok ({} threads)", report.threads);
    info!("System check complete");
    Ok(())
}
