//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Sampling commands share
//! [`execute`] and [`print_report`].

pub mod check;
pub mod integrate;
pub mod pi;
pub mod tail;

use std::fmt::Display;

use montec_core::engine::{Dispatcher, RunReport, Weighting};
use montec_core::trial::Trial;
use serde::Serialize;
use tracing::info;

use crate::config::{OutputFormat, RunSettings};
use crate::Result;

/// Runs `trial` to completion under `settings`.
pub fn execute<R>(trial: R, settings: &RunSettings, weighting: Weighting) -> Result<RunReport<f64>>
where
    R: Trial<Output = f64>,
{
    let config = settings.sampler_config(weighting)?;
    info!(
        iterations = config.iterations(),
        threads = config.threads(),
        block_size = config.block_size(),
        "Starting sampling run"
    );
    let report = Dispatcher::new(trial, config).run()?;
    Ok(report)
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    experiment: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    exact: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    abs_error: Option<f64>,
    report: &'a RunReport<f64>,
}

/// Prints `report` in the requested format, alongside the exact value when known.
pub fn print_report(
    experiment: &str,
    report: &RunReport<f64>,
    exact: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = JsonOutput {
                experiment,
                exact,
                abs_error: exact.map(|e| (report.estimate - e).abs()),
                report,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            println!("\n{}", experiment);
            println!("┌──────────────────┬──────────────────────┐");
            table_row("Estimate", format!("{:.10}", report.estimate));
            if let Some(exact) = exact {
                table_row("Exact", format!("{:.10}", exact));
                table_row("Abs error", format!("{:.3e}", (report.estimate - exact).abs()));
            }
            println!("├──────────────────┼──────────────────────┤");
            table_row("Trials", report.trials_executed());
            table_row("Accepted", report.valid_trials());
            table_row("Acceptance", format!("{:.4}", report.acceptance_rate()));
            table_row("Blocks", report.total_blocks);
            table_row("Threads", report.threads);
            table_row("Seed", report.seed);
            table_row("Elapsed", format!("{:.3?}", report.elapsed));
            println!("└──────────────────┴──────────────────────┘");
        }
    }
    Ok(())
}

fn table_row(label: &str, value: impl Display) {
    println!("│ {:<16} │ {:>20} │", label, value);
}
