//! montec CLI - parallel Monte Carlo sampling from the command line
//!
//! # Commands
//!
//! - `montec pi` - Estimate π from the unit square
//! - `montec tail --threshold <k>` - Estimate E[X | X > k] for standard normal X
//! - `montec integrate --function <f> --lower <a> --upper <b>` - Estimate a definite integral
//! - `montec check` - Validate settings and run a short self-test
//!
//! Settings are resolved as CLI flags > `MONTEC_*` environment > TOML file > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

use commands::integrate::Integrand;
use config::{build_settings, CliArgs, LogLevel, OutputFormat};
pub use error::{CliError, Result};

/// Parallel Monte Carlo sampling engine
#[derive(Parser)]
#[command(name = "montec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file path (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Requested number of trials
    #[arg(short = 'n', long, global = true, env = "MONTEC_ITERATIONS")]
    iterations: Option<u64>,

    /// Worker threads, the calling thread included
    #[arg(short = 't', long, global = true, env = "MONTEC_THREADS")]
    threads: Option<usize>,

    /// Trials per block
    #[arg(short, long, global = true, env = "MONTEC_BLOCK_SIZE")]
    block_size: Option<usize>,

    /// Seed for reproducible runs
    #[arg(short, long, global = true, env = "MONTEC_SEED")]
    seed: Option<u64>,

    /// Log level
    #[arg(
        long,
        global = true,
        value_enum,
        ignore_case = true,
        env = "MONTEC_LOG_LEVEL",
    )]
    log_level: Option<LogLevel>,

    /// Output format
    #[arg(
        short,
        long,
        global = true,
        value_enum,
        ignore_case = true,
        env = "MONTEC_FORMAT",
    )]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate pi from the fraction of points inside the unit quarter circle
    Pi,

    /// Estimate the mean of a standard normal above a threshold
    Tail {
        /// Lower threshold k
        #[arg(short = 'k', long, default_value = "1.0", allow_negative_numbers = true)]
        threshold: f64,
    },

    /// Estimate a definite integral by uniform sampling
    Integrate {
        /// Function to integrate
        #[arg(long, value_enum, default_value = "sin")]
        function: Integrand,

        /// Lower bound
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        lower: f64,

        /// Upper bound
        #[arg(long, default_value = "1.0", allow_negative_numbers = true)]
        upper: f64,
    },

    /// Check settings and run a short self-test
    Check,
}

impl Cli {
    fn settings_args(&self) -> CliArgs {
        CliArgs {
            config_file: self.config.clone(),
            iterations: self.iterations,
            threads: self.threads,
            block_size: self.block_size,
            seed: self.seed,
            log_level: self.log_level,
            format: self.format,
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = build_settings(&cli.settings_args())?;

    init_tracing(settings.log_level.as_filter_str());
    tracing::debug!(?settings, "Resolved settings");

    match cli.command {
        Commands::Pi => commands::pi::run(&settings),
        Commands::Tail { threshold } => commands::tail::run(&settings, threshold),
        Commands::Integrate {
            function,
            lower,
            upper,
        } => commands::integrate::run(&settings, function, lower, upper),
        Commands::Check => commands::check::run(&settings),
    }
}
