//! Buslane CLI - live bus arrival countdowns in your terminal.

mod commands;
mod error;
mod render;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::watch::WatchArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "buslane", version, about = "Live bus arrival countdowns for a transit stop")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch live arrivals for a bus stop
    Watch {
        /// Bus stop code, e.g. 97309
        stop_code: String,

        /// Seconds between successful polls
        #[arg(long, default_value_t = buslane::poller::DEFAULT_POLL_INTERVAL_SECS)]
        interval: u64,

        /// Seconds before retrying a failed poll
        #[arg(long, default_value_t = buslane::poller::DEFAULT_RETRY_INTERVAL_SECS)]
        retry_interval: u64,

        /// Render one snapshot and exit
        #[arg(long)]
        once: bool,

        /// Service to list first (repeatable)
        #[arg(long = "pin")]
        pins: Vec<String>,

        /// Override the arrival feed endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    match cli.command {
        Commands::Watch {
            stop_code,
            interval,
            retry_interval,
            once,
            pins,
            endpoint,
        } => runtime.block_on(commands::watch::run(WatchArgs {
            stop_code,
            interval,
            retry_interval,
            once,
            pins,
            endpoint,
        })),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
