//! # curb CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros for argument parsing.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use curb_cli::markers::{run_coupons, run_final, run_show, run_temp, FinalArgs, MarkerArgs, TempArgs};
use curb_cli::watch::{run_watch, WatchArgs};
use curb_client::{ClientConfig, MarkerClient};

/// Curb CLI
///
/// Drives the abandoned-bicycle marker-unlock workflow from a terminal:
/// inspect a marker, declare a temporary unlock, count down the
/// eligibility window, and complete the final unlock.
#[derive(Parser, Debug)]
#[command(name = "curb", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Base URL of the Curb API.
    #[arg(long, global = true, env = "CURB_API_URL", default_value = "http://localhost:8080")]
    api: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the current state of a marker.
    Show(MarkerArgs),

    /// Temporarily unlock a marker (starts the eligibility clock).
    Temp(TempArgs),

    /// Permanently unlock a marker (issues a coupon when available).
    #[command(name = "final")]
    Final(FinalArgs),

    /// List coupons issued against a marker.
    Coupons(MarkerArgs),

    /// Live countdown until final unlock is permitted.
    Watch(WatchArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let client = match ClientConfig::new(&cli.api).and_then(MarkerClient::new) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Commands::Show(args) => run_show(&client, &args).await,
        Commands::Temp(args) => run_temp(&client, &args).await,
        Commands::Final(args) => run_final(&client, &args).await,
        Commands::Coupons(args) => run_coupons(&client, &args).await,
        Commands::Watch(args) => run_watch(&client, &args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
