//! Command-line client for QuietCool attic fans.
//!
//! Connects to a fan over BLE and dumps its state as JSON.
//!
//! The pairing identifier is required and sourced in this order:
//!
//! 1. `--id` argument
//! 2. `QUIETCOOL` environment variable
//! 3. `/etc/quietcool`
//! 4. `~/.quietcool`
//! 5. `./.quietcool`
//!
//! The identifier must already be paired with the fan (put the fan in
//! pairing mode from its own controller, then log in once).

// ============================================================================
// Imports
// ============================================================================

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use quietcool::{Api, Client, Result};

// ============================================================================
// Cli
// ============================================================================

/// Connects to a QuietCool fan over BLE and dumps its state.
#[derive(Debug, Parser)]
#[command(name = "quietcool", version, about)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Option<Command>,

    /// Pairing identifier (overrides environment and files).
    #[arg(long)]
    id: Option<String>,

    /// Discovery timeout in seconds.
    #[arg(long, default_value_t = 3)]
    timeout: u64,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Available commands; `info` is the default.
#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Dump identity, versions, parameters, and current state.
    Info,
    /// Dump the stored presets.
    Presets,
    /// Dump the current operating state and sensor readings.
    Status,
    /// Dump the countdown timer remaining.
    Timer,
    /// Dump the firmware upgrade state.
    Upgrade,
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut builder = Client::builder().discovery_timeout(Duration::from_secs(cli.timeout));
    if let Some(id) = cli.id {
        builder = builder.pair_id(id);
    }
    let client = builder.build()?;

    let api = client.connect().await?;
    let output = match cli.command.unwrap_or(Command::Info) {
        Command::Info => info(&api).await?,
        Command::Presets => serde_json::to_value(api.presets().await?)?,
        Command::Status => serde_json::to_value(api.work_state().await?)?,
        Command::Timer => serde_json::to_value(api.remain_time().await?)?,
        Command::Upgrade => serde_json::to_value(api.upgrade_state().await?)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    api.disconnect().await
}

/// Collects the full picture of the fan in one object.
async fn info(api: &Api) -> Result<serde_json::Value> {
    Ok(json!({
        "fan": api.fan_info().await?,
        "version": api.version().await?,
        "parameters": api.parameters().await?,
        "work_state": api.work_state().await?,
    }))
}
