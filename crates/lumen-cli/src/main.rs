//! Lumen CLI - Headless Player Driver
//!
//! Features:
//! - Scripted session replay against the player control layer
//! - File-backed preferences, so resume behaviour can be checked across runs
//! - Time display formatting

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;
mod simulator;
mod store;

use output::OutputFormat;

/// Lumen CLI - Player control toolkit
#[derive(Parser)]
#[command(name = "lumen-cli")]
#[command(version)]
#[command(about = "Headless driver for the Lumen player control layer", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON session script and print the final page state
    Simulate {
        /// Path to the script
        script: PathBuf,

        /// JSON file holding stored preferences (created if missing)
        #[arg(short, long)]
        prefs: Option<PathBuf>,

        /// Player configuration JSON
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Format seconds as M:SS
    FormatTime {
        /// Values in seconds
        #[arg(required = true, allow_negative_numbers = true)]
        seconds: Vec<f64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    let format = OutputFormat::from(cli.format.as_str());
    let out = match cli.command {
        Commands::Simulate { script, prefs, config } => {
            commands::simulate(&script, prefs.as_deref(), config.as_deref(), format)?
        }
        Commands::FormatTime { seconds } => commands::format_times(&seconds, format),
    };
    println!("{out}");

    Ok(())
}
