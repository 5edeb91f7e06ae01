//! Opine launcher
//!
//! Two workflows over one bundle file:
//! - `opine judge`: attach an opinion to an indicator and save the bundle
//! - `opine read`: browse the opinions recorded against an indicator

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use opine_logging::LogConfig;
use opine_model::{Bundle, OPINION_VALUES};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

mod report;
mod tui;

use tui::app::Flow;

#[derive(Parser, Debug)]
#[command(name = "opine", about = "Evaluate and review threat intelligence indicators")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record an opinion on an indicator and save the bundle
    Judge {
        /// Bundle file to read
        #[arg(short = 'i', long)]
        input: PathBuf,

        /// Where to write the updated bundle (defaults to overwriting the input)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Browse opinions recorded against an indicator
    Read {
        /// Bundle file to read
        #[arg(short = 'i', long)]
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = opine_logging::init_logging(LogConfig {
        verbose: cli.verbose,
    }) {
        eprintln!("Warning: failed to initialize logging: {err:#}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let opinion_values: Vec<String> = OPINION_VALUES.iter().map(|v| v.to_string()).collect();

    match cli.command {
        Commands::Judge { input, output } => {
            let bundle = load_bundle(&input)?;
            let output = output.unwrap_or_else(|| input.clone());
            tui::run(Flow::Judge { output }, bundle, opinion_values)
        }
        Commands::Read { input } => {
            let bundle = load_bundle(&input)?;
            tui::run(Flow::Read, bundle, opinion_values)
        }
    }
}

/// Parse the input as a bundle before any UI is shown. A file that does
/// not parse, or whose top-level type is not `bundle`, aborts here.
fn load_bundle(path: &PathBuf) -> Result<Bundle> {
    let bundle = Bundle::from_path(path)
        .with_context(|| format!("Failed to load bundle from {}", path.display()))?;
    info!(
        objects = bundle.objects.len(),
        path = %path.display(),
        "bundle loaded"
    );
    Ok(bundle)
}
