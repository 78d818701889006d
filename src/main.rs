//! # AquaSentinel - Terminal Water Intake Assistant
//!
//! Collects a location, water source and concerns, produces an advisory
//! report, and draws a memory graph of how the inputs flowed into it.

mod app;
mod config;
pub mod constants;
mod diagram;
mod engine;
mod logging;
mod models;
mod report;
mod ui;
mod utils;
mod workflow;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use config::Config;

/// AquaSentinel - water safety reports in your terminal
#[derive(Parser, Debug)]
#[command(name = "aquasentinel", version, about = "Water intake form, advisory report and memory graph")]
struct Cli {
    /// Color theme (default, lagoon, gruvbox, nord, solarized, or a custom theme file name)
    #[arg(long, short = 't')]
    theme: Option<String>,

    /// Use the builtin report, never call the Claude API
    #[arg(long)]
    offline: bool,

    /// Claude model identifier
    #[arg(long, value_name = "ID")]
    model: Option<String>,

    /// Write logs to this file instead of the data directory
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load and apply CLI overrides to config
    let mut config = Config::load();
    if let Some(ref theme_name) = cli.theme {
        config.theme = theme_name.clone();
    }
    if let Some(ref model) = cli.model {
        config.report.model = model.clone();
    }

    let log_path = logging::init(
        cli.log_file.as_deref(),
        cli.verbose,
        config.log_level.as_deref(),
    )?;
    tracing::info!(log = %log_path.display(), "aquasentinel starting");

    let mut app = app::App::new(&config, cli.offline);
    app.run().await
}
