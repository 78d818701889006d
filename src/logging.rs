//! Tracing subscriber initialization.
//!
//! The terminal belongs to the UI, so logs go to a file
//! (`~/.local/share/aquasentinel/aquasentinel.log` unless `--log-file` is given).
//!
//! # Filter priority (highest to lowest)
//!
//! 1. `AQUASENTINEL_LOG` env var
//! 2. `RUST_LOG` env var
//! 3. `-v` count (`-v` debug, `-vv` trace)
//! 4. `log_level` from config.toml
//! 5. `warn`

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::constants::{default_log_path, LOG_ENV_VAR};

/// Map the `-v` count to a level. Zero means "not given".
fn verbosity_level(verbose: u8) -> Option<Level> {
    match verbose {
        0 => None,
        1 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

/// Pick the filter directive string. Environment values that fail to parse
/// fall through to the next source.
fn select_directive(
    project_env: Option<String>,
    rust_log: Option<String>,
    verbose: u8,
    config_level: Option<&str>,
) -> String {
    let parses = |d: &str| EnvFilter::try_new(d).is_ok();

    if let Some(d) = project_env.filter(|d| parses(d)) {
        return d;
    }
    if let Some(d) = rust_log.filter(|d| parses(d)) {
        return d;
    }
    if let Some(level) = verbosity_level(verbose) {
        return format!("warn,aquasentinel={}", level.as_str().to_lowercase());
    }
    if let Some(d) = config_level.filter(|d| parses(d)) {
        return d.to_string();
    }
    Level::WARN.as_str().to_lowercase()
}

fn build_env_filter(verbose: u8, config_level: Option<&str>) -> EnvFilter {
    let directive = select_directive(
        std::env::var(LOG_ENV_VAR).ok(),
        std::env::var("RUST_LOG").ok(),
        verbose,
        config_level,
    );
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Returns the log file path in use.
///
/// Call once, before the terminal enters the alternate screen.
pub fn init(log_file: Option<&Path>, verbose: u8, config_level: Option<&str>) -> Result<PathBuf> {
    let path = log_file.map(Path::to_path_buf).unwrap_or_else(default_log_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(build_env_filter(verbose, config_level))
        .with(fmt_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(path)
}
