//! Application-wide constants.
//!
//! Centralizes magic numbers, default form values, and well-known paths.

use std::path::PathBuf;

// ── Timing ────────────────────────────────────────────────────────
/// Event poll timeout (ms) -- how often the UI checks for input.
pub const EVENT_POLL_MS: u64 = 50;
/// Status message display duration (seconds).
pub const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 5;
/// Default artificial latency for the builtin report backend (ms).
pub const DEFAULT_SIMULATED_LATENCY_MS: u64 = 600;
/// Upper bound for the simulated latency (ms).
pub const MAX_SIMULATED_LATENCY_MS: u64 = 10_000;

// ── Intake form defaults ──────────────────────────────────────────
/// Example location the form is seeded with.
pub const DEFAULT_LOCATION: &str = "Chhattisgarh";
/// Example water source label the form is seeded with.
pub const DEFAULT_WATER_SOURCE: &str = "Borewell";
/// Example concerns the form is seeded with.
pub const DEFAULT_CONCERNS: &str = "The water tastes salty and our children often get sick.";

// ── Memory graph ──────────────────────────────────────────────────
/// Characters of the concerns text kept in the graph label.
pub const CONCERNS_LABEL_CHARS: usize = 30;
/// Marker appended to the truncated concerns label.
pub const LABEL_ELLIPSIS: &str = "...";
/// Default diagram engine theme.
pub const DEFAULT_DIAGRAM_THEME: &str = "neutral";
/// Minimum inner width of a rendered node box.
pub const MIN_NODE_BOX_WIDTH: usize = 8;
/// Horizontal gap between node boxes in one layer.
pub const NODE_BOX_GAP: usize = 3;

// ── UI Layout ─────────────────────────────────────────────────────
/// Page up/down step size.
pub const PAGE_SIZE: usize = 10;
/// Help overlay width.
pub const HELP_POPUP_WIDTH: u16 = 56;
/// Help overlay height.
pub const HELP_POPUP_HEIGHT: u16 = 24;
/// Form panel width on the Report tab (percent).
pub const FORM_PANEL_PERCENT: u16 = 45;

// ── Claude API ────────────────────────────────────────────────────
/// Claude model identifier.
pub const CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
/// Maximum tokens for Claude responses.
pub const CLAUDE_MAX_TOKENS: u32 = 2048;
/// Lower bound for configured max tokens.
pub const MIN_MAX_TOKENS: u32 = 256;
/// Claude API version string.
pub const CLAUDE_API_VERSION: &str = "2023-06-01";
/// Claude Messages endpoint.
pub const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
/// Connect timeout for the Claude API (seconds).
pub const CLAUDE_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Whole-request timeout for a streamed report (seconds).
pub const CLAUDE_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Bounds for the configured request timeout (seconds).
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 5;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

// ── Spinner Animation ─────────────────────────────────────────────
/// Spinner character sequence for loading indicators.
pub const SPINNER_CHARS: &[&str] = &["◐", "◓", "◑", "◒"];

// ── Logging ───────────────────────────────────────────────────────
/// Project-specific log filter variable (takes priority over RUST_LOG).
pub const LOG_ENV_VAR: &str = "AQUASENTINEL_LOG";

// ── Paths ─────────────────────────────────────────────────────────

/// Returns the user's home directory, falling back to /tmp.
pub fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}

/// Returns `~/.config/aquasentinel/`.
pub fn config_dir() -> PathBuf {
    home_dir().join(".config").join("aquasentinel")
}

/// Returns `~/.config/aquasentinel/config.toml`.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Returns `~/.config/aquasentinel/themes/<name>.toml`.
pub fn custom_theme_path(name: &str) -> PathBuf {
    config_dir().join("themes").join(format!("{}.toml", name))
}

/// Returns `~/.config/aquasentinel/.env` (API key, never committed).
pub fn env_file_path() -> PathBuf {
    config_dir().join(".env")
}

/// Returns `~/.local/share/aquasentinel/`.
pub fn data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join("aquasentinel")
}

/// Returns `~/.local/share/aquasentinel/aquasentinel.log`.
pub fn default_log_path() -> PathBuf {
    data_dir().join("aquasentinel.log")
}
