use std::path::Path;

use serde::Deserialize;

use crate::constants::*;
use crate::models::{FormInputs, WaterSource};

/// Application configuration with sensible defaults.
///
/// Can be overridden via ~/.config/aquasentinel/config.toml
#[derive(Debug, Clone)]
pub struct Config {
    /// Theme name (built-in or custom)
    pub theme: String,
    /// Log filter used when no environment override is set
    pub log_level: Option<String>,
    /// Values the intake form starts with
    pub form: FormDefaults,
    /// Report backend settings
    pub report: ReportConfig,
    /// Diagram engine settings
    pub diagram: DiagramConfig,
}

/// Initial contents of the intake form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDefaults {
    pub location: String,
    pub water_source: WaterSource,
    pub concerns: String,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            water_source: WaterSource::from_label(DEFAULT_WATER_SOURCE).unwrap_or_default(),
            concerns: DEFAULT_CONCERNS.to_string(),
        }
    }
}

impl FormDefaults {
    /// Inputs the form starts with.
    pub fn to_inputs(&self) -> FormInputs {
        FormInputs {
            location: self.location.clone(),
            water_source: self.water_source,
            concerns: self.concerns.clone(),
        }
    }
}

/// Which report service produces the advisory text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportBackend {
    /// Fixed advisory report, no network.
    Builtin,
    /// Anthropic Messages API.
    Claude,
}

impl ReportBackend {
    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "builtin" | "offline" => Some(ReportBackend::Builtin),
            "claude" | "anthropic" => Some(ReportBackend::Claude),
            _ => None,
        }
    }
}

/// Report backend settings.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub backend: ReportBackend,
    /// Claude model identifier
    pub model: String,
    /// Response token cap for Claude
    pub max_tokens: u32,
    /// Artificial delay of the builtin backend (ms)
    pub simulated_latency_ms: u64,
    /// Upper bound on one Claude request, stream included (s)
    pub request_timeout_secs: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            backend: ReportBackend::Builtin,
            model: CLAUDE_MODEL.to_string(),
            max_tokens: CLAUDE_MAX_TOKENS,
            simulated_latency_ms: DEFAULT_SIMULATED_LATENCY_MS,
            request_timeout_secs: CLAUDE_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Diagram engine settings, applied once at startup.
#[derive(Debug, Clone)]
pub struct DiagramConfig {
    /// Engine theme name (neutral, plain)
    pub theme: String,
    /// ASCII glyphs instead of box drawing
    pub ascii: bool,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            theme: DEFAULT_DIAGRAM_THEME.to_string(),
            ascii: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            log_level: None,
            form: FormDefaults::default(),
            report: ReportConfig::default(),
            diagram: DiagramConfig::default(),
        }
    }
}

/// TOML-deserializable config file format.
/// All fields are optional — missing fields use defaults.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileConfig {
    theme: Option<String>,
    log_level: Option<String>,
    form: Option<FileFormConfig>,
    report: Option<FileReportConfig>,
    diagram: Option<FileDiagramConfig>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileFormConfig {
    location: Option<String>,
    water_source: Option<String>,
    concerns: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileReportConfig {
    backend: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    simulated_latency_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileDiagramConfig {
    theme: Option<String>,
    ascii: Option<bool>,
}

impl Config {
    /// Load config from ~/.config/aquasentinel/config.toml, falling back to
    /// defaults for any missing fields. If the file doesn't exist, returns pure defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Config::default(), // No config file — use defaults
        };
        match Self::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to parse {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Config::default()
            }
        }
    }

    /// Parse TOML text and merge it over the defaults.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let file_config: FileConfig = toml::from_str(content)?;
        let mut config = Config::default();

        if let Some(v) = file_config.theme {
            if !v.is_empty() {
                config.theme = v;
            }
        }
        if let Some(v) = file_config.log_level {
            if !v.is_empty() {
                config.log_level = Some(v);
            }
        }

        // Merge form defaults
        if let Some(f) = file_config.form {
            if let Some(v) = f.location {
                config.form.location = v;
            }
            if let Some(v) = f.water_source {
                match WaterSource::from_label(&v) {
                    Some(source) => config.form.water_source = source,
                    None => tracing::warn!(value = %v, "unknown water source in config, keeping default"),
                }
            }
            if let Some(v) = f.concerns {
                config.form.concerns = v;
            }
        }

        // Merge report config
        if let Some(r) = file_config.report {
            if let Some(v) = r.backend {
                match ReportBackend::from_name(&v) {
                    Some(backend) => config.report.backend = backend,
                    None => tracing::warn!(value = %v, "unknown report backend in config, using builtin"),
                }
            }
            if let Some(v) = r.model {
                if !v.is_empty() {
                    config.report.model = v;
                }
            }
            if let Some(v) = r.max_tokens {
                config.report.max_tokens = v.max(MIN_MAX_TOKENS);
            }
            if let Some(v) = r.simulated_latency_ms {
                config.report.simulated_latency_ms = v.min(MAX_SIMULATED_LATENCY_MS);
            }
            if let Some(v) = r.request_timeout_secs {
                config.report.request_timeout_secs =
                    v.clamp(MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS);
            }
        }

        // Merge diagram config
        if let Some(d) = file_config.diagram {
            if let Some(v) = d.theme {
                if !v.is_empty() {
                    config.diagram.theme = v;
                }
            }
            if let Some(v) = d.ascii {
                config.diagram.ascii = v;
            }
        }

        Ok(config)
    }
}
