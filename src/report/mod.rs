//! Report generation backends.
//!
//! A `ReportService` turns a form snapshot into markdown advice. The app
//! spawns one call per submission and receives the outcome as a
//! `ReportEvent` tagged with the submission id.

mod builtin;
mod claude;
mod prompt;

pub use builtin::BuiltinReportService;
pub use claude::ClaudeReportService;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ReportBackend, ReportConfig};
use crate::models::FormInputs;

/// Errors from a report backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("no API key found (set ANTHROPIC_API_KEY)")]
    MissingApiKey,
    #[error("failed to connect to the report service: {0}")]
    Connection(String),
    #[error("authentication failed (401), check ANTHROPIC_API_KEY")]
    Unauthorized,
    #[error("access forbidden (403), the key may not have API access")]
    Forbidden,
    #[error("rate limited, wait a moment and try again")]
    RateLimited,
    #[error("API error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("stream error: {0}")]
    Stream(String),
    #[error("the report service returned an empty report")]
    Empty,
}

impl ReportError {
    /// Map a non-success HTTP status to an error.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => ReportError::Unauthorized,
            403 => ReportError::Forbidden,
            429 => ReportError::RateLimited,
            _ => ReportError::Http {
                status,
                message: crate::utils::truncate_str(body.trim(), 300),
            },
        }
    }
}

/// Produces report text from form inputs.
#[async_trait]
pub trait ReportService: Send + Sync {
    async fn generate_report(&self, inputs: &FormInputs) -> Result<String, ReportError>;

    /// Short backend name for the status bar.
    fn name(&self) -> &str;
}

/// Completion of one report request, sent back to the event loop.
#[derive(Debug)]
pub struct ReportEvent {
    /// Submission id the request was started for.
    pub id: u64,
    pub result: Result<String, ReportError>,
}

/// Pick the backend from config and the environment.
///
/// `offline` forces the builtin backend. Claude without an API key falls back
/// to builtin with a warning.
pub fn build_service(config: &ReportConfig, offline: bool) -> Arc<dyn ReportService> {
    let builtin = || -> Arc<dyn ReportService> {
        Arc::new(BuiltinReportService::new(config.simulated_latency_ms))
    };
    if offline || config.backend == ReportBackend::Builtin {
        return builtin();
    }
    let timeout = Duration::from_secs(config.request_timeout_secs);
    match ClaudeReportService::from_env(&config.model, config.max_tokens, timeout) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::warn!(error = %e, "claude backend unavailable, using builtin report");
            builtin()
        }
    }
}
