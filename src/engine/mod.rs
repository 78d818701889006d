//! Diagram engine: turns flowchart source in a container into terminal lines.
//!
//! - `container`: the render target and the retained Graph view
//! - `parser`: flowchart text to a node/edge model
//! - `flowchart`: the built-in layered box renderer
//! - `lifecycle`: decides when the engine runs

mod container;
mod flowchart;
mod lifecycle;
mod parser;

pub use container::{DiagramLine, DiagramSpan, GraphContainer, GraphView, RenderedDiagram};
pub use flowchart::FlowchartEngine;
pub use lifecycle::{DiagramRenderLifecycle, GraphWatch};

use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::constants::DEFAULT_DIAGRAM_THEME;

/// Errors raised while rendering a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("diagram engine used before initialization")]
    NotInitialized,
    #[error("graph view is not mounted")]
    Detached,
    #[error("container has no diagram source")]
    EmptyContainer,
    #[error("syntax error in statement {statement}: {message}")]
    Syntax { statement: usize, message: String },
}

/// Colour handling for rendered diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineTheme {
    /// Keep stroke colours from the style directives.
    #[default]
    Neutral,
    /// Monochrome output.
    Plain,
}

impl EngineTheme {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "neutral" | "default" => EngineTheme::Neutral,
            "plain" | "mono" | "none" => EngineTheme::Plain,
            other => {
                tracing::warn!(theme = other, "unknown diagram theme, using neutral");
                EngineTheme::Neutral
            }
        }
    }
}

/// Process-wide engine settings, fixed at first initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub theme: EngineTheme,
    /// Draw with ASCII glyphs only.
    pub ascii: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            theme: EngineTheme::from_name(DEFAULT_DIAGRAM_THEME),
            ascii: false,
        }
    }
}

static ENGINE_CONFIG: OnceCell<EngineConfig> = OnceCell::new();

/// Configure the engine once per process with rendering on demand only.
///
/// Returns `true` for the call that took effect. Later calls are ignored.
pub fn initialize(config: EngineConfig) -> bool {
    match ENGINE_CONFIG.set(config) {
        Ok(()) => {
            tracing::info!("diagram engine initialized");
            true
        }
        Err(ignored) => {
            tracing::debug!(?ignored, "diagram engine already initialized");
            false
        }
    }
}

/// Active engine settings, if initialized.
pub fn engine_config() -> Option<&'static EngineConfig> {
    ENGINE_CONFIG.get()
}

/// A diagram renderer that processes containers on request.
pub trait DiagramEngine {
    /// Apply process-wide settings. Only the first call has any effect.
    fn initialize(&mut self, config: EngineConfig);

    /// Render every container not yet marked processed.
    fn run(&mut self, nodes: &mut [&mut GraphContainer]) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_from_name() {
        assert_eq!(EngineTheme::from_name("neutral"), EngineTheme::Neutral);
        assert_eq!(EngineTheme::from_name(" Plain "), EngineTheme::Plain);
        assert_eq!(EngineTheme::from_name("forest"), EngineTheme::Neutral);
    }

    #[test]
    fn initialize_takes_effect_once() {
        // Other tests may already have initialized the process-wide config
        initialize(EngineConfig::default());
        assert!(engine_config().is_some());
        assert!(!initialize(EngineConfig {
            theme: EngineTheme::Plain,
            ascii: true,
        }));
    }

    #[test]
    fn render_error_messages() {
        let e = RenderError::Syntax {
            statement: 3,
            message: "bad".into(),
        };
        assert_eq!(e.to_string(), "syntax error in statement 3: bad");
    }
}
