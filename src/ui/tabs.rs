use std::fmt;

use thiserror::Error;

/// The four top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Report,
    Planner,
    Awareness,
    Graph,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Report, Tab::Planner, Tab::Awareness, Tab::Graph]
    }

    /// Stable lowercase name used for selection.
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Report => "report",
            Tab::Planner => "planner",
            Tab::Awareness => "awareness",
            Tab::Graph => "graph",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Report => "Report",
            Tab::Planner => "Planner",
            Tab::Awareness => "Awareness",
            Tab::Graph => "Memory Graph",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_lowercase();
        Self::all().iter().copied().find(|t| t.name() == wanted)
    }

    fn index(&self) -> usize {
        Self::all().iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabError {
    #[error("unknown tab `{0}`")]
    Unknown(String),
}

/// Which view is active. Selection has no side effects.
#[derive(Debug, Clone, Default)]
pub struct TabController {
    current: Tab,
}

impl TabController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Tab {
        self.current
    }

    /// Select by name. Unknown names leave the selection unchanged.
    pub fn select(&mut self, name: &str) -> Result<Tab, TabError> {
        match Tab::from_name(name) {
            Some(tab) => {
                self.current = tab;
                Ok(tab)
            }
            None => {
                tracing::warn!(tab = name, "ignoring unknown tab");
                Err(TabError::Unknown(name.to_string()))
            }
        }
    }
}
