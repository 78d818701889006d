//! Renderer module: split into focused submodules.
//!
//! - `header`: Logo, tab strip, generation indicator
//! - `status_bar`: Bottom status bar with keybinds and messages
//! - `report`: Intake form and report output
//! - `graph`: Memory graph view
//! - `placeholder`: Tabs that are not built yet
//! - `overlays`: Help popup
//! - `helpers`: Shared rendering utilities

mod graph;
mod header;
pub mod helpers;
mod overlays;
mod placeholder;
mod report;
mod status_bar;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use super::{AppState, Tab};

/// Top-level render function. Delegates to sub-renderers per tab.
pub fn render(frame: &mut Frame, state: &AppState) {
    let size = frame.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header bar
            Constraint::Min(10),   // Content area
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    header::render_header(frame, main_chunks[0], state);
    status_bar::render_status_bar(frame, main_chunks[2], state);

    match state.active_tab() {
        Tab::Report => report::render_report(frame, main_chunks[1], state),
        Tab::Graph => graph::render_graph(frame, main_chunks[1], state),
        tab @ (Tab::Planner | Tab::Awareness) => {
            placeholder::render_placeholder(frame, main_chunks[1], state, tab)
        }
    }

    if state.show_help {
        overlays::render_help_overlay(frame, size, state);
    }
}
