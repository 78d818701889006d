//! Planner and Awareness tabs, not built yet.

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::helpers::panel;
use crate::ui::{AppState, Tab};

pub fn render_placeholder(frame: &mut Frame, area: Rect, state: &AppState, tab: Tab) {
    let t = &state.theme;
    let lines = vec![
        Line::default(),
        Line::default(),
        Line::from(Span::styled("🚧", Style::default().fg(t.warning))),
        Line::default(),
        Line::from(Span::styled(
            "This feature is under construction.",
            Style::default().fg(t.text_dim),
        )),
    ];
    let para = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel(tab.label(), t, false));
    frame.render_widget(para, area);
}
