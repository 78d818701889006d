//! Header bar: logo, tab strip, generation indicator.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::{AppState, Tab};
use crate::utils::spinner_char;

pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let t = &state.theme;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(20), // Logo
            Constraint::Min(30),    // Tabs
            Constraint::Length(24), // Backend / activity
        ])
        .split(area);

    let logo = Paragraph::new(Line::from(vec![
        Span::styled(" ≈ ", Style::default().fg(t.accent_secondary)),
        Span::styled("AquaSentinel", t.header_style()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(t.border_style()),
    );
    frame.render_widget(logo, chunks[0]);

    let active = state.active_tab();
    let mut tab_spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::all().iter().enumerate() {
        let label = format!(" {} {} ", i + 1, tab.label());
        let style = if *tab == active {
            t.tab_active_style()
        } else {
            t.tab_inactive_style()
        };
        tab_spans.push(Span::styled(label, style));
        if i < Tab::all().len() - 1 {
            tab_spans.push(Span::styled("│", Style::default().fg(t.text_muted)));
        }
    }
    let tab_line = Paragraph::new(Line::from(tab_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(t.border_style()),
    );
    frame.render_widget(tab_line, chunks[1]);

    let activity = if state.workflow.is_loading() {
        Span::styled(
            format!(" {} Generating ", spinner_char(state.tick_count)),
            Style::default()
                .fg(t.bg_dark)
                .bg(t.accent)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!("backend: {}", state.backend_name),
            Style::default().fg(t.text_dim),
        )
    };
    let summary = Paragraph::new(Line::from(activity))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(t.border_style()),
        );
    frame.render_widget(summary, chunks[2]);
}
