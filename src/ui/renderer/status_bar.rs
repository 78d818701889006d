//! Status bar at the bottom of the screen.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::{AppState, Tab};

pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let t = &state.theme;

    let badge = |key: &str, color: Color| -> Span {
        Span::styled(
            format!(" {} ", key),
            Style::default()
                .fg(t.bg_dark)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        )
    };
    let dim = |text: &str| -> Span { Span::styled(text.to_string(), Style::default().fg(t.text_dim)) };

    let mut spans = vec![Span::raw(" ")];
    if state.is_editing() {
        spans.extend([
            badge("Esc/Enter", t.accent),
            dim(" Done "),
            badge("←→", t.accent),
            dim(" Cursor "),
            badge("Ctrl+S", t.success),
            dim(" Submit "),
        ]);
    } else {
        spans.extend([
            badge("q", t.accent),
            dim(" Quit "),
            badge("1-4", t.accent),
            dim(" Tabs "),
            badge("T", t.accent),
            dim(&format!(" Theme: {} ", t.name)),
            badge("?", t.accent),
            dim(" Help "),
        ]);
        match state.active_tab() {
            Tab::Report => spans.extend([
                badge("↑↓", t.accent),
                dim(" Field "),
                badge("Enter", t.accent),
                dim(" Edit "),
                badge("Ctrl+S", t.success),
                dim(" Submit "),
            ]),
            Tab::Graph => spans.extend([badge("↑↓", t.accent), dim(" Scroll ")]),
            Tab::Planner | Tab::Awareness => {}
        }
    }

    // Expiry is handled by AppState::tick
    if let Some((msg, _)) = &state.status_message {
        spans.push(Span::styled(
            format!("  {} ", msg),
            Style::default().fg(t.warning).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
