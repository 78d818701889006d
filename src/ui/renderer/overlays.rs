//! Popup overlays.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::helpers::centered_rect;
use crate::constants::{HELP_POPUP_HEIGHT, HELP_POPUP_WIDTH};
use crate::ui::AppState;

pub fn render_help_overlay(frame: &mut Frame, area: Rect, state: &AppState) {
    let t = &state.theme;
    let popup_area = centered_rect(HELP_POPUP_WIDTH, HELP_POPUP_HEIGHT, area);

    frame.render_widget(Clear, popup_area);

    let help_entry = |key: &str, desc: &str, color: Color| -> Line {
        Line::from(vec![
            Span::styled(
                format!("  {:<18}", key),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(desc.to_string(), Style::default().fg(t.text_primary)),
        ])
    };
    let section = |title: &str| -> Line {
        Line::from(Span::styled(
            format!("  {}", title),
            Style::default()
                .fg(t.accent_secondary)
                .add_modifier(Modifier::BOLD),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled("  AQUASENTINEL - Keyboard Shortcuts", t.header_style())),
        Line::raw(""),
        help_entry("1 / 2 / 3 / 4", "Report, Planner, Awareness, Graph", t.accent),
        help_entry("Tab / Shift+Tab", "Next / previous tab", t.accent),
        help_entry("T", "Cycle color theme", t.accent),
        help_entry("?", "Toggle this help", t.accent),
        help_entry("q / Ctrl+C", "Quit", t.accent),
        Line::raw(""),
        section("Report tab:"),
        help_entry("Up / Down", "Move between fields", t.accent),
        help_entry("Enter", "Edit field / submit", t.accent),
        help_entry("Left / Right", "Change water source", t.accent),
        help_entry("Ctrl+S", "Submit from anywhere", t.success),
        help_entry("PgUp / PgDn", "Scroll the report", t.accent),
        Line::raw(""),
        section("While editing:"),
        help_entry("Esc / Enter", "Finish editing", t.accent),
        help_entry("Home / End", "Jump to start / end", t.accent),
        Line::raw(""),
        section("Memory Graph tab:"),
        help_entry("Up / Down", "Scroll the diagram", t.accent),
    ];

    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(t.border_highlight_style())
            .title(Span::styled(" Help ", t.header_style())),
    );
    frame.render_widget(help, popup_area);
}
