//! Memory Graph tab: the retained diagram view.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::helpers::{clamp_scroll, panel, render_scrollbar_bordered};
use crate::engine::RenderedDiagram;
use crate::ui::{AppState, Theme};

/// Convert engine output into styled terminal lines.
pub fn diagram_lines(diagram: &RenderedDiagram, t: &Theme) -> Vec<Line<'static>> {
    diagram
        .lines
        .iter()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .spans
                .iter()
                .map(|s| {
                    let mut style = Style::default().fg(t.stroke_color(s.stroke.as_deref()));
                    if s.bold {
                        style = style.add_modifier(Modifier::BOLD);
                    }
                    Span::styled(s.text.clone(), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

pub fn render_graph(frame: &mut Frame, area: Rect, state: &AppState) {
    let t = &state.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    let intro = Paragraph::new(Line::from(Span::styled(
        " This graph visualizes the connection between your input and the agent's actions. \
         It is generated after you submit a report.",
        Style::default().fg(t.text_dim),
    )))
    .wrap(Wrap { trim: true });
    frame.render_widget(intro, chunks[0]);

    let block = panel("Memory Graph", t, false);
    let body = chunks[1];
    let view = &state.graph_view;
    let placeholder = |text: String, style: Style| {
        Paragraph::new(vec![Line::default(), Line::from(Span::styled(text, style))])
            .block(panel("Memory Graph", t, false))
            .wrap(Wrap { trim: false })
    };

    if state.workflow.result().diagram_source.is_none() {
        frame.render_widget(
            placeholder(
                "  Generate a report first to see the graph.".to_string(),
                Style::default().fg(t.text_dim),
            ),
            body,
        );
        return;
    }

    if let Some(err) = &view.render_error {
        frame.render_widget(
            placeholder(
                format!("  Could not draw the memory graph: {}", err),
                Style::default().fg(t.danger),
            ),
            body,
        );
        return;
    }

    let rendered = match view.container().rendered() {
        Some(r) => r,
        None => {
            // Source published but the lifecycle has not run yet this frame
            frame.render_widget(
                placeholder("  Drawing...".to_string(), Style::default().fg(t.text_dim)),
                body,
            );
            return;
        }
    };

    let lines = diagram_lines(rendered, t);
    let total = lines.len();
    let visible_height = body.height.saturating_sub(2) as usize;
    let scroll = clamp_scroll(view.scroll, total, visible_height);
    let inner_width = body.width.saturating_sub(2) as usize;
    let pad = inner_width.saturating_sub(rendered.width) / 2;

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(scroll)
        .map(|mut l| {
            l.spans.insert(0, Span::raw(" ".repeat(pad)));
            l
        })
        .collect();
    frame.render_widget(Paragraph::new(visible).block(block), body);
    render_scrollbar_bordered(frame, body, total, scroll);
}
