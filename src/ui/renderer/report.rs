//! Report tab: intake form on the left, generated report on the right.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::helpers::{clamp_scroll, panel, render_scrollbar_bordered};
use crate::constants::FORM_PANEL_PERCENT;
use crate::models::{FormField, TextInput};
use crate::ui::markdown::render_markdown;
use crate::ui::AppState;
use crate::utils::{loading_dots, spinner_char};

/// Which state the output panel is in. Loading wins over error, error over a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputView {
    Loading,
    Error,
    Ready,
    Empty,
}

pub fn output_view(state: &AppState) -> OutputView {
    let r = state.workflow.result();
    if r.is_loading {
        OutputView::Loading
    } else if r.is_error {
        OutputView::Error
    } else if r.report_text.is_some() {
        OutputView::Ready
    } else {
        OutputView::Empty
    }
}

pub fn render_report(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(FORM_PANEL_PERCENT),
            Constraint::Percentage(100 - FORM_PANEL_PERCENT),
        ])
        .split(area);

    render_form(frame, chunks[0], state);
    render_output(frame, chunks[1], state);
}

/// Field value with a block cursor when it is being edited.
fn input_spans<'a>(input: &'a TextInput, editing: bool, style: Style) -> Vec<Span<'a>> {
    let value = input.value();
    if !editing {
        return vec![Span::styled(value, style)];
    }
    let (before, rest) = value.split_at(input.cursor());
    let mut chars = rest.chars();
    let under = chars.next().map(String::from).unwrap_or_else(|| " ".to_string());
    vec![
        Span::styled(before, style),
        Span::styled(under, style.add_modifier(Modifier::REVERSED)),
        Span::styled(chars.as_str(), style),
    ]
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let t = &state.theme;
    let form = &state.form;
    let focused = |f: FormField| form.focus == f;
    let marker = |f: FormField| {
        if focused(f) {
            Span::styled("▸ ", Style::default().fg(t.accent))
        } else {
            Span::raw("  ")
        }
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "Tell us about your water situation.",
            Style::default().fg(t.text_dim),
        )),
        Line::default(),
    ];

    for field in [FormField::Location, FormField::WaterSource, FormField::Concerns] {
        let label = match field {
            FormField::Location => "Your Location",
            FormField::WaterSource => "Primary Water Source",
            _ => "Describe your concerns",
        };
        lines.push(Line::from(vec![
            marker(field),
            Span::styled(label, t.label_style()),
        ]));

        let style = t.field_style(focused(field));
        let mut value = vec![Span::raw("  ")];
        let draft = state.draft_for(field);
        match draft.or_else(|| form.input(field)) {
            Some(input) => value.extend(input_spans(input, draft.is_some(), style)),
            None => {
                let arrows = Style::default().fg(if focused(field) { t.accent } else { t.text_muted });
                value.push(Span::styled("◀ ", arrows));
                value.push(Span::styled(form.water_source().label(), style));
                value.push(Span::styled(" ▶", arrows));
            }
        }
        lines.push(Line::from(value));
        lines.push(Line::default());
    }

    let loading = state.workflow.is_loading();
    let button = if loading {
        format!(" {} Generating Report... ", spinner_char(state.tick_count))
    } else {
        " ⚡ Activate AquaSentinel ".to_string()
    };
    lines.push(Line::from(vec![
        marker(FormField::Submit),
        Span::styled(button, t.button_style(focused(FormField::Submit), loading)),
    ]));

    let block = panel("Water Intake", t, state.is_editing());
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_output(frame: &mut Frame, area: Rect, state: &AppState) {
    let t = &state.theme;
    let block = panel("Your Report", t, false);
    let inner_width = area.width.saturating_sub(3);
    let inner_height = area.height.saturating_sub(2) as usize;
    let result = state.workflow.result();

    let lines: Vec<Line> = match output_view(state) {
        OutputView::Loading => vec![
            Line::default(),
            Line::from(Span::styled(
                format!(
                    "  {} Analyzing your water situation{}",
                    spinner_char(state.tick_count),
                    loading_dots(state.tick_count)
                ),
                Style::default().fg(t.accent),
            )),
        ],
        OutputView::Error => {
            let mut lines = vec![
                Line::default(),
                Line::from(Span::styled(
                    "  Oops! Something went wrong.",
                    Style::default().fg(t.danger).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "  Please try submitting again.",
                    Style::default().fg(t.text_dim),
                )),
            ];
            if let Some(detail) = &result.last_error {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    format!("  {}", detail),
                    Style::default().fg(t.text_muted),
                )));
            }
            lines
        }
        OutputView::Ready => {
            let mut banner = vec![Span::styled(
                " ✔ Your personalized report is ready! ",
                Style::default()
                    .fg(t.bg_dark)
                    .bg(t.success)
                    .add_modifier(Modifier::BOLD),
            )];
            if let Some(at) = result.completed_at {
                banner.push(Span::styled(
                    format!("  {}", at.format("%H:%M:%S")),
                    Style::default().fg(t.text_muted),
                ));
            }
            let mut lines = vec![Line::from(banner), Line::default()];
            if let Some(text) = &result.report_text {
                lines.extend(render_markdown(text, inner_width, t));
            }
            lines
        }
        OutputView::Empty => vec![
            Line::default(),
            Line::from(Span::styled(
                "  Start by filling out the form.",
                Style::default().fg(t.text_dim),
            )),
        ],
    };

    let total = lines.len();
    let scroll = clamp_scroll(state.report_scroll, total, inner_height);
    let visible: Vec<Line> = lines.into_iter().skip(scroll).collect();
    frame.render_widget(Paragraph::new(visible).block(block), area);
    render_scrollbar_bordered(frame, area, total, scroll);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FormInputs;
    use crate::report::ReportError;
    use crate::ui::Theme;

    fn state() -> AppState {
        AppState::new(&FormInputs::default(), Theme::default(), "builtin")
    }

    #[test]
    fn output_view_follows_workflow() {
        let mut s = state();
        assert_eq!(output_view(&s), OutputView::Empty);

        let sub = s.submit().unwrap();
        assert_eq!(output_view(&s), OutputView::Loading);
        s.complete(sub.id, Ok("# Report".into()));
        assert_eq!(output_view(&s), OutputView::Ready);

        let sub = s.submit().unwrap();
        // Stale report is hidden behind the loading state
        assert_eq!(output_view(&s), OutputView::Loading);
        s.complete(sub.id, Err(ReportError::Empty));
        assert_eq!(output_view(&s), OutputView::Error);
    }

    #[test]
    fn cursor_spans_split_at_cursor() {
        let mut input = TextInput::new("Pune");
        input.cursor_left();
        let spans = input_spans(&input, true, Style::default());
        let parts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, vec!["Pun", "e", ""]);
    }

    #[test]
    fn cursor_at_end_shows_block() {
        let input = TextInput::new("Pune");
        let spans = input_spans(&input, true, Style::default());
        assert_eq!(spans[1].content.as_ref(), " ");
        assert_eq!(input_spans(&input, false, Style::default()).len(), 1);
    }
}
