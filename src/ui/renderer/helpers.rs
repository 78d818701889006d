//! Shared rendering helpers: panel blocks, scrollbar, centered rect.

use ratatui::{
    layout::{Margin, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use crate::ui::theme::Theme;

/// Bordered panel with a titled top edge.
pub fn panel<'a>(title: &'a str, t: &Theme, highlighted: bool) -> Block<'a> {
    let border = if highlighted {
        t.border_highlight_style()
    } else {
        t.border_style()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Line::from(Span::styled(format!(" {} ", title), t.header_style())))
}

/// Render a vertical scrollbar inside a bordered area (1px vertical margin).
///
/// Only renders if `total` exceeds the inner height.
pub fn render_scrollbar_bordered(frame: &mut Frame, area: Rect, total: usize, position: usize) {
    let visible_height = area.height.saturating_sub(2) as usize;
    if total <= visible_height {
        return;
    }
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("▲"))
        .end_symbol(Some("▼"));
    let mut scrollbar_state = ScrollbarState::new(total).position(position);
    frame.render_stateful_widget(
        scrollbar,
        area.inner(Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut scrollbar_state,
    );
}

/// Return a `Rect` centered within `area` with the given dimensions.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Clamp a scroll offset so the last page stays full.
pub fn clamp_scroll(scroll: usize, total: usize, visible: usize) -> usize {
    scroll.min(total.saturating_sub(visible))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── centered_rect ─────────────────────────────────────────────

    #[test]
    fn centered_rect_normal() {
        let area = Rect::new(0, 0, 100, 50);
        let r = centered_rect(40, 20, area);
        assert_eq!((r.x, r.y, r.width, r.height), (30, 15, 40, 20));
    }

    #[test]
    fn centered_rect_larger_than_area() {
        let area = Rect::new(0, 0, 20, 10);
        let r = centered_rect(40, 30, area);
        // Width/height clamped to area
        assert_eq!((r.x, r.y, r.width, r.height), (0, 0, 20, 10));
    }

    #[test]
    fn centered_rect_with_offset_area() {
        let area = Rect::new(10, 5, 80, 40);
        let r = centered_rect(20, 10, area);
        assert_eq!(r.x, 40); // 10 + (80 - 20) / 2
        assert_eq!(r.y, 20); // 5 + (40 - 10) / 2
    }

    // ── clamp_scroll ──────────────────────────────────────────────

    #[test]
    fn clamp_scroll_keeps_last_page_full() {
        assert_eq!(clamp_scroll(50, 30, 10), 20);
        assert_eq!(clamp_scroll(5, 30, 10), 5);
        assert_eq!(clamp_scroll(5, 4, 10), 0);
    }
}
