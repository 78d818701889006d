//! Markdown report to styled terminal lines.
//!
//! Inline runs become word fragments carrying their style, and each block is
//! wrapped with textwrap's first-fit algorithm. Raw HTML is shown verbatim.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;

/// One word with its style and whether a space followed it.
#[derive(Debug, Clone)]
struct Word {
    text: String,
    style: Style,
    space_after: bool,
}

impl Fragment for Word {
    fn width(&self) -> f64 {
        UnicodeWidthStr::width(self.text.as_str()) as f64
    }

    fn whitespace_width(&self) -> f64 {
        if self.space_after {
            1.0
        } else {
            0.0
        }
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

struct Renderer<'t> {
    theme: &'t Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    words: Vec<Word>,
    styles: Vec<Style>,
    /// Ordered-list counters; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    /// Marker for the first line of the current list item.
    item_marker: Option<String>,
    in_code_block: bool,
}

impl<'t> Renderer<'t> {
    fn new(theme: &'t Theme, width: usize) -> Self {
        Self {
            theme,
            width: width.max(10),
            lines: Vec::new(),
            words: Vec::new(),
            styles: vec![Style::default().fg(theme.text_primary)],
            lists: Vec::new(),
            item_marker: None,
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, f: impl FnOnce(Style) -> Style) {
        let next = f(self.style());
        self.styles.push(next);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    /// Split text into words, joining onto the previous word when no space
    /// separates them.
    fn text(&mut self, text: &str) {
        let style = self.style();
        let mut current = String::new();
        for c in text.chars() {
            if c.is_whitespace() {
                if !current.is_empty() {
                    self.words.push(Word {
                        text: std::mem::take(&mut current),
                        style,
                        space_after: true,
                    });
                } else if let Some(last) = self.words.last_mut() {
                    last.space_after = true;
                }
            } else {
                current.push(c);
            }
        }
        if !current.is_empty() {
            self.words.push(Word {
                text: current,
                style,
                space_after: false,
            });
        }
    }

    fn indent(&self) -> usize {
        self.lists.len().saturating_sub(1) * 3
    }

    /// Wrap the pending words into lines.
    fn flush(&mut self) {
        if self.words.is_empty() {
            return;
        }
        let words = std::mem::take(&mut self.words);
        let marker = self.item_marker.take();
        let lead = self.indent() + marker.as_ref().map(|m| m.width()).unwrap_or(0);
        let available = self.width.saturating_sub(lead).max(1) as f64;

        for (i, line_words) in wrap_first_fit(&words, &[available]).into_iter().enumerate() {
            let mut spans = Vec::with_capacity(line_words.len() + 1);
            let prefix = match (&marker, i) {
                (Some(m), 0) => format!("{}{}", " ".repeat(self.indent()), m),
                _ => " ".repeat(lead),
            };
            if !prefix.is_empty() {
                spans.push(Span::styled(prefix, Style::default().fg(self.theme.accent)));
            }
            let last = line_words.len().saturating_sub(1);
            for (j, w) in line_words.iter().enumerate() {
                let text = if w.space_after && j < last {
                    format!("{} ", w.text)
                } else {
                    w.text.clone()
                };
                spans.push(Span::styled(text, w.style));
            }
            self.lines.push(Line::from(spans));
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                self.flush();
                let accent = self.theme.accent;
                self.push_style(|s| s.fg(accent).add_modifier(Modifier::BOLD));
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush();
                self.pop_style();
                self.lines.push(Line::default());
            }
            Event::End(TagEnd::Paragraph) => {
                self.flush();
                if self.lists.is_empty() {
                    self.lines.push(Line::default());
                }
            }
            Event::Start(Tag::List(start)) => {
                self.flush();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{}. ", n);
                        *n += 1;
                        m
                    }
                    _ => "• ".to_string(),
                };
                self.item_marker = Some(marker);
            }
            Event::End(TagEnd::Item) => self.flush(),
            Event::Start(Tag::Strong) => self.push_style(|s| s.add_modifier(Modifier::BOLD)),
            Event::Start(Tag::Emphasis) => self.push_style(|s| s.add_modifier(Modifier::ITALIC)),
            Event::End(TagEnd::Strong) | Event::End(TagEnd::Emphasis) => self.pop_style(),
            Event::Start(Tag::CodeBlock(_)) => {
                self.flush();
                self.in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.in_code_block = false;
                self.blank();
            }
            Event::Text(text) if self.in_code_block => {
                let style = Style::default().fg(self.theme.text_dim);
                for line in text.lines() {
                    self.lines.push(Line::from(Span::styled(format!("  {}", line), style)));
                }
            }
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                let style = Style::default().fg(self.theme.warning);
                self.words.push(Word {
                    text: code.to_string(),
                    style,
                    space_after: false,
                });
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak => {
                if let Some(last) = self.words.last_mut() {
                    last.space_after = true;
                }
            }
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                let rule = "─".repeat(self.width);
                self.lines
                    .push(Line::from(Span::styled(rule, Style::default().fg(self.theme.border))));
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Render markdown into lines no wider than `width` columns.
pub fn render_markdown(src: &str, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let mut r = Renderer::new(theme, width as usize);
    for event in Parser::new(src) {
        r.event(event);
    }
    r.finish()
}
