use crate::diagram::DiagramSource;

/// One styled run of text in a rendered diagram line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSpan {
    pub text: String,
    /// Hex stroke colour from the diagram's style directives, if any.
    pub stroke: Option<String>,
    pub bold: bool,
}

impl DiagramSpan {
    pub fn plain(text: String) -> Self {
        Self {
            text,
            stroke: None,
            bold: false,
        }
    }
}

/// One terminal row of a rendered diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramLine {
    pub spans: Vec<DiagramSpan>,
}

impl DiagramLine {
    /// Concatenated text of all spans.
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Engine output stored in a container after a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub lines: Vec<DiagramLine>,
    /// Widest line, in terminal columns.
    pub width: usize,
    pub node_count: usize,
    pub edge_count: usize,
}

/// The element the diagram engine renders into.
///
/// Mirrors a DOM node: its content is replaced wholesale by `set_source`, the
/// engine writes its output back in place, and it carries a processed marker
/// that makes the engine skip it until the marker is cleared.
#[derive(Debug, Clone, Default)]
pub struct GraphContainer {
    source: Option<DiagramSource>,
    rendered: Option<RenderedDiagram>,
    processed: bool,
    attached: bool,
}

impl GraphContainer {
    pub fn source(&self) -> Option<&DiagramSource> {
        self.source.as_ref()
    }

    pub fn rendered(&self) -> Option<&RenderedDiagram> {
        self.rendered.as_ref()
    }

    /// Replace the content with raw diagram source, discarding any output.
    pub fn set_source(&mut self, source: DiagramSource) {
        self.source = Some(source);
        self.rendered = None;
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn clear_processed(&mut self) {
        self.processed = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Store engine output and mark the container processed.
    pub(crate) fn finish_render(&mut self, rendered: RenderedDiagram) {
        self.rendered = Some(rendered);
        self.processed = true;
    }
}

/// Retained view backing the Graph tab.
///
/// Survives tab switches so a diagram rendered once is shown again without
/// re-running the engine. It is detached while another tab is active.
#[derive(Debug, Clone, Default)]
pub struct GraphView {
    container: GraphContainer,
    /// Last engine failure, shown in place of the diagram.
    pub render_error: Option<String>,
    pub scroll: usize,
}

impl GraphView {
    /// The container, if the view is currently mounted.
    pub fn locate_container(&mut self) -> Option<&mut GraphContainer> {
        if self.container.attached {
            Some(&mut self.container)
        } else {
            None
        }
    }

    pub fn container(&self) -> &GraphContainer {
        &self.container
    }

    pub fn set_attached(&mut self, attached: bool) {
        self.container.attached = attached;
    }

    #[cfg(test)]
    pub fn is_attached(&self) -> bool {
        self.container.attached
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max = self
            .container
            .rendered
            .as_ref()
            .map(|r| r.lines.len().saturating_sub(1))
            .unwrap_or(0);
        if self.scroll < max {
            self.scroll += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::generate;
    use crate::models::WaterSource;

    fn source() -> DiagramSource {
        generate("Pune", WaterSource::Borewell, "Muddy")
    }

    #[test]
    fn set_source_discards_previous_output() {
        let mut c = GraphContainer::default();
        c.finish_render(RenderedDiagram::default());
        assert!(c.rendered().is_some());
        c.set_source(source());
        assert!(c.rendered().is_none());
        assert_eq!(c.source(), Some(&source()));
    }

    #[test]
    fn finish_render_sets_processed_marker() {
        let mut c = GraphContainer::default();
        assert!(!c.is_processed());
        c.finish_render(RenderedDiagram::default());
        assert!(c.is_processed());
        c.clear_processed();
        assert!(!c.is_processed());
    }

    #[test]
    fn detached_view_hides_container() {
        let mut v = GraphView::default();
        assert!(v.locate_container().is_none());
        v.set_attached(true);
        assert!(v.locate_container().is_some());
        v.set_attached(false);
        assert!(v.locate_container().is_none());
    }

    #[test]
    fn scroll_bounded_by_rendered_lines() {
        let mut v = GraphView::default();
        v.scroll_down();
        assert_eq!(v.scroll, 0);
        v.container.finish_render(RenderedDiagram {
            lines: vec![DiagramLine::default(); 3],
            ..Default::default()
        });
        v.scroll_down();
        v.scroll_down();
        v.scroll_down();
        assert_eq!(v.scroll, 2);
        v.scroll_up();
        assert_eq!(v.scroll, 1);
    }
}
