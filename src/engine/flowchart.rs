//! Terminal flowchart renderer: layered boxes joined by connector rows.

use unicode_width::UnicodeWidthStr;

use super::parser::{parse, FlowDirection, Flowchart, NodeShape};
use super::{
    engine_config, initialize, DiagramEngine, DiagramLine, DiagramSpan, EngineConfig,
    EngineTheme, GraphContainer, RenderError, RenderedDiagram,
};
use crate::constants::{MIN_NODE_BOX_WIDTH, NODE_BOX_GAP};

/// Glyph set for one box shape.
struct BoxGlyphs {
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
    horizontal: char,
    vertical: char,
}

/// Glyphs for connector rows between layers.
struct EdgeGlyphs {
    vertical: char,
    horizontal: char,
    tee_up: char,
    tee_down: char,
    cross: char,
    arrow: char,
}

fn box_glyphs(shape: NodeShape, ascii: bool) -> BoxGlyphs {
    let (tl, tr, bl, br, h, v) = match (shape, ascii) {
        (NodeShape::Box, false) => ('┌', '┐', '└', '┘', '─', '│'),
        (NodeShape::Rounded, false) => ('╭', '╮', '╰', '╯', '─', '│'),
        (NodeShape::Decision, false) => ('╔', '╗', '╚', '╝', '═', '║'),
        (NodeShape::Box, true) => ('+', '+', '+', '+', '-', '|'),
        (NodeShape::Rounded, true) => ('.', '.', '\'', '\'', '-', '|'),
        (NodeShape::Decision, true) => ('/', '\\', '\\', '/', '=', '|'),
    };
    BoxGlyphs {
        top_left: tl,
        top_right: tr,
        bottom_left: bl,
        bottom_right: br,
        horizontal: h,
        vertical: v,
    }
}

fn edge_glyphs(ascii: bool) -> EdgeGlyphs {
    if ascii {
        EdgeGlyphs {
            vertical: '|',
            horizontal: '-',
            tee_up: '+',
            tee_down: '+',
            cross: '+',
            arrow: 'v',
        }
    } else {
        EdgeGlyphs {
            vertical: '│',
            horizontal: '─',
            tee_up: '┴',
            tee_down: '┬',
            cross: '┼',
            arrow: '▼',
        }
    }
}

/// A node drawn as a box, before placement.
struct NodeBox {
    lines: Vec<String>,
    width: usize,
    stroke: Option<String>,
}

fn draw_box(label: &str, shape: NodeShape, stroke: Option<String>, ascii: bool) -> NodeBox {
    let g = box_glyphs(shape, ascii);
    let label_lines: Vec<&str> = label.lines().collect();
    let label_lines = if label_lines.is_empty() {
        vec![""]
    } else {
        label_lines
    };
    let content = label_lines
        .iter()
        .map(|l| UnicodeWidthStr::width(*l))
        .max()
        .unwrap_or(0)
        .max(MIN_NODE_BOX_WIDTH);
    let inner = content + 2;

    let mut lines = Vec::with_capacity(label_lines.len() + 2);
    let rule: String = std::iter::repeat(g.horizontal).take(inner).collect();
    lines.push(format!("{}{}{}", g.top_left, rule, g.top_right));
    for l in label_lines {
        let pad = content - UnicodeWidthStr::width(l);
        let left = pad / 2;
        lines.push(format!(
            "{} {}{}{} {}",
            g.vertical,
            " ".repeat(left),
            l,
            " ".repeat(pad - left),
            g.vertical
        ));
    }
    lines.push(format!("{}{}{}", g.bottom_left, rule, g.bottom_right));

    NodeBox {
        lines,
        width: inner + 2,
        stroke,
    }
}

/// Longest-path layering from the sources. Cycles are cut off after `n` rounds.
fn layer_ranks(chart: &Flowchart) -> Vec<usize> {
    let n = chart.nodes.len();
    let mut rank = vec![0usize; n];
    for _ in 0..n {
        let mut changed = false;
        for &(from, to) in &chart.edges {
            if from != to && rank[to] < rank[from] + 1 && rank[from] + 1 < n {
                rank[to] = rank[from] + 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    rank
}

/// Where each node of a layer landed, in columns.
struct Placed {
    node: usize,
    x: usize,
    width: usize,
}

impl Placed {
    fn center(&self) -> usize {
        self.x + self.width / 2
    }
}

/// Lay out and draw a parsed chart.
fn draw(chart: &Flowchart, config: &EngineConfig) -> RenderedDiagram {
    let colour = |s: &Option<String>| match config.theme {
        EngineTheme::Neutral => s.clone(),
        EngineTheme::Plain => None,
    };
    let default_stroke = colour(&chart.default_style.stroke);

    let boxes: Vec<NodeBox> = chart
        .nodes
        .iter()
        .map(|n| {
            let stroke = colour(&n.style.stroke).or_else(|| default_stroke.clone());
            draw_box(&n.label, n.shape, stroke, config.ascii)
        })
        .collect();

    let ranks = layer_ranks(chart);
    let depth = ranks.iter().copied().max().map(|m| m + 1).unwrap_or(0);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); depth];
    for (node, &rank) in ranks.iter().enumerate() {
        layers[rank].push(node);
    }
    if chart.direction == FlowDirection::BottomUp {
        layers.reverse();
    }

    let layer_width = |layer: &[usize]| -> usize {
        let boxes_width: usize = layer.iter().map(|&i| boxes[i].width).sum();
        boxes_width + NODE_BOX_GAP * layer.len().saturating_sub(1)
    };
    let total_width = layers.iter().map(|l| layer_width(l)).max().unwrap_or(0);

    let placed: Vec<Vec<Placed>> = layers
        .iter()
        .map(|layer| {
            let mut x = (total_width - layer_width(layer)) / 2;
            layer
                .iter()
                .map(|&node| {
                    let p = Placed {
                        node,
                        x,
                        width: boxes[node].width,
                    };
                    x += boxes[node].width + NODE_BOX_GAP;
                    p
                })
                .collect()
        })
        .collect();

    let edges = edge_glyphs(config.ascii);
    let mut lines: Vec<DiagramLine> = Vec::new();

    for (li, layer) in placed.iter().enumerate() {
        let height = layer
            .iter()
            .map(|p| boxes[p.node].lines.len())
            .max()
            .unwrap_or(0);
        for row in 0..height {
            let mut spans = Vec::new();
            let mut col = 0;
            for p in layer {
                if p.x > col {
                    spans.push(DiagramSpan::plain(" ".repeat(p.x - col)));
                }
                let b = &boxes[p.node];
                let text = b
                    .lines
                    .get(row)
                    .cloned()
                    .unwrap_or_else(|| " ".repeat(b.width));
                spans.push(DiagramSpan {
                    text,
                    stroke: b.stroke.clone(),
                    bold: chart.nodes[p.node].shape == NodeShape::Decision,
                });
                col = p.x + p.width;
            }
            lines.push(DiagramLine { spans });
        }

        if let Some(next) = placed.get(li + 1) {
            lines.extend(connector_rows(chart, layer, next, total_width, &edges, &default_stroke));
        }
    }

    RenderedDiagram {
        lines,
        width: total_width,
        node_count: chart.nodes.len(),
        edge_count: chart.edges.len(),
    }
}

/// Three rows joining `upper` to `lower`: drops, a bus, and arrowheads.
fn connector_rows(
    chart: &Flowchart,
    upper: &[Placed],
    lower: &[Placed],
    width: usize,
    g: &EdgeGlyphs,
    stroke: &Option<String>,
) -> Vec<DiagramLine> {
    let links = |from: usize, to: usize| {
        chart
            .edges
            .iter()
            .any(|&(a, b)| (a == from && b == to) || (a == to && b == from))
    };
    let sources: Vec<usize> = upper
        .iter()
        .filter(|u| lower.iter().any(|l| links(u.node, l.node)))
        .map(Placed::center)
        .collect();
    let targets: Vec<usize> = lower
        .iter()
        .filter(|l| upper.iter().any(|u| links(u.node, l.node)))
        .map(Placed::center)
        .collect();
    if sources.is_empty() || targets.is_empty() {
        return vec![DiagramLine::default()];
    }

    let mut drops = vec![' '; width];
    let mut bus = vec![' '; width];
    let mut arrows = vec![' '; width];

    for &c in &sources {
        drops[c] = g.vertical;
    }
    for &c in &targets {
        arrows[c] = g.arrow;
    }

    let lo = sources.iter().chain(&targets).copied().min().unwrap_or(0);
    let hi = sources.iter().chain(&targets).copied().max().unwrap_or(0);
    for (c, cell) in bus.iter_mut().enumerate().take(hi + 1).skip(lo) {
        let up = sources.contains(&c);
        let down = targets.contains(&c);
        *cell = match (up, down) {
            (true, true) => {
                if lo == hi {
                    g.vertical
                } else {
                    g.cross
                }
            }
            (true, false) => g.tee_up,
            (false, true) => g.tee_down,
            (false, false) => g.horizontal,
        };
    }

    [drops, bus, arrows]
        .into_iter()
        .map(|row| {
            let text: String = row.into_iter().collect();
            DiagramLine {
                spans: vec![DiagramSpan {
                    text: text.trim_end().to_string(),
                    stroke: stroke.clone(),
                    bold: false,
                }],
            }
        })
        .collect()
}

/// Built-in diagram engine for the Graph tab.
#[derive(Debug, Default)]
pub struct FlowchartEngine;

impl FlowchartEngine {
    pub fn new() -> Self {
        Self
    }
}

impl DiagramEngine for FlowchartEngine {
    fn initialize(&mut self, config: EngineConfig) {
        initialize(config);
    }

    fn run(&mut self, nodes: &mut [&mut GraphContainer]) -> Result<(), RenderError> {
        let config = engine_config().ok_or(RenderError::NotInitialized)?;
        for container in nodes.iter_mut() {
            if container.is_processed() {
                continue;
            }
            if !container.is_attached() {
                return Err(RenderError::Detached);
            }
            let source = container.source().ok_or(RenderError::EmptyContainer)?;
            let chart = parse(source.as_str())?;
            let rendered = draw(&chart, config);
            tracing::debug!(
                nodes = rendered.node_count,
                edges = rendered.edge_count,
                width = rendered.width,
                "flowchart rendered"
            );
            container.finish_render(rendered);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::generate;
    use crate::engine::GraphView;
    use crate::models::WaterSource;

    fn neutral() -> EngineConfig {
        EngineConfig::default()
    }

    fn chart(src: &str) -> Flowchart {
        parse(src).unwrap()
    }

    fn text(r: &RenderedDiagram) -> String {
        r.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ── draw_box ──────────────────────────────────────────────────

    #[test]
    fn box_has_uniform_width() {
        let b = draw_box("short\na much longer line", NodeShape::Box, None, false);
        let widths: Vec<usize> = b.lines.iter().map(|l| UnicodeWidthStr::width(l.as_str())).collect();
        assert!(widths.iter().all(|&w| w == b.width));
        assert_eq!(b.lines.len(), 4);
    }

    #[test]
    fn box_respects_minimum_width() {
        let b = draw_box("x", NodeShape::Rounded, None, false);
        assert_eq!(b.width, MIN_NODE_BOX_WIDTH + 4);
        assert!(b.lines[0].starts_with('╭'));
    }

    #[test]
    fn box_ascii_glyphs() {
        let b = draw_box("x", NodeShape::Box, None, true);
        assert!(b.lines[0].starts_with('+'));
        assert!(b.lines.iter().all(|l| l.is_ascii()));
    }

    #[test]
    fn box_measures_wide_characters() {
        let b = draw_box("水水水水水水", NodeShape::Box, None, false);
        // Six double-width characters occupy twelve columns
        assert_eq!(b.width, 12 + 4);
    }

    // ── layering ──────────────────────────────────────────────────

    #[test]
    fn ranks_follow_longest_path() {
        let c = chart("graph TD\nA --> B --> C\nA --> C");
        assert_eq!(layer_ranks(&c), vec![0, 1, 2]);
    }

    #[test]
    fn ranks_survive_cycles() {
        let c = chart("graph TD\nA --> B --> A");
        let r = layer_ranks(&c);
        assert!(r.iter().all(|&x| x < 2));
    }

    #[test]
    fn memory_graph_has_five_layers() {
        let src = generate("Chhattisgarh", WaterSource::Borewell, "Salty");
        let c = chart(src.as_str());
        let ranks = layer_ranks(&c);
        // A | B C | D | E | F G
        assert_eq!(ranks, vec![0, 1, 1, 2, 3, 4, 4]);
    }

    // ── draw ──────────────────────────────────────────────────────

    #[test]
    fn draw_memory_graph_shows_labels_and_arrows() {
        let src = generate(
            "Chhattisgarh",
            WaterSource::Borewell,
            "The water tastes salty and our children often get sick.",
        );
        let r = draw(&chart(src.as_str()), &neutral());
        let t = text(&r);
        assert!(t.contains("Location: Chhattisgarh"));
        assert!(t.contains("The water tastes salty and our..."));
        assert!(t.contains("AquaSentinel Engine"));
        assert!(t.contains("Next Step: Poster"));
        // B C, D, E, F G
        assert_eq!(t.matches('▼').count(), 6);
        assert_eq!(r.node_count, 7);
        assert_eq!(r.edge_count, 7);
    }

    #[test]
    fn draw_decodes_escaped_quotes() {
        let src = generate(r#"the "old" well"#, WaterSource::Borewell, "x");
        let r = draw(&chart(src.as_str()), &neutral());
        assert!(text(&r).contains(r#"Location: the "old" well"#));
    }

    #[test]
    fn draw_uses_stroke_colours_unless_plain() {
        let src = generate("x", WaterSource::Borewell, "y");
        let c = chart(src.as_str());
        let r = draw(&c, &neutral());
        assert!(r
            .lines
            .iter()
            .flat_map(|l| &l.spans)
            .any(|s| s.stroke.as_deref() == Some("#00796b")));

        let plain = EngineConfig {
            theme: EngineTheme::Plain,
            ..EngineConfig::default()
        };
        let r = draw(&c, &plain);
        assert!(r.lines.iter().flat_map(|l| &l.spans).all(|s| s.stroke.is_none()));
    }

    #[test]
    fn draw_lines_fit_reported_width() {
        let src = generate("Somewhere with a rather long name", WaterSource::Borewell, "y");
        let r = draw(&chart(src.as_str()), &neutral());
        for line in &r.lines {
            assert!(UnicodeWidthStr::width(line.text().as_str()) <= r.width);
        }
    }

    #[test]
    fn draw_empty_chart() {
        let r = draw(&chart("graph TD"), &neutral());
        assert!(r.lines.is_empty());
        assert_eq!(r.width, 0);
    }

    // ── engine ────────────────────────────────────────────────────

    #[test]
    fn run_renders_attached_container() {
        let mut engine = FlowchartEngine::new();
        engine.initialize(EngineConfig::default());
        let mut view = GraphView::default();
        view.set_attached(true);
        let container = view.locate_container().unwrap();
        container.set_source(generate("Pune", WaterSource::Handpump, "Rusty"));
        engine.run(&mut [container]).unwrap();
        let c = view.container();
        assert!(c.is_processed());
        assert!(text(c.rendered().unwrap()).contains("Location: Pune"));
    }

    #[test]
    fn run_skips_processed_container() {
        let mut engine = FlowchartEngine::new();
        engine.initialize(EngineConfig::default());
        let mut view = GraphView::default();
        view.set_attached(true);
        let container = view.locate_container().unwrap();
        container.set_source(generate("Pune", WaterSource::Handpump, "Rusty"));
        engine.run(&mut [&mut *container]).unwrap();

        // New content without clearing the marker is left alone
        container.set_source(generate("Delhi", WaterSource::Handpump, "Rusty"));
        engine.run(&mut [&mut *container]).unwrap();
        assert!(container.rendered().is_none());

        container.clear_processed();
        engine.run(&mut [&mut *container]).unwrap();
        assert!(text(container.rendered().unwrap()).contains("Location: Delhi"));
    }

    #[test]
    fn run_rejects_detached_container() {
        let mut engine = FlowchartEngine::new();
        engine.initialize(EngineConfig::default());
        let mut container = GraphContainer::default();
        container.set_source(generate("Pune", WaterSource::Handpump, "Rusty"));
        assert_eq!(engine.run(&mut [&mut container]), Err(RenderError::Detached));
    }

    #[test]
    fn run_reports_empty_container() {
        let mut engine = FlowchartEngine::new();
        engine.initialize(EngineConfig::default());
        let mut view = GraphView::default();
        view.set_attached(true);
        let container = view.locate_container().unwrap();
        assert_eq!(engine.run(&mut [container]), Err(RenderError::EmptyContainer));
    }
}
