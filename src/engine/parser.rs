//! Parser for the flowchart subset the memory graph uses.
//!
//! Supported statements: `graph <dir>` / `flowchart <dir>` header, node
//! declarations (`A["box"]`, `B{"decision"}`, `C("rounded")`, bare `D`),
//! edge chains with `&` groups (`A --> B & C --> D`), `classDef` and inline
//! `class <ids> <styles>`. Statements end at `;` or a newline outside quotes.

use std::collections::HashMap;

use super::RenderError;
use crate::diagram::QUOTE_ENTITY;

/// Flow direction from the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    TopDown,
    BottomUp,
    LeftRight,
    RightLeft,
}

impl FlowDirection {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TD" | "TB" => Some(FlowDirection::TopDown),
            "BT" => Some(FlowDirection::BottomUp),
            "LR" => Some(FlowDirection::LeftRight),
            "RL" => Some(FlowDirection::RightLeft),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Box,
    Decision,
    Rounded,
}

/// Visual style collected from `classDef` / `class` directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStyle {
    pub fill: Option<String>,
    pub stroke: Option<String>,
}

impl NodeStyle {
    /// Parse `fill:#fff,stroke:#333,stroke-width:2px`. Unknown keys are ignored.
    fn parse(s: &str) -> Self {
        let mut style = NodeStyle::default();
        for part in s.split(',') {
            if let Some((key, value)) = part.split_once(':') {
                match key.trim() {
                    "fill" => style.fill = Some(value.trim().to_string()),
                    "stroke" => style.stroke = Some(value.trim().to_string()),
                    _ => {}
                }
            }
        }
        style
    }

    fn overlay(&mut self, other: &NodeStyle) {
        if other.fill.is_some() {
            self.fill = other.fill.clone();
        }
        if other.stroke.is_some() {
            self.stroke = other.stroke.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    pub id: String,
    /// Display label with entities decoded and `<br/>` turned into newlines.
    pub label: String,
    pub shape: NodeShape,
    pub style: NodeStyle,
}

/// Parsed flowchart. Edges index into `nodes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flowchart {
    pub direction: FlowDirection,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<(usize, usize)>,
    pub default_style: NodeStyle,
}

impl Flowchart {
    #[cfg(test)]
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Split `s` at every occurrence of `pat` that is not inside double quotes.
fn split_outside_quotes<'a>(s: &'a str, pat: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut in_quote = false;
    let mut start = 0;
    let mut i = 0;
    while i < s.len() {
        let rest = &s[i..];
        if rest.starts_with('"') {
            in_quote = !in_quote;
        } else if !in_quote && rest.starts_with(pat) {
            parts.push(&s[start..i]);
            i += pat.len();
            start = i;
            continue;
        }
        i += rest.chars().next().map(char::len_utf8).unwrap_or(1);
    }
    parts.push(&s[start..]);
    parts
}

/// Break source text into trimmed, non-empty statements.
fn statements(src: &str) -> Result<Vec<&str>, RenderError> {
    let mut out = Vec::new();
    let mut in_quote = false;
    let mut start = 0;
    for (i, c) in src.char_indices() {
        match c {
            '"' => in_quote = !in_quote,
            ';' | '\n' if !in_quote => {
                out.push(&src[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if in_quote {
        return Err(RenderError::Syntax {
            statement: out.len() + 1,
            message: "unterminated quoted label".to_string(),
        });
    }
    out.push(&src[start..]);
    Ok(out
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.starts_with("%%"))
        .collect())
}

/// Decode the escapes the memory graph writes into labels.
fn decode_label(raw: &str) -> String {
    raw.replace("<br/>", "\n")
        .replace("<br>", "\n")
        .replace("&quot;", "\"")
        .replace(QUOTE_ENTITY, "\"")
}

/// Parse `ID`, `ID["label"]`, `ID{"label"}` or `ID("label")`.
fn parse_node_ref(
    s: &str,
    statement: usize,
) -> Result<(String, Option<(String, NodeShape)>), RenderError> {
    let s = s.trim();
    let id_end = s
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '-'))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let id = &s[..id_end];
    if id.is_empty() {
        return Err(RenderError::Syntax {
            statement,
            message: format!("expected node id in `{}`", s),
        });
    }
    let rest = s[id_end..].trim();
    if rest.is_empty() {
        return Ok((id.to_string(), None));
    }

    let (shape, close) = match rest.chars().next() {
        Some('[') => (NodeShape::Box, ']'),
        Some('{') => (NodeShape::Decision, '}'),
        Some('(') => (NodeShape::Rounded, ')'),
        _ => {
            return Err(RenderError::Syntax {
                statement,
                message: format!("unexpected `{}` after node `{}`", rest, id),
            })
        }
    };
    if !rest.ends_with(close) || rest.len() < 2 {
        return Err(RenderError::Syntax {
            statement,
            message: format!("node `{}` is missing its closing `{}`", id, close),
        });
    }
    let inner = rest[1..rest.len() - 1].trim();
    let inner = inner
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(inner);

    Ok((id.to_string(), Some((decode_label(inner), shape))))
}

#[derive(Default)]
struct Builder {
    nodes: Vec<FlowNode>,
    index: HashMap<String, usize>,
    edges: Vec<(usize, usize)>,
    class_styles: Vec<(String, NodeStyle)>,
}

impl Builder {
    /// Look up or create a node; a label, when given, overrides the default.
    fn node(&mut self, id: String, decl: Option<(String, NodeShape)>) -> usize {
        let idx = match self.index.get(&id) {
            Some(&idx) => idx,
            None => {
                let idx = self.nodes.len();
                self.nodes.push(FlowNode {
                    id: id.clone(),
                    label: id.clone(),
                    shape: NodeShape::Box,
                    style: NodeStyle::default(),
                });
                self.index.insert(id, idx);
                idx
            }
        };
        if let Some((label, shape)) = decl {
            self.nodes[idx].label = label;
            self.nodes[idx].shape = shape;
        }
        idx
    }

    fn edge_chain(&mut self, stmt: &str, statement: usize) -> Result<(), RenderError> {
        let mut previous: Vec<usize> = Vec::new();
        for (step, group) in split_outside_quotes(stmt, "-->").into_iter().enumerate() {
            let mut current = Vec::new();
            for member in split_outside_quotes(group, "&") {
                let (id, decl) = parse_node_ref(member, statement)?;
                current.push(self.node(id, decl));
            }
            if step > 0 {
                for &from in &previous {
                    for &to in &current {
                        self.edges.push((from, to));
                    }
                }
            }
            previous = current;
        }
        Ok(())
    }
}

/// Parse flowchart source text.
pub fn parse(src: &str) -> Result<Flowchart, RenderError> {
    let stmts = statements(src)?;
    let mut iter = stmts.into_iter();

    let header = iter.next().ok_or(RenderError::EmptyContainer)?;
    let mut words = header.split_whitespace();
    let keyword = words.next().unwrap_or_default();
    if keyword != "graph" && keyword != "flowchart" {
        return Err(RenderError::Syntax {
            statement: 1,
            message: format!("expected `graph` header, found `{}`", keyword),
        });
    }
    let direction = match words.next() {
        Some(d) => FlowDirection::parse(d).ok_or_else(|| RenderError::Syntax {
            statement: 1,
            message: format!("unknown direction `{}`", d),
        })?,
        None => FlowDirection::TopDown,
    };

    let mut b = Builder::default();
    let mut default_style = NodeStyle::default();

    for (i, stmt) in iter.enumerate() {
        let statement = i + 2;
        if let Some(rest) = stmt.strip_prefix("classDef ") {
            let (name, styles) = rest.trim().split_once(char::is_whitespace).unwrap_or((rest, ""));
            // Only the default class is honoured; `:::name` assignments are unsupported
            if name == "default" {
                default_style.overlay(&NodeStyle::parse(styles.trim()));
            }
        } else if let Some(rest) = stmt.strip_prefix("class ") {
            let (ids, styles) = rest.trim().split_once(char::is_whitespace).unwrap_or((rest, ""));
            let style = NodeStyle::parse(styles.trim());
            for id in ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                b.class_styles.push((id.to_string(), style.clone()));
            }
        } else if split_outside_quotes(stmt, "-->").len() > 1 {
            b.edge_chain(stmt, statement)?;
        } else {
            let (id, decl) = parse_node_ref(stmt, statement)?;
            b.node(id, decl);
        }
    }

    // Class assignments may precede or follow the node declarations
    let class_styles = std::mem::take(&mut b.class_styles);
    for (id, style) in &class_styles {
        if let Some(&idx) = b.index.get(id) {
            b.nodes[idx].style.overlay(style);
        }
    }

    Ok(Flowchart {
        direction,
        nodes: b.nodes,
        edges: b.edges,
        default_style,
    })
}
