//! Memory graph source generation.

use std::fmt;
use std::sync::Arc;

use crate::constants::{CONCERNS_LABEL_CHARS, LABEL_ELLIPSIS};
use crate::models::WaterSource;
use crate::utils::take_chars;

use super::sanitize::sanitize;

/// Styling directives appended to every graph. Constant, never user-derived.
const STYLE_DIRECTIVES: &[&str] = &[
    "classDef default fill:#fff,stroke:#333,stroke-width:2px;",
    "class A,C fill:#e0f7fa,stroke:#00796b;",
    "class B,D fill:#e3f2fd,stroke:#1976d2;",
    "class E fill:#e8f5e9,stroke:#388e3c;",
    "class F,G fill:#f3e5f5,stroke:#7b1fa2;",
];

/// Edge statements of the memory graph.
const EDGES: &str = "A --> B & C; B & C --> D; D --> E; E --> F & G;";

/// Flowchart text describing one generation's memory graph.
///
/// Immutable and cheap to clone; the UI, the watch channel and the render
/// lifecycle all share the same allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagramSource(Arc<str>);

impl DiagramSource {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiagramSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Label text for the concerns node: first 30 characters plus the ellipsis,
/// sanitized after truncation.
///
/// The ellipsis is appended even when nothing was cut (including empty input).
pub fn concerns_label(concerns: &str) -> String {
    let prefix = take_chars(concerns, CONCERNS_LABEL_CHARS);
    sanitize(&format!("{}{}", prefix, LABEL_ELLIPSIS))
}

/// Build the memory graph for one submission.
///
/// `_water_source` is part of the signature so callers pass the whole
/// snapshot; the current template has no node for it.
pub fn generate(location: &str, _water_source: WaterSource, concerns: &str) -> DiagramSource {
    let location = sanitize(location);
    let concerns = concerns_label(concerns);

    let mut out = String::with_capacity(512 + location.len() + concerns.len());
    out.push_str("graph TD\n");
    out.push_str(&format!("    A[\"User Input<br/>Location: {}\"]\n", location));
    out.push_str("    B{\"Geo-Analysis\"}\n");
    out.push_str(&format!("    C[\"Concerns<br/>{}\"]\n", concerns));
    out.push_str("    D{\"AquaSentinel Engine\"}\n");
    out.push_str("    E[\"Output: Report\"]\n");
    out.push_str("    F(\"Next Step: Plan\")\n");
    out.push_str("    G(\"Next Step: Poster\")\n");
    out.push_str("    ");
    out.push_str(EDGES);
    out.push('\n');
    for directive in STYLE_DIRECTIVES {
        out.push_str("    ");
        out.push_str(directive);
        out.push('\n');
    }

    DiagramSource(Arc::from(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONCERNS: &str = "The water tastes salty and our children often get sick.";

    // ── concerns_label ────────────────────────────────────────────

    #[test]
    fn concerns_label_truncates_to_thirty_chars() {
        assert_eq!(concerns_label(CONCERNS), "The water tastes salty and our...");
    }

    #[test]
    fn concerns_label_short_text_still_gets_ellipsis() {
        assert_eq!(concerns_label("Smells bad"), "Smells bad...");
    }

    #[test]
    fn concerns_label_empty_is_just_ellipsis() {
        assert_eq!(concerns_label(""), "...");
    }

    #[test]
    fn concerns_label_sanitizes_after_truncation() {
        // Quote and semicolon count toward the 30 chars before escaping
        let label = concerns_label(r#"It says "safe"; it is not safe at all, really"#);
        assert_eq!(label, "It says &quotsafe&quot it is not safe...");
    }

    #[test]
    fn concerns_label_counts_chars_not_bytes() {
        let text = "ज".repeat(40);
        let label = concerns_label(&text);
        assert_eq!(label, format!("{}...", "ज".repeat(30)));
    }

    // ── generate ──────────────────────────────────────────────────

    #[test]
    fn generate_contains_location_and_label() {
        let src = generate("Chhattisgarh", WaterSource::Borewell, CONCERNS);
        let s = src.as_str();
        assert!(s.starts_with("graph TD\n"));
        assert!(s.contains("Location: Chhattisgarh"));
        assert!(s.contains("Concerns<br/>The water tastes salty and our..."));
    }

    #[test]
    fn generate_is_idempotent() {
        let a = generate("Pune", WaterSource::Handpump, "Rusty taste");
        let b = generate("Pune", WaterSource::Handpump, "Rusty taste");
        assert_eq!(a, b);
    }

    #[test]
    fn generate_escapes_user_fields() {
        let src = generate(r#"Pune"; X"#, WaterSource::Other, r#"a";b"#);
        let s = src.as_str();
        assert!(s.contains("Location: Pune&quot X\"]"));
        assert!(s.contains("Concerns<br/>a&quotb...\"]"));
    }

    #[test]
    fn generate_quote_count_independent_of_input() {
        // Fourteen quotes delimit the seven labels, whatever the user typed
        for (loc, concerns) in [
            ("Chhattisgarh", CONCERNS),
            ("\"\"\"", "\";\";\""),
            ("", ""),
        ] {
            let src = generate(loc, WaterSource::Borewell, concerns);
            assert_eq!(src.as_str().matches('"').count(), 14);
        }
    }

    #[test]
    fn generate_statement_count_independent_of_input() {
        let baseline = generate("x", WaterSource::Borewell, "y")
            .as_str()
            .matches(';')
            .count();
        let hostile = generate(";;;;", WaterSource::Borewell, "a;b;c;d;e")
            .as_str()
            .matches(';')
            .count();
        assert_eq!(baseline, hostile);
        assert_eq!(baseline, 9);
    }

    #[test]
    fn generate_ignores_water_source() {
        let a = generate("x", WaterSource::Borewell, "y");
        let b = generate("x", WaterSource::RiverStream, "y");
        assert_eq!(a, b);
    }

    #[test]
    fn generate_styles_are_constant() {
        let src = generate("x", WaterSource::Borewell, "y");
        for directive in STYLE_DIRECTIVES {
            assert!(src.as_str().contains(directive));
        }
    }
}
