use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

use crate::constants::custom_theme_path;

/// All available built-in theme names.
pub const BUILTIN_THEME_NAMES: &[&str] = &["default", "lagoon", "gruvbox", "nord", "solarized"];

/// Data-driven theme: every color in one struct.
/// Constructed from built-in presets or loaded from TOML files.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // ── Brand / Primary ──────────────────────────────────────
    pub accent: Color,
    pub accent_secondary: Color,
    pub bg_dark: Color,
    pub bg_panel: Color,

    // ── Text ─────────────────────────────────────────────────
    pub text_primary: Color,
    pub text_dim: Color,
    pub text_muted: Color,

    // ── Semantic ─────────────────────────────────────────────
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub info: Color,

    // ── Form ─────────────────────────────────────────────────
    pub input_bg: Color,
    pub border: Color,

    // ── Memory graph ─────────────────────────────────────────
    /// Used for diagram glyphs without a stroke colour.
    pub diagram_line: Color,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────

    /// Default dark theme.
    pub fn default_dark() -> Self {
        Self {
            name: "default".to_string(),
            accent: Color::Rgb(56, 189, 248),
            accent_secondary: Color::Rgb(45, 212, 191),
            bg_dark: Color::Rgb(17, 24, 39),
            bg_panel: Color::Rgb(31, 41, 55),
            text_primary: Color::Rgb(229, 231, 235),
            text_dim: Color::Rgb(156, 163, 175),
            text_muted: Color::Rgb(107, 114, 128),
            success: Color::Rgb(74, 222, 128),
            warning: Color::Rgb(250, 204, 21),
            danger: Color::Rgb(248, 113, 113),
            info: Color::Rgb(96, 165, 250),
            input_bg: Color::Rgb(39, 50, 68),
            border: Color::Rgb(55, 65, 81),
            diagram_line: Color::Rgb(156, 163, 175),
        }
    }

    /// Teal-on-navy palette after the water-report banner colours.
    pub fn lagoon() -> Self {
        Self {
            name: "lagoon".to_string(),
            accent: Color::Rgb(0, 150, 136),             // teal 500
            accent_secondary: Color::Rgb(128, 222, 234), // cyan 200
            bg_dark: Color::Rgb(6, 30, 41),
            bg_panel: Color::Rgb(10, 44, 58),
            text_primary: Color::Rgb(224, 247, 250), // cyan 50
            text_dim: Color::Rgb(128, 203, 196),     // teal 200
            text_muted: Color::Rgb(77, 128, 132),
            success: Color::Rgb(102, 187, 106), // green 400
            warning: Color::Rgb(255, 202, 40),  // amber 400
            danger: Color::Rgb(239, 83, 80),    // red 400
            info: Color::Rgb(79, 195, 247),     // light blue 300
            input_bg: Color::Rgb(14, 58, 74),
            border: Color::Rgb(0, 105, 92), // teal 800
            diagram_line: Color::Rgb(128, 203, 196),
        }
    }

    /// Gruvbox dark palette.
    pub fn gruvbox() -> Self {
        Self {
            name: "gruvbox".to_string(),
            accent: Color::Rgb(215, 153, 33),            // yellow
            accent_secondary: Color::Rgb(142, 192, 124), // green
            bg_dark: Color::Rgb(40, 40, 40),             // bg0
            bg_panel: Color::Rgb(50, 48, 47),            // bg0_s
            text_primary: Color::Rgb(235, 219, 178),     // fg
            text_dim: Color::Rgb(168, 153, 132),         // fg4
            text_muted: Color::Rgb(102, 92, 84),         // bg4
            success: Color::Rgb(142, 192, 124),          // green
            warning: Color::Rgb(250, 189, 47),           // yellow bright
            danger: Color::Rgb(251, 73, 52),             // red
            info: Color::Rgb(131, 165, 152),             // blue
            input_bg: Color::Rgb(60, 56, 54),
            border: Color::Rgb(80, 73, 69),
            diagram_line: Color::Rgb(168, 153, 132),
        }
    }

    /// Nord palette.
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            accent: Color::Rgb(136, 192, 208),           // nord8 frost
            accent_secondary: Color::Rgb(143, 188, 187), // nord7
            bg_dark: Color::Rgb(46, 52, 64),             // nord0
            bg_panel: Color::Rgb(59, 66, 82),            // nord1
            text_primary: Color::Rgb(229, 233, 240),     // nord5
            text_dim: Color::Rgb(182, 191, 204),
            text_muted: Color::Rgb(107, 112, 127),
            success: Color::Rgb(163, 190, 140), // nord14
            warning: Color::Rgb(235, 203, 139), // nord13
            danger: Color::Rgb(191, 97, 106),   // nord11
            info: Color::Rgb(129, 161, 193),    // nord9
            input_bg: Color::Rgb(67, 76, 94),   // nord2
            border: Color::Rgb(76, 86, 106),    // nord3
            diagram_line: Color::Rgb(216, 222, 233),
        }
    }

    /// Solarized dark palette.
    pub fn solarized() -> Self {
        Self {
            name: "solarized".to_string(),
            accent: Color::Rgb(38, 139, 210),           // blue
            accent_secondary: Color::Rgb(42, 161, 152), // cyan
            bg_dark: Color::Rgb(0, 43, 54),             // base03
            bg_panel: Color::Rgb(7, 54, 66),            // base02
            text_primary: Color::Rgb(147, 161, 161),    // base1
            text_dim: Color::Rgb(101, 123, 131),        // base00
            text_muted: Color::Rgb(88, 110, 117),       // base01
            success: Color::Rgb(133, 153, 0),           // green
            warning: Color::Rgb(181, 137, 0),           // yellow
            danger: Color::Rgb(220, 50, 47),            // red
            info: Color::Rgb(38, 139, 210),             // blue
            input_bg: Color::Rgb(7, 54, 66),
            border: Color::Rgb(88, 110, 117),
            diagram_line: Color::Rgb(131, 148, 150), // base0
        }
    }

    /// Look up a built-in theme by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::default_dark()),
            "lagoon" => Some(Self::lagoon()),
            "gruvbox" => Some(Self::gruvbox()),
            "nord" => Some(Self::nord()),
            "solarized" => Some(Self::solarized()),
            _ => None,
        }
    }

    /// Resolve a configured name: built-in first, then
    /// `~/.config/aquasentinel/themes/<name>.toml`, then the default.
    pub fn resolve(name: &str) -> Self {
        if let Some(theme) = Self::by_name(name) {
            return theme;
        }
        match Self::from_toml_file(&custom_theme_path(name)) {
            Some(theme) => theme,
            None => {
                tracing::warn!(theme = name, "unknown theme, using default");
                Self::default_dark()
            }
        }
    }

    /// Cycle to the next built-in theme.
    pub fn next_builtin(&self) -> Self {
        let idx = BUILTIN_THEME_NAMES
            .iter()
            .position(|&n| n == self.name)
            .unwrap_or(0);
        let next_idx = (idx + 1) % BUILTIN_THEME_NAMES.len();
        Self::by_name(BUILTIN_THEME_NAMES[next_idx]).unwrap_or_default()
    }

    /// Load a custom theme from a TOML file, falling back to default for missing fields.
    pub fn from_toml_file(path: &std::path::Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        let file: ThemeFile = toml::from_str(&content).ok()?;
        Some(
            file.into_theme(
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("custom"),
            ),
        )
    }

    // ── Computed Styles ──────────────────────────────────────

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_active_style(&self) -> Style {
        Style::default()
            .fg(self.bg_dark)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_inactive_style(&self) -> Style {
        Style::default().fg(self.text_dim)
    }

    pub fn label_style(&self) -> Style {
        Style::default()
            .fg(self.accent_secondary)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for a form field value; focused fields get the input background.
    pub fn field_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.text_primary).bg(self.input_bg)
        } else {
            Style::default().fg(self.text_dim)
        }
    }

    pub fn button_style(&self, focused: bool, disabled: bool) -> Style {
        if disabled {
            Style::default().fg(self.text_muted).bg(self.bg_panel)
        } else if focused {
            Style::default()
                .fg(self.bg_dark)
                .bg(self.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
        }
    }

    /// Map a diagram stroke colour to a terminal colour.
    pub fn stroke_color(&self, stroke: Option<&str>) -> Color {
        stroke.and_then(parse_hex).unwrap_or(self.diagram_line)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_highlight_style(&self) -> Style {
        Style::default().fg(self.accent)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_dark()
    }
}

// ── TOML deserialization for custom themes ──────────────────

/// Intermediate struct for parsing theme TOML files.
/// All fields are optional — missing fields inherit from the default theme.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ThemeFile {
    accent: Option<String>,
    accent_secondary: Option<String>,
    bg_dark: Option<String>,
    bg_panel: Option<String>,
    text_primary: Option<String>,
    text_dim: Option<String>,
    text_muted: Option<String>,
    success: Option<String>,
    warning: Option<String>,
    danger: Option<String>,
    info: Option<String>,
    input_bg: Option<String>,
    border: Option<String>,
    diagram_line: Option<String>,
}

impl ThemeFile {
    fn into_theme(self, name: &str) -> Theme {
        let base = Theme::default_dark();
        let pick = |v: &Option<String>, fallback: Color| v.as_deref().and_then(parse_hex).unwrap_or(fallback);
        Theme {
            name: name.to_string(),
            accent: pick(&self.accent, base.accent),
            accent_secondary: pick(&self.accent_secondary, base.accent_secondary),
            bg_dark: pick(&self.bg_dark, base.bg_dark),
            bg_panel: pick(&self.bg_panel, base.bg_panel),
            text_primary: pick(&self.text_primary, base.text_primary),
            text_dim: pick(&self.text_dim, base.text_dim),
            text_muted: pick(&self.text_muted, base.text_muted),
            success: pick(&self.success, base.success),
            warning: pick(&self.warning, base.warning),
            danger: pick(&self.danger, base.danger),
            info: pick(&self.info, base.info),
            input_bg: pick(&self.input_bg, base.input_bg),
            border: pick(&self.border, base.border),
            diagram_line: pick(&self.diagram_line, base.diagram_line),
        }
    }
}

/// Parse "#FF8800", "FF8800" or the short form "#F80" into a ratatui Color.
pub fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some(Color::Rgb(digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // ── parse_hex ─────────────────────────────────────────────────

    #[test]
    fn parse_hex_with_hash() {
        assert_eq!(parse_hex("#FF8800"), Some(Color::Rgb(255, 136, 0)));
    }

    #[test]
    fn parse_hex_without_hash() {
        assert_eq!(parse_hex("FF8800"), Some(Color::Rgb(255, 136, 0)));
    }

    #[test]
    fn parse_hex_lowercase() {
        assert_eq!(parse_hex("#00796b"), Some(Color::Rgb(0, 121, 107)));
    }

    #[test]
    fn parse_hex_short_form() {
        assert_eq!(parse_hex("#fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(parse_hex("#333"), Some(Color::Rgb(51, 51, 51)));
    }

    #[test]
    fn parse_hex_invalid() {
        assert_eq!(parse_hex("#FFFF"), None);
        assert_eq!(parse_hex("#FFFFFFF"), None);
        assert_eq!(parse_hex("#GGHHII"), None);
        assert_eq!(parse_hex("#ééé"), None);
        assert_eq!(parse_hex(""), None);
    }

    // ── by_name / resolve ─────────────────────────────────────────

    #[test]
    fn by_name_all_builtins() {
        for &name in BUILTIN_THEME_NAMES {
            let theme = Theme::by_name(name);
            assert!(theme.is_some(), "Theme '{}' should exist", name);
            assert_eq!(theme.unwrap().name, name);
        }
    }

    #[test]
    fn by_name_case_insensitive() {
        assert!(Theme::by_name("DEFAULT").is_some());
        assert!(Theme::by_name("Lagoon").is_some());
    }

    #[test]
    fn resolve_unknown_falls_back_to_default() {
        assert_eq!(Theme::resolve("no-such-theme-anywhere").name, "default");
    }

    // ── next_builtin ──────────────────────────────────────────────

    #[test]
    fn next_builtin_wraps_around() {
        let mut theme = Theme::default_dark();
        let mut seen = vec![theme.name.clone()];
        for _ in 0..BUILTIN_THEME_NAMES.len() {
            theme = theme.next_builtin();
            seen.push(theme.name.clone());
        }
        assert_eq!(theme.name, "default");
        for &expected in BUILTIN_THEME_NAMES {
            assert!(seen.iter().any(|n| n == expected), "Missing theme: {}", expected);
        }
    }

    // ── custom themes ─────────────────────────────────────────────

    #[test]
    fn toml_theme_inherits_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reef.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "accent = \"#0af\"\ndanger = \"not a colour\"").unwrap();

        let t = Theme::from_toml_file(&path).unwrap();
        let base = Theme::default_dark();
        assert_eq!(t.name, "reef");
        assert_eq!(t.accent, Color::Rgb(0, 170, 255));
        assert_eq!(t.danger, base.danger);
        assert_eq!(t.border, base.border);
    }

    // ── stroke_color ──────────────────────────────────────────────

    #[test]
    fn stroke_color_falls_back_to_diagram_line() {
        let t = Theme::default_dark();
        assert_eq!(t.stroke_color(Some("#7b1fa2")), Color::Rgb(123, 31, 162));
        assert_eq!(t.stroke_color(Some("purple")), t.diagram_line);
        assert_eq!(t.stroke_color(None), t.diagram_line);
    }
}
