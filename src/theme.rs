//! Dark and light palettes for the quote wall.
//!
//! Each UI element is addressed by a semantic role so the renderer never
//! hardcodes colors. The active variant is persisted by the storage layer.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Theme Variant
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Lowercase name used in config and the persisted preference.
    pub fn key(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Post list --
    pub post_title: Style,
    pub post_body: Style,
    pub post_selected: Style,
    pub post_tag: Style,
    pub post_time: Style,
    pub post_image: Style,
    pub post_category: Style,

    // -- Sync status --
    pub status_bar: Style,
    pub status_live: Style,
    pub status_cached: Style,
    pub status_syncing: Style,
    pub status_error: Style,

    // -- Panels --
    pub panel_border: Style,
    pub modal_border: Style,
    pub error_panel: Style,
    pub heading: Style,
    pub muted: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            post_title: Style::default().add_modifier(Modifier::BOLD),
            post_body: Style::default(),
            post_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            post_tag: Style::default().fg(Color::Cyan),
            post_time: Style::default().fg(Color::DarkGray),
            post_image: Style::default().fg(Color::Blue),
            post_category: Style::default().fg(Color::Yellow),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_live: Style::default().fg(Color::Green),
            status_cached: Style::default().fg(Color::Yellow),
            status_syncing: Style::default().fg(Color::Cyan),
            status_error: Style::default().fg(Color::Red),

            panel_border: Style::default().fg(Color::Cyan),
            modal_border: Style::default().fg(Color::Yellow),
            error_panel: Style::default().fg(Color::Red),
            heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::DarkGray),
        }
    }

    fn light() -> Self {
        Self {
            post_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            post_body: Style::default().fg(Color::Black),
            post_selected: Style::default().bg(Color::Blue).fg(Color::White),
            post_tag: Style::default().fg(Color::Blue),
            post_time: Style::default().fg(Color::DarkGray),
            post_image: Style::default().fg(Color::Magenta),
            post_category: Style::default().fg(Color::Magenta),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_live: Style::default().fg(Color::Green),
            status_cached: Style::default().fg(Color::Magenta),
            status_syncing: Style::default().fg(Color::Blue),
            status_error: Style::default().fg(Color::Red),

            panel_border: Style::default().fg(Color::Blue),
            modal_border: Style::default().fg(Color::Magenta),
            error_panel: Style::default().fg(Color::Red),
            heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::DarkGray),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_from_str_name() {
        assert_eq!(ThemeVariant::from_str_name("dark"), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name("Light"), Some(ThemeVariant::Light));
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn toggle_alternates() {
        assert_eq!(ThemeVariant::Dark.toggle(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Dark.toggle().toggle(), ThemeVariant::Dark);
    }

    #[test]
    fn key_round_trips() {
        for v in [ThemeVariant::Dark, ThemeVariant::Light] {
            assert_eq!(ThemeVariant::from_str_name(v.key()), Some(v));
        }
    }

    #[test]
    fn palettes_differ_where_background_matters() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.post_selected, light.post_selected);
        assert_ne!(dark.status_bar, light.status_bar);
        assert_eq!(dark.status_error, light.status_error);
    }
}
