//! Light/dark color palettes.
//!
//! The active palette is selected by `ThemeKind`, toggled at runtime and
//! persisted via the state module.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Light,
    Dark,
}

impl ThemeKind {
    pub fn toggled(self) -> Self {
        match self {
            ThemeKind::Light => ThemeKind::Dark,
            ThemeKind::Dark => ThemeKind::Light,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(ThemeKind::Light),
            "dark" => Some(ThemeKind::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeKind::Light => "light",
            ThemeKind::Dark => "dark",
        }
    }

    pub fn palette(self) -> &'static Theme {
        match self {
            ThemeKind::Light => &LIGHT_THEME,
            ThemeKind::Dark => &DARK_THEME,
        }
    }
}

pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub title: Color,
    pub accent: Color,
    pub success: Color,
    pub error: Color,
    pub border_focused: Color,
    pub border_normal: Color,
}

pub const DARK_THEME: Theme = Theme {
    bg: Color::Rgb(30, 30, 46),
    fg: Color::Rgb(205, 214, 244),
    muted: Color::Rgb(108, 112, 134),
    title: Color::Rgb(205, 214, 244),
    accent: Color::Rgb(137, 180, 250),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    border_focused: Color::Rgb(249, 226, 175),
    border_normal: Color::Rgb(108, 112, 134),
};

pub const LIGHT_THEME: Theme = Theme {
    bg: Color::Rgb(239, 241, 245),
    fg: Color::Rgb(76, 79, 105),
    muted: Color::Rgb(140, 143, 161),
    title: Color::Rgb(76, 79, 105),
    accent: Color::Rgb(30, 102, 245),
    success: Color::Rgb(64, 160, 43),
    error: Color::Rgb(210, 15, 57),
    border_focused: Color::Rgb(223, 142, 29),
    border_normal: Color::Rgb(140, 143, 161),
};
