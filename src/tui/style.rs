//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

/// Dashboard color palette.
pub struct Theme;

impl Theme {
    // Background colors
    pub const BG: Color = Color::Reset;
    pub const HEADER_BG: Color = Color::Blue;
    pub const MARKER_BG: Color = Color::DarkGray;

    // Foreground colors
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;
    pub const HEADER_FG: Color = Color::White;

    // Status colors
    pub const OK: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const CRITICAL: Color = Color::Red;

    pub const BORDER: Color = Color::DarkGray;

    /// Series colors, assigned in configuration order unless a metric sets
    /// its own.
    pub const SERIES: [Color; 8] = [
        Color::Cyan,
        Color::Green,
        Color::Yellow,
        Color::Magenta,
        Color::LightBlue,
        Color::LightRed,
        Color::LightCyan,
        Color::LightGreen,
    ];

    pub fn series_color(ordinal: usize) -> Color {
        Self::SERIES[ordinal % Self::SERIES.len()]
    }
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Theme::FG).bg(Theme::BG)
    }

    /// Header bar style.
    pub fn header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Paused indicator in the header.
    pub fn paused() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Theme::WARNING)
            .add_modifier(Modifier::BOLD)
    }

    pub fn ok() -> Style {
        Style::default().fg(Theme::OK)
    }

    /// Stale series, hidden panels.
    pub fn warning() -> Style {
        Style::default()
            .fg(Theme::WARNING)
            .add_modifier(Modifier::BOLD)
    }

    /// Failing series and endpoints.
    pub fn critical() -> Style {
        Style::default()
            .fg(Theme::CRITICAL)
            .add_modifier(Modifier::BOLD)
    }

    /// Dimmed text style (axis labels, placeholders).
    pub fn dim() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    pub fn border() -> Style {
        Style::default().fg(Theme::BORDER)
    }

    /// Panel title style.
    pub fn title() -> Style {
        Style::default().fg(Theme::FG).add_modifier(Modifier::BOLD)
    }

    /// Background of columns where a marker series fired.
    pub fn marker() -> Style {
        Style::default().bg(Theme::MARKER_BG)
    }

    /// Help key style.
    pub fn help_key() -> Style {
        Style::default().fg(Color::Yellow)
    }

    /// Help text style.
    pub fn help() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }
}
