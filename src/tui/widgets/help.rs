//! Help popup widget.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::style::{Styles, Theme};

const KEYS: [(&str, &str); 5] = [
    ("q / Esc", "quit"),
    ("p / Space", "pause or resume drawing (polling continues)"),
    ("c", "clear all series"),
    ("? / h", "toggle this help"),
    ("Ctrl-C", "quit"),
];

/// Renders the help popup centered on screen.
pub fn render_help(frame: &mut Frame, area: Rect) {
    // 60% width, 60% height, clamped to 30-70 x 12-20
    let popup_width = percent(area.width, 60).clamp(30, 70).min(area.width);
    let popup_height = percent(area.height, 60).clamp(12, 20).min(area.height);

    let popup_x = area.x + area.width.saturating_sub(popup_width) / 2;
    let popup_y = area.y + area.height.saturating_sub(popup_height) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Theme::SERIES[0]));

    let paragraph = Paragraph::new(help_lines())
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Styles::default());
    frame.render_widget(paragraph, popup_area);
}

fn percent(value: u16, pct: u32) -> u16 {
    // pct <= 100, so the result fits back into u16.
    (u32::from(value) * pct / 100) as u16
}

fn help_lines() -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = KEYS
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!(" {:<10}", key), Styles::help_key()),
                Span::raw(*action),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.extend([
        Line::from(Span::styled(" Panel markers:", Styles::help_key())),
        Line::from(Span::styled(
            " ERR    metric has no data, last error shown",
            Styles::help(),
        )),
        Line::from(Span::styled(
            " STALE  fetches failing, showing last known data",
            Styles::help(),
        )),
        Line::from(Span::styled(
            " +N hidden  terminal too small for N panels",
            Styles::help(),
        )),
    ]);
    lines
}
