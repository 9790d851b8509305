//! Header widget showing time, run state and endpoint health.

use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::state::{AppState, RunState};
use crate::tui::style::Styles;

/// Renders the header bar.
pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState, now: DateTime<Local>) {
    let hidden = state.layout().overflow;
    let right = if hidden > 0 {
        format!("+{} hidden  ? help ", hidden)
    } else {
        "? help ".to_string()
    };

    let right_width = right.chars().count() as u16;

    let chunks = Layout::horizontal([
        Constraint::Length(10),          // Time
        Constraint::Length(9),           // State
        Constraint::Min(0),              // Endpoints
        Constraint::Length(right_width), // Overflow/help
    ])
    .split(area);

    let time = Paragraph::new(format!(" {}", now.format("%H:%M:%S"))).style(Styles::header());
    frame.render_widget(time, chunks[0]);

    let (mode, mode_style) = match state.run_state {
        RunState::Running => (" LIVE ", Styles::header()),
        RunState::Paused => (" PAUSED ", Styles::paused()),
        RunState::Terminating => (" EXIT ", Styles::header()),
    };
    frame.render_widget(Paragraph::new(mode).style(mode_style), chunks[1]);

    let (healthy, total) = state.endpoint_health();
    let health_style = if healthy == total {
        Styles::ok()
    } else if healthy == 0 {
        Styles::critical()
    } else {
        Styles::warning()
    };
    let noun = if total == 1 { "endpoint" } else { "endpoints" };
    let health = Line::from(vec![
        Span::styled(format!("{}/{}", healthy, total), health_style),
        Span::styled(format!(" {} ok", noun), Styles::header()),
    ]);
    frame.render_widget(Paragraph::new(health).style(Styles::header()), chunks[2]);

    let right_style = if hidden > 0 {
        Styles::warning()
    } else {
        Styles::header()
    };
    frame.render_widget(
        Paragraph::new(right).style(right_style).right_aligned(),
        chunks[3],
    );
}
