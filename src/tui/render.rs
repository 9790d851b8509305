//! Main rendering logic for the dashboard.

use chrono::{Local, Utc};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::Paragraph;

use crate::layout::Panel;
use crate::series::{SeriesId, Timestamp};
use crate::tui::style::{Styles, Theme};

use super::state::AppState;
use super::widgets::{Health, PanelView, SeriesView, render_header, render_help};

/// Main render function.
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(0),    // Panels
    ])
    .split(area);

    // Layout first: the header reports the overflow.
    state.ensure_layout(chunks[1]);

    render_header(frame, chunks[0], state, Local::now());
    render_panels(frame, chunks[1], state);

    // Help popup (rendered last to overlay everything)
    if state.show_help {
        render_help(frame, area);
    }
}

fn render_panels(frame: &mut Frame, area: Rect, state: &AppState) {
    let layout = state.layout();
    if layout.panels.is_empty() {
        if !state.panels.is_empty() && !area.is_empty() {
            let message = Paragraph::new("terminal too small")
                .style(Styles::warning())
                .centered();
            let y = area.y + area.height / 2;
            frame.render_widget(message, Rect::new(area.x, y, area.width, 1));
        }
        return;
    }

    let now = Utc::now();
    for panel in &layout.panels {
        let view = panel_view(state, panel, now);
        frame.render_widget(&view, panel.area);
    }
}

/// Collects what one panel shows from the store.
pub(crate) fn panel_view(state: &AppState, panel: &Panel, now: Timestamp) -> PanelView {
    let series = panel
        .series
        .iter()
        .filter_map(|&id| series_view(state, id, now))
        .collect();
    PanelView {
        title: panel.title.clone(),
        series,
    }
}

fn series_view(state: &AppState, id: SeriesId, now: Timestamp) -> Option<SeriesView> {
    let metric = state.config.metric(id)?;
    let values: Vec<f64> = state
        .store
        .derive(id, metric.mode)
        .into_iter()
        .map(|sample| sample.value)
        .collect();
    let has_samples = state.store.series(id).is_some_and(|s| !s.is_empty());

    let health = match state.store.status(id) {
        Some(status) if status.is_failing() => {
            let message = status.last_error.clone().unwrap_or_default();
            if has_samples {
                Health::Stale {
                    message,
                    age_secs: status.last_success.map(|t| (now - t).num_seconds()),
                }
            } else {
                Health::Failed(message)
            }
        }
        _ if values.is_empty() => Health::Waiting,
        _ => Health::Ok,
    };

    let color = metric
        .color
        .unwrap_or_else(|| Theme::series_color(state.config.ordinal(id).unwrap_or(0)));

    Some(SeriesView {
        label: metric.label.clone(),
        latest: state.store.latest(id, metric.mode),
        values,
        unit: metric.unit.clone(),
        color,
        scale: metric.scale,
        marker: metric.marker,
        health,
    })
}
