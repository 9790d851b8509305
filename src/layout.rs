//! Panel grid layout.
//!
//! [`compute_layout`] is a pure function of the terminal size and the panel
//! list, so the coordinator can cache its result and only recompute it on
//! resize.

use ratatui::layout::Rect;

use crate::config::PanelSpec;
use crate::series::SeriesId;

/// Smallest panel that still shows a title, a plot and a status line.
pub const MIN_PANEL_WIDTH: u16 = 20;
pub const MIN_PANEL_HEIGHT: u16 = 5;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;

/// A placed panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    /// Position relative to the layout origin.
    pub area: Rect,
    /// Index of the panel in the configured panel list.
    pub index: usize,
    pub title: String,
    pub series: Vec<SeriesId>,
}

/// Result of a layout pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelLayout {
    pub panels: Vec<Panel>,
    /// Configured panels that did not fit at minimum size.
    pub overflow: usize,
    pub columns: u16,
    pub rows: u16,
}

impl PanelLayout {
    pub fn is_overflowing(&self) -> bool {
        self.overflow > 0
    }

    /// Moves every panel by `(x, y)`.
    pub fn offset(mut self, x: u16, y: u16) -> Self {
        for panel in &mut self.panels {
            panel.area.x = panel.area.x.saturating_add(x);
            panel.area.y = panel.area.y.saturating_add(y);
        }
        self
    }
}

/// Arranges `specs` on a `width` × `height` grid.
///
/// Picks the column count giving the most square-looking panels, never
/// going below [`MIN_PANEL_WIDTH`] × [`MIN_PANEL_HEIGHT`]. When not every
/// panel fits, the first ones are placed and the rest are counted in
/// [`PanelLayout::overflow`]. Panels of an incomplete last row share its width.
pub fn compute_layout(width: u16, height: u16, specs: &[PanelSpec]) -> PanelLayout {
    let max_cols = width / MIN_PANEL_WIDTH;
    let max_rows = height / MIN_PANEL_HEIGHT;
    let capacity = usize::from(max_cols) * usize::from(max_rows);
    let shown = specs.len().min(capacity);
    let overflow = specs.len() - shown;

    if shown == 0 {
        return PanelLayout {
            overflow,
            ..PanelLayout::default()
        };
    }

    let (cols, rows) = choose_grid(width, height, shown, max_cols, max_rows);
    let mut panels = Vec::with_capacity(shown);
    let row_heights = split(height, rows);
    let mut y = 0;

    for (row, row_height) in row_heights.iter().enumerate() {
        let first = row * usize::from(cols);
        let in_row = (shown - first).min(usize::from(cols));
        // in_row <= cols, which fits in u16.
        let col_widths = split(width, in_row as u16);
        let mut x = 0;
        for (col, col_width) in col_widths.iter().enumerate() {
            let spec_index = first + col;
            let spec = &specs[spec_index];
            panels.push(Panel {
                area: Rect::new(x, y, *col_width, *row_height),
                index: spec_index,
                title: spec.title.clone(),
                series: spec.series.clone(),
            });
            x += col_width;
        }
        y += row_height;
    }

    PanelLayout {
        panels,
        overflow,
        columns: cols,
        rows,
    }
}

/// Chooses `(columns, rows)` for `count` panels.
fn choose_grid(width: u16, height: u16, count: usize, max_cols: u16, max_rows: u16) -> (u16, u16) {
    let mut best: Option<(f64, u16, u16)> = None;
    let col_limit = usize::from(max_cols).min(count);
    for cols in 1..=col_limit {
        let rows = count.div_ceil(cols);
        if rows > usize::from(max_rows) {
            continue;
        }
        let panel_w = f64::from(width) / cols as f64;
        let panel_h = f64::from(height) * CELL_ASPECT / rows as f64;
        let score = (panel_w / panel_h).ln().abs();
        if best.is_none_or(|(best_score, _, _)| score < best_score) {
            best = Some((score, cols as u16, rows as u16));
        }
    }
    // count <= max_cols * max_rows, so cols == max_cols always qualifies.
    best.map(|(_, c, r)| (c, r)).unwrap_or((max_cols, max_rows))
}

/// Splits `total` into `parts` sizes; the last part takes the remainder.
fn split(total: u16, parts: u16) -> Vec<u16> {
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts;
    let mut sizes = vec![base; usize::from(parts)];
    if let Some(last) = sizes.last_mut() {
        *last += total % parts;
    }
    sizes
}
