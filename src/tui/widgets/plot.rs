//! Sparkline panels.
//!
//! Each panel is a bordered block holding one horizontal band per plotted
//! series. Values are drawn as vertical bars using an 8-level block ramp,
//! so a band `h` rows tall resolves `8 * h` levels. The newest value sits
//! in the rightmost column.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Widget};

use crate::config::Scale;
use crate::fmt::{format_age, format_value, truncate};
use crate::tui::style::Styles;

/// Glyphs for 0..=8 eighths of a cell.
pub const RAMP: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Display health of a series.
#[derive(Debug, Clone, PartialEq)]
pub enum Health {
    /// Updating normally.
    Ok,
    /// No plottable value yet and no error.
    Waiting,
    /// Has data but the latest attempts failed.
    Stale {
        message: String,
        age_secs: Option<i64>,
    },
    /// Never produced a value.
    Failed(String),
}

impl Health {
    fn is_error(&self) -> bool {
        matches!(self, Health::Stale { .. } | Health::Failed(_))
    }
}

/// Everything needed to draw one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesView {
    pub label: String,
    /// Derived values, oldest first.
    pub values: Vec<f64>,
    pub latest: Option<f64>,
    pub unit: Option<String>,
    pub color: Color,
    pub scale: Scale,
    pub marker: bool,
    pub health: Health,
}

impl SeriesView {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        let latest = values.last().copied();
        Self {
            label: label.into(),
            values,
            latest,
            unit: None,
            color: Color::Cyan,
            scale: Scale::default(),
            marker: false,
            health: Health::Ok,
        }
    }
}

/// One panel ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub title: String,
    pub series: Vec<SeriesView>,
}

/// Vertical range used to scale `values`.
///
/// Uses the fixed bounds when given and the data extremes otherwise. A
/// degenerate range (all values equal) is widened to ±1 around the value.
pub fn scale_range(values: &[f64], fixed: Scale) -> Option<(f64, f64)> {
    let mut finite = values.iter().copied().filter(|v| v.is_finite()).peekable();
    finite.peek()?;
    let (data_min, data_max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let lo = fixed.min.unwrap_or(data_min);
    let hi = fixed.max.unwrap_or(data_max);
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    if hi - lo > f64::EPSILON * lo.abs().max(hi.abs()).max(1.0) {
        Some((lo, hi))
    } else {
        Some((lo - 1.0, hi + 1.0))
    }
}

/// Bar height of every column, in eighths of a cell.
///
/// The last `width` values are right-aligned; columns without a value (or
/// with a non-finite one) are `None`. Every plotted value gets at least one
/// eighth so the minimum stays visible.
pub fn rasterize(values: &[f64], width: usize, height: usize, range: (f64, f64)) -> Vec<Option<usize>> {
    let mut columns = vec![None; width];
    if width == 0 || height == 0 {
        return columns;
    }
    let levels = height * 8;
    let (lo, hi) = range;
    let span = hi - lo;
    let visible = &values[values.len().saturating_sub(width)..];
    let offset = width - visible.len();

    for (i, value) in visible.iter().enumerate() {
        if !value.is_finite() {
            continue;
        }
        let fraction = if span > 0.0 {
            ((value - lo) / span).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let level = (fraction * levels as f64).round() as usize;
        columns[offset + i] = Some(level.clamp(1, levels));
    }
    columns
}

/// Columns (right-aligned like [`rasterize`]) where `values` is non-zero.
fn marker_columns(values: &[f64], width: usize) -> Vec<bool> {
    let mut columns = vec![false; width];
    let visible = &values[values.len().saturating_sub(width)..];
    let offset = width - visible.len();
    for (i, value) in visible.iter().enumerate() {
        columns[offset + i] = *value != 0.0 && value.is_finite();
    }
    columns
}

impl PanelView {
    fn title_line(&self, width: u16) -> Line<'_> {
        let max = usize::from(width.saturating_sub(4));
        Line::from(Span::styled(
            format!(" {} ", truncate(&self.title, max.saturating_sub(2))),
            Styles::title(),
        ))
    }

    fn values_line(&self) -> Line<'_> {
        let mut spans = vec![Span::raw(" ")];
        for (i, series) in self.series.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", Styles::dim()));
            }
            let text = series
                .latest
                .map(|v| format_value(v, series.unit.as_deref()))
                .unwrap_or_else(|| "-".to_string());
            spans.push(Span::styled(text, Style::default().fg(series.color)));
        }
        spans.push(Span::raw(" "));
        Line::from(spans).right_aligned()
    }

    /// Bottom border: the first failing series, if any.
    fn status_line(&self, width: u16) -> Option<Line<'_>> {
        let max = usize::from(width.saturating_sub(4));
        self.series.iter().find_map(|series| match &series.health {
            Health::Stale { message, age_secs } => {
                let age = age_secs.map(|s| format!(" {}", format_age(s))).unwrap_or_default();
                let text = format!(" STALE{} {}: {} ", age, series.label, message);
                Some(Line::from(Span::styled(truncate(&text, max), Styles::warning())))
            }
            Health::Failed(message) => {
                let text = format!(" ERR {}: {} ", series.label, message);
                Some(Line::from(Span::styled(truncate(&text, max), Styles::critical())))
            }
            Health::Ok | Health::Waiting => None,
        })
    }
}

impl Widget for &PanelView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let any_error = self.series.iter().any(|s| s.health.is_error());
        let border_style = if any_error {
            Styles::critical()
        } else {
            Styles::border()
        };
        let mut block = Block::bordered()
            .border_style(border_style)
            .title(self.title_line(area.width))
            .title(self.values_line());
        if let Some(status) = self.status_line(area.width) {
            block = block.title_bottom(status);
        }
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.is_empty() {
            return;
        }

        let mut plotted: Vec<&SeriesView> = self.series.iter().filter(|s| !s.marker).collect();
        let markers: Vec<&SeriesView> = self.series.iter().filter(|s| s.marker).collect();
        if plotted.is_empty() {
            // Only markers configured: plot them as regular series.
            plotted = markers.clone();
        } else {
            draw_markers(&markers, inner, buf);
        }

        for (series, band) in plotted.iter().zip(bands(inner, plotted.len())) {
            draw_series(series, band, buf);
        }
    }
}

/// Splits `area` into `count` horizontal bands, dropping the ones that do
/// not get a row. The last band takes the spare rows.
fn bands(area: Rect, count: usize) -> Vec<Rect> {
    let count = count.min(usize::from(area.height));
    if count == 0 {
        return Vec::new();
    }
    // count <= area.height, which is a u16.
    let count = count as u16;
    let height = area.height / count;
    (0..count)
        .map(|i| {
            let y = area.y + i * height;
            let h = if i + 1 == count {
                area.bottom() - y
            } else {
                height
            };
            Rect::new(area.x, y, area.width, h)
        })
        .collect()
}

fn draw_markers(markers: &[&SeriesView], area: Rect, buf: &mut Buffer) {
    let width = usize::from(area.width);
    for series in markers {
        for (i, fired) in marker_columns(&series.values, width).into_iter().enumerate() {
            if !fired {
                continue;
            }
            let x = area.x + i as u16;
            for y in area.top()..area.bottom() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_style(Styles::marker());
                }
            }
        }
    }
}

fn draw_series(series: &SeriesView, area: Rect, buf: &mut Buffer) {
    let Some(range) = scale_range(&series.values, series.scale) else {
        draw_placeholder(series, area, buf);
        return;
    };

    let style = Style::default().fg(series.color);
    let columns = rasterize(
        &series.values,
        usize::from(area.width),
        usize::from(area.height),
        range,
    );
    for (i, level) in columns.into_iter().enumerate() {
        let Some(level) = level else {
            continue;
        };
        let x = area.x + i as u16;
        for row in 0..area.height {
            let filled = level.saturating_sub(usize::from(row) * 8).min(8);
            if filled == 0 {
                break;
            }
            if let Some(cell) = buf.cell_mut((x, area.bottom() - 1 - row)) {
                cell.set_char(RAMP[filled]).set_fg(series.color);
            }
        }
    }

    // Axis labels: max at the top, min at the bottom, when there is room.
    if area.height >= 2 && area.width >= 16 {
        let (lo, hi) = range;
        let unit = series.unit.as_deref();
        buf.set_stringn(
            area.x,
            area.y,
            format!("{} {}", truncate(&series.label, 12), format_value(hi, unit)),
            usize::from(area.width / 2),
            Styles::dim(),
        );
        buf.set_stringn(
            area.x,
            area.bottom() - 1,
            format_value(lo, unit),
            usize::from(area.width / 2),
            Styles::dim(),
        );
    } else {
        buf.set_stringn(
            area.x,
            area.y,
            truncate(&series.label, 12),
            usize::from(area.width / 2),
            style,
        );
    }
}

fn draw_placeholder(series: &SeriesView, area: Rect, buf: &mut Buffer) {
    let (text, style) = match &series.health {
        Health::Failed(message) | Health::Stale { message, .. } => {
            (format!("{}: no data ({})", series.label, message), Styles::critical())
        }
        Health::Ok | Health::Waiting => (format!("{}: waiting for data", series.label), Styles::dim()),
    };
    let text = truncate(&text, usize::from(area.width));
    let len = text.chars().count() as u16;
    let x = area.x + area.width.saturating_sub(len) / 2;
    let y = area.y + area.height / 2;
    buf.set_string(x, y, text, style);
}
