//! TUI widgets for sparkmon.

mod header;
mod help;
pub mod plot;

pub use header::render_header;
pub use help::render_help;
pub use plot::{Health, PanelView, SeriesView};
