//! Terminal dashboard.
//!
//! A single coordinating loop owns the series store, the layout cache and
//! the terminal. Fetch workers, terminal input, the render ticker and the
//! signal handler all feed it through one event channel.

mod app;
mod event;
mod input;
mod render;
mod state;
mod style;
mod terminal;
pub mod widgets;

pub use app::{App, AppError};
pub use event::{Event, EventHandler};
pub use input::{KeyAction, handle_key};
pub use render::render;
pub use state::{AppState, EndpointStatus, RunState};
pub use style::{Styles, Theme};
pub use terminal::{TerminalError, TerminalGuard};
