//! Terminal setup and restoration.

use std::io::{self, Stdout};

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::warn;

/// Terminal could not be put into dashboard mode.
#[derive(Debug)]
pub enum TerminalError {
    /// Raw mode unavailable (not a tty).
    RawMode(io::Error),
    /// Alternate screen or backend setup failed.
    Setup(io::Error),
}

impl std::fmt::Display for TerminalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalError::RawMode(e) => write!(f, "cannot enable raw mode: {}", e),
            TerminalError::Setup(e) => write!(f, "cannot set up terminal: {}", e),
        }
    }
}

impl std::error::Error for TerminalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TerminalError::RawMode(e) | TerminalError::Setup(e) => Some(e),
        }
    }
}

/// Owns the terminal while the dashboard runs.
///
/// Raw mode and the alternate screen are undone on drop, and by a panic
/// hook installed on acquire, so the shell is usable on every exit path.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    pub fn acquire() -> Result<Self, TerminalError> {
        enable_raw_mode().map_err(TerminalError::RawMode)?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
            restore();
            return Err(TerminalError::Setup(e));
        }
        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                restore();
                return Err(TerminalError::Setup(e));
            }
        };

        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore();
            original_hook(info);
        }));

        Ok(Self { terminal })
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore();
    }
}

/// Best effort: leave the alternate screen and raw mode.
fn restore() {
    if let Err(e) = disable_raw_mode() {
        warn!(error = %e, "failed to disable raw mode");
    }
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, Show) {
        warn!(error = %e, "failed to leave alternate screen");
    }
}
