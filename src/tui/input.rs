//! Input handling and keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::info;

use super::state::AppState;

/// Result of handling a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// No action, continue.
    None,
    /// Quit the application.
    Quit,
    /// State visible on screen changed; draw now even if paused.
    Redraw,
}

/// Handles key input and updates state.
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => KeyAction::Quit,
            _ => KeyAction::None,
        };
    }
    if state.show_help {
        return handle_help(state, key);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => {
            state.toggle_pause();
            KeyAction::Redraw
        }
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') => {
            state.show_help = true;
            KeyAction::Redraw
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            state.store.clear();
            info!("series cleared");
            KeyAction::Redraw
        }
        _ => KeyAction::None,
    }
}

/// While the help popup is open only closing keys and quit are accepted.
fn handle_help(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') => {
            state.show_help = false;
            KeyAction::Redraw
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        _ => KeyAction::None,
    }
}
