// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// board event loop, or into local ViewState mutations (panel focus, scroll).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::protocol::{PanelId, UserCommand};
use super::ViewState;

/// Rows moved by PageUp/PageDown.
const PAGE_SIZE: usize = 10;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// board event loop. Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // crossterm reports Press and Release on some platforms.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    match key_event.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(UserCommand::Quit),

        KeyCode::Tab => {
            view_state.focus = next_panel(view_state.focus);
            None
        }
        KeyCode::BackTab => {
            view_state.focus = previous_panel(view_state.focus);
            None
        }
        KeyCode::Char('1') => {
            view_state.focus = PanelId::Recommendations;
            None
        }
        KeyCode::Char('2') => {
            view_state.focus = PanelId::Teams;
            None
        }
        KeyCode::Char('3') => {
            view_state.focus = PanelId::LiveScores;
            None
        }

        KeyCode::Up | KeyCode::Char('k') => {
            scroll_up(view_state, 1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            scroll_down(view_state, 1);
            None
        }
        KeyCode::PageUp => {
            scroll_up(view_state, PAGE_SIZE);
            None
        }
        KeyCode::PageDown => {
            scroll_down(view_state, PAGE_SIZE);
            None
        }
        KeyCode::Home | KeyCode::Char('g') => {
            view_state.scroll_offset.insert(view_state.focus, 0);
            None
        }

        _ => None,
    }
}

fn next_panel(current: PanelId) -> PanelId {
    let idx = panel_index(current);
    PanelId::ALL[(idx + 1) % PanelId::ALL.len()]
}

fn previous_panel(current: PanelId) -> PanelId {
    let idx = panel_index(current);
    PanelId::ALL[(idx + PanelId::ALL.len() - 1) % PanelId::ALL.len()]
}

fn panel_index(panel: PanelId) -> usize {
    PanelId::ALL.iter().position(|p| *p == panel).unwrap_or(0)
}

fn scroll_up(view_state: &mut ViewState, lines: usize) {
    let offset = view_state.scroll_offset.entry(view_state.focus).or_insert(0);
    *offset = offset.saturating_sub(lines);
}

/// Scroll down, never past the last full page of the focused panel.
fn scroll_down(view_state: &mut ViewState, lines: usize) {
    let max = view_state.max_scroll(view_state.focus);
    let offset = view_state.scroll_offset.entry(view_state.focus).or_insert(0);
    *offset = offset.saturating_add(lines).min(max);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
