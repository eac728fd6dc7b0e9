//! Keybinding dispatcher.
//!
//! Translates crossterm key and mouse events into `AppState` mutations and
//! returns a `KeyAction`. Anything that needs the session controller or the
//! network (starting a run, refreshing the file list) is handed back to the
//! event loop as an action instead of being done here.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::app::{AppState, Mode, PanelFocus};

/// What the event loop should do after a key or mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
    /// Start a run for the selected file.
    StartRun,
    /// Re-fetch the file list from the server.
    RefreshFiles,
}

/// Dispatches a key event to the handler for the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Normal => handle_normal(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }
    if let Some(action) = handle_run_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Char('H') => {
            state.focus = state.focus.prev();
            KeyAction::Continue
        }
        KeyCode::Char('L') => {
            state.focus = state.focus.next();
            KeyAction::Continue
        }

        KeyCode::Char('{') => { state.prev_file(); KeyAction::Continue }
        KeyCode::Char('}') => { state.next_file(); KeyAction::Continue }

        KeyCode::Char('c') => { state.clear_feed(); KeyAction::Continue }

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }

        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,

        _ => KeyAction::Continue,
    }
}

/// Run controls: Enter, `+`/`-` preview lines, `p` render mode, `r` refresh.
///
/// Returns `None` when the key is not a run control.
fn handle_run_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    match key.code {
        KeyCode::Enter => Some(KeyAction::StartRun),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            state.increase_lines();
            Some(KeyAction::Continue)
        }
        KeyCode::Char('-') => {
            state.decrease_lines();
            Some(KeyAction::Continue)
        }
        KeyCode::Char('p') => {
            state.render_mode = state.render_mode.toggled();
            state.status_message = Some(format!(
                "{} mode applies from the next run",
                state.render_mode.label()
            ));
            Some(KeyAction::Continue)
        }
        KeyCode::Char('r') => {
            state.files_loading = true;
            Some(KeyAction::RefreshFiles)
        }
        _ => None,
    }
}

/// Scroll keys: j / k / g / G and the Ctrl page combos.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_up(1),
        KeyCode::Char('g') => state.scroll_top(),
        KeyCode::Char('G') => state.scroll_bottom(),
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),
        KeyCode::Char('f') if ctrl => state.full_page_down(),
        KeyCode::Char('b') if ctrl => state.full_page_up(),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Left click focuses the panel under the cursor; the wheel scrolls 3 rows.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    let help = state.mode == Mode::HelpOverlay;
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if !help => {
            focus_at(mouse.column, mouse.row, state);
        }
        MouseEventKind::ScrollUp if help => {
            state.help_scroll = state.help_scroll.saturating_sub(3);
        }
        MouseEventKind::ScrollDown if help => {
            state.help_scroll = state.help_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp => state.scroll_up(3),
        MouseEventKind::ScrollDown => state.scroll_down(3),
        _ => {}
    }
    KeyAction::Continue
}

/// Collapsed (zero-sized) panels cannot take focus.
fn focus_at(col: u16, row: u16, state: &mut AppState) {
    let pos = Position { x: col, y: row };
    let [files, activity, results] = state.panel_rects;

    if files.width > 0 && files.height > 0 && files.contains(pos) {
        state.focus = PanelFocus::Files;
    } else if activity.contains(pos) {
        state.focus = PanelFocus::Activity;
    } else if results.contains(pos) {
        state.focus = PanelFocus::Results;
    }
}
