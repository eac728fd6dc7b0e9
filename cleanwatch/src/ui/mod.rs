//! Panel rendering.
//!
//! `render()` is the single entry point called from the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; each
//! panel has its own module.

mod layout;
pub mod activity_feed;
pub mod file_picker;
pub mod help;
pub mod keybindings;
pub mod results;

use ratatui::{Frame, style::Style, widgets::Block};

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_status_bar};

/// Renders one complete frame.
///
/// Viewport heights and panel rects are written back into `state` first so
/// the next keypress or click can use them.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [files, activity, results, status_bar] = compute_layout(frame);

    state.files_viewport_height = inner_rect(files).height;
    state.feed_viewport_height = inner_rect(activity).height;
    state.results_viewport_height = inner_rect(results).height;
    state.panel_rects = [files, activity, results];

    let focus = state.focus;

    frame.render_widget(Block::default().style(Style::default().bg(theme.background)), frame.area());

    if files.width > 0 && files.height > 0 {
        file_picker::render_file_list(frame, files, focus, state, theme);
    }
    activity_feed::render_feed(frame, activity, focus, state, theme);
    results::render_results(frame, results, focus, state, theme);
    render_status_bar(frame, status_bar, state, theme);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}
