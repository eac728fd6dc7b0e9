//! File picker panel: the server's input files, one per row.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::panel_block;

/// Renders the picker with `render_stateful_widget` so the selection highlight
/// follows `state.file_list_state`. The file count goes in the title.
pub fn render_file_list(frame: &mut Frame, area: Rect, focus: PanelFocus, state: &mut AppState, theme: &Theme) {
    let is_focused = focus == PanelFocus::Files;
    let title = if state.files.is_empty() {
        "Files".to_owned()
    } else {
        format!("Files ({})", state.files.len())
    };
    let block = panel_block(&title, is_focused, theme);

    let items: Vec<ListItem> = if state.files.is_empty() {
        let msg = if state.files_loading { "Loading..." } else { "No files (r to refresh)" };
        vec![ListItem::new(Line::styled(msg, Style::default().fg(theme.muted)))]
    } else {
        state
            .files
            .iter()
            .map(|path| file_item(path, state.running_file.as_deref() == Some(path), theme))
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(theme.file_selected).add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(list, area, &mut state.file_list_state);
}

/// `▶ ` marks the file of the current run.
fn file_item<'a>(path: &'a str, running: bool, theme: &Theme) -> ListItem<'a> {
    let marker = if running {
        Span::styled("▶ ", Style::default().fg(theme.file_running))
    } else {
        Span::raw("  ")
    };
    ListItem::new(Line::from(vec![marker, Span::raw(path)]))
}
