//! Activity feed renderer.
//!
//! Uses a List with manual virtual scrolling: only the visible window of
//! `state.feed` is turned into `ListItem`s each frame, so long runs stay cheap
//! to draw.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};

use crate::app::{AppState, FeedKind, FeedLine, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_feed(frame: &mut Frame, area: Rect, focus: PanelFocus, state: &AppState, theme: &Theme) {
    let is_focused = focus == PanelFocus::Activity;
    let title = if state.follow { "Activity" } else { "Activity (paused, G to follow)" };
    let block = panel_block(title, is_focused, theme);
    let inner = inner_rect(area);
    let viewport_height = inner.height as usize;

    frame.render_widget(block, area);

    if state.feed.is_empty() {
        let hint = Line::styled(
            "Select a file and press Enter to run the cleaner.",
            Style::default().fg(theme.muted),
        );
        frame.render_widget(List::new(vec![ListItem::new(hint)]), inner);
        return;
    }

    let start = state.feed_start(viewport_height);
    let end = (start + viewport_height).min(state.feed.len());

    let items: Vec<ListItem> = state.feed[start..end]
        .iter()
        .map(|line| ListItem::new(feed_line(line, theme)))
        .collect();

    frame.render_widget(List::new(items), inner);
}

fn feed_line<'a>(line: &'a FeedLine, theme: &Theme) -> Line<'a> {
    match line.kind {
        FeedKind::Agent => Line::styled(line.text.as_str(), Style::default().fg(theme.feed_agent)),
        FeedKind::ToolCall => Line::styled(
            line.text.as_str(),
            Style::default().fg(theme.feed_tool_call).add_modifier(Modifier::BOLD),
        ),
        FeedKind::ToolOutput => Line::from(vec![
            Span::styled("  │ ", Style::default().fg(theme.muted)),
            Span::styled(line.text.as_str(), Style::default().fg(theme.feed_tool_output)),
        ]),
        FeedKind::Error => Line::styled(
            line.text.as_str(),
            Style::default().fg(theme.feed_error).add_modifier(Modifier::BOLD),
        ),
        FeedKind::Notice => Line::styled(
            line.text.as_str(),
            Style::default().fg(theme.feed_notice).add_modifier(Modifier::ITALIC),
        ),
    }
}
