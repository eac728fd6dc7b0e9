//! Help overlay: a centred modal drawn over the panels.
//!
//! `Clear` erases the area first so the overlay needs no second draw call.

use ratatui::{
    Frame,
    layout::Constraint,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Draws the overlay scrolled by `help_scroll` rows.
///
/// Skipped below 40 columns, where the centred area would be too small to
/// hold the border.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 40 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help (j/k scroll, ? or Esc to close) ")
        .border_style(ratatui::style::Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Navigation"),
        Line::from("  j / k         Scroll down / up one line"),
        Line::from("  g / G         Jump to top / bottom (G resumes following the feed)"),
        Line::from("  Ctrl-d / u    Scroll half page down / up"),
        Line::from("  Ctrl-f / b    Scroll full page down / up"),
        Line::from("  H / L         Move panel focus left / right"),
        Line::from(""),
        Line::from("Runs"),
        Line::from("  { / }         Previous / next file"),
        Line::from("  Enter         Run the cleaner on the selected file"),
        Line::from("  + / -         More / fewer preview lines"),
        Line::from("  p             Toggle classified / plain feed (next run)"),
        Line::from("  r             Refresh the file list"),
        Line::from("  c             Clear the activity feed"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help"),
        Line::from("  q / Esc       Quit"),
    ])
}
