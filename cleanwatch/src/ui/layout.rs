//! Responsive 3-panel layout for the cleanwatch panel.
//!
//! Pure layout arithmetic plus the shared panel chrome (bordered blocks and
//! the status bar). Recomputed inside every `terminal.draw()` so it always
//! reflects the live terminal size.
//!
//! At `>= 100` columns the file picker, activity feed, and results column sit
//! side by side (22 / 48 / 30). Narrower terminals stack the results column
//! under the feed and collapse the picker; `{`/`}` still move its selection.
//!
//! `Spacing::Overlap(1)` with `MergeStrategy::Fuzzy` lets neighbouring borders
//! share one column and merge their junction glyphs.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, RunStatus};
use crate::theme::Theme;
use cleanwatch_core::types::RunOutcome;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Returns `[files, activity, results, status_bar]` for the current frame.
pub fn compute_layout(frame: &Frame) -> [Rect; 4] {
    let wide = frame.area().width >= 100;

    let [main_area, status_bar] =
        frame.area().layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    if wide {
        let [files, activity, results] = main_area.layout(
            &Layout::horizontal([
                Constraint::Percentage(22),
                Constraint::Percentage(48),
                Constraint::Percentage(30),
            ])
            .spacing(Spacing::Overlap(1)),
        );
        [files, activity, results, status_bar]
    } else {
        let [files, activity, results] = main_area.layout(
            &Layout::vertical([Constraint::Length(0), Constraint::Fill(3), Constraint::Fill(2)])
                .spacing(Spacing::Overlap(1)),
        );
        [files, activity, results, status_bar]
    }
}

/// Inner `Rect` of a bordered panel.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Bordered block for a panel: thick border in the active color when focused.
///
/// `Fuzzy` merging is needed because `Exact` produces wrong junctions where
/// `Thick` and `Plain` borders meet.
pub fn panel_block<'a>(title: &'a str, is_focused: bool, theme: &'a Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar: run state, preview lines, render mode, and
/// any transient status message.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (status_text, status_fg) = match state.run_status {
        RunStatus::Idle => (" IDLE ".to_owned(), theme.status_idle),
        RunStatus::Running => (
            format!(" RUNNING {} ", SPINNER[state.spinner_frame % SPINNER.len()]),
            theme.status_running,
        ),
        RunStatus::Closed(RunOutcome::Failed) => (" FAILED ".to_owned(), theme.status_error),
        RunStatus::Closed(outcome) => {
            (format!(" {} ", outcome.label().to_uppercase()), theme.status_closed)
        }
        RunStatus::Errored => (" ERROR ".to_owned(), theme.status_error),
    };

    let mut spans = vec![
        Span::styled(status_text, Style::default().fg(status_fg).add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " lines: {}  mode: {} ",
            state.preview_lines,
            state.render_mode.label()
        )),
    ];
    if let Some(file) = &state.running_file {
        spans.push(Span::raw(format!(" {file} ")));
    }
    if let Some(message) = &state.status_message {
        spans.push(Span::styled(format!(" {message}"), Style::default().fg(theme.status_error)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
