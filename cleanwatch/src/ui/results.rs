//! Results column: output path, execution outcome, and agent analysis.
//!
//! Each section stays hidden until its event arrives in the current run.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Paragraph, Wrap},
};

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_results(frame: &mut Frame, area: Rect, focus: PanelFocus, state: &AppState, theme: &Theme) {
    let is_focused = focus == PanelFocus::Results;
    frame.render_widget(panel_block("Results", is_focused, theme), area);

    let text = results_text(state, theme);
    let body = if text.lines.is_empty() {
        Text::styled("No results yet.", Style::default().fg(theme.muted))
    } else {
        text
    };

    frame.render_widget(
        Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .scroll((state.results_scroll, 0)),
        inner_rect(area),
    );
}

fn heading(title: &str, theme: &Theme) -> Line<'static> {
    Line::styled(
        title.to_owned(),
        Style::default().fg(theme.border_active).add_modifier(Modifier::BOLD),
    )
}

fn results_text<'a>(state: &'a AppState, theme: &Theme) -> Text<'a> {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(path) = &state.output_path {
        lines.push(heading("Cleaned output", theme));
        lines.push(Line::styled(path.as_str(), Style::default().fg(theme.output_path)));
        lines.push(Line::default());
    }

    if let Some(outcome) = &state.outcome {
        let (label, color) = if outcome.success {
            ("Execution succeeded", theme.result_success)
        } else {
            ("Execution failed", theme.result_failure)
        };
        lines.push(heading(label, theme));
        lines.extend(
            outcome
                .display_message()
                .lines()
                .map(|l| Line::styled(l, Style::default().fg(color))),
        );
        lines.push(Line::default());
    }

    if let Some(analysis) = &state.analysis {
        lines.push(heading("Agent analysis", theme));
        lines.extend(
            analysis
                .lines()
                .map(|l| Line::styled(l, Style::default().fg(theme.analysis))),
        );
    }

    Text::from(lines)
}
