//! Central application state for the cleanwatch panel.
//!
//! `AppState` owns everything the panel shows: the file picker, the activity
//! feed, the three result panels, and the status bar inputs. It is the
//! `RenderSink` the session controller writes into; no ratatui drawing happens
//! here, the `ui` module only reads it.

use cleanwatch_core::classifier::ClassifierMode;
use cleanwatch_core::result_parser::{DEFAULT_FAILURE_MESSAGE, DEFAULT_SUCCESS_MESSAGE};
use cleanwatch_core::session::RenderSink;
use cleanwatch_core::types::{RenderEvent, RunOutcome, TRANSPORT_ERROR_NOTICE};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;

/// Upper bound on the preview line count adjustable from the keyboard.
pub const MAX_PREVIEW_LINES: u32 = 1000;

/// Which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Help overlay shown above all panels.
    HelpOverlay,
}

/// Which panel currently has keyboard focus.
///
/// Cycle order: `Files` → `Activity` → `Results` → `Files`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    #[default]
    Files,
    Activity,
    Results,
}

impl PanelFocus {
    pub fn prev(self) -> Self {
        match self {
            PanelFocus::Files => PanelFocus::Results,
            PanelFocus::Activity => PanelFocus::Files,
            PanelFocus::Results => PanelFocus::Activity,
        }
    }

    pub fn next(self) -> Self {
        match self {
            PanelFocus::Files => PanelFocus::Activity,
            PanelFocus::Activity => PanelFocus::Results,
            PanelFocus::Results => PanelFocus::Files,
        }
    }
}

/// Styling class of one activity feed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Agent,
    ToolCall,
    ToolOutput,
    Error,
    /// Run started / run closed markers.
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLine {
    pub kind: FeedKind,
    pub text: String,
}

/// Contents of the execution outcome panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub message: String,
}

impl ExecutionOutcome {
    /// The message to show; an empty message falls back to the default
    /// success or failure sentence.
    pub fn display_message(&self) -> &str {
        match (self.message.is_empty(), self.success) {
            (false, _) => &self.message,
            (true, true) => DEFAULT_SUCCESS_MESSAGE,
            (true, false) => DEFAULT_FAILURE_MESSAGE,
        }
    }
}

/// Run state as shown in the status bar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Closed(RunOutcome),
    /// The transport failed; the run will produce nothing more.
    Errored,
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,

    // File picker
    pub files: Vec<String>,
    pub files_loading: bool,
    pub file_list_state: ListState,
    /// The file the current (or last) run was started for.
    pub running_file: Option<String>,

    // Activity feed
    pub feed: Vec<FeedLine>,
    /// Index of the first visible feed line when not following.
    pub feed_scroll: usize,
    /// Keep the newest line in view as the feed grows.
    pub follow: bool,

    // Results column; each panel is hidden while `None`
    pub output_path: Option<String>,
    pub outcome: Option<ExecutionOutcome>,
    pub analysis: Option<String>,
    pub results_scroll: u16,

    // Status bar inputs
    pub run_status: RunStatus,
    pub spinner_frame: usize,
    pub preview_lines: u32,
    /// Mode the next run will classify with.
    pub render_mode: ClassifierMode,
    /// Transient one-line message (validation errors, fetch failures).
    pub status_message: Option<String>,

    pub help_scroll: u16,

    /// Outer rects of `[files, activity, results]` from the last frame, for
    /// mouse click focus.
    pub panel_rects: [Rect; 3],
    pub files_viewport_height: u16,
    pub feed_viewport_height: u16,
    pub results_viewport_height: u16,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            files: Vec::new(),
            files_loading: true,
            file_list_state: ListState::default(),
            running_file: None,
            feed: Vec::new(),
            feed_scroll: 0,
            follow: true,
            output_path: None,
            outcome: None,
            analysis: None,
            results_scroll: 0,
            run_status: RunStatus::default(),
            spinner_frame: 0,
            preview_lines: cleanwatch_core::types::DEFAULT_PREVIEW_LINES,
            render_mode: ClassifierMode::default(),
            status_message: None,
            help_scroll: 0,
            panel_rects: [Rect::default(); 3],
            files_viewport_height: 0,
            feed_viewport_height: 0,
            results_viewport_height: 0,
        }
    }
}

impl AppState {
    pub fn new(preview_lines: u32, render_mode: ClassifierMode) -> Self {
        Self { preview_lines, render_mode, ..Self::default() }
    }

    /// Path of the file highlighted in the picker.
    pub fn selected_file(&self) -> Option<&str> {
        self.file_list_state
            .selected()
            .and_then(|i| self.files.get(i))
            .map(String::as_str)
    }

    /// Replaces the picker contents, keeping the selection on the same path
    /// when it is still listed.
    pub fn set_files(&mut self, files: Vec<String>) {
        let previous = self.selected_file().map(str::to_owned);
        self.files = files;
        self.files_loading = false;
        let index = previous
            .and_then(|p| self.files.iter().position(|f| *f == p))
            .or(if self.files.is_empty() { None } else { Some(0) });
        self.file_list_state.select(index);
    }

    pub fn files_failed(&mut self, message: String) {
        self.files_loading = false;
        self.status_message = Some(format!("could not load file list: {message}"));
    }

    /// Advances the spinner while a run is in flight.
    pub fn on_tick(&mut self) {
        if self.run_status == RunStatus::Running {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    pub fn increase_lines(&mut self) {
        self.preview_lines = (self.preview_lines + 1).min(MAX_PREVIEW_LINES);
    }

    pub fn decrease_lines(&mut self) {
        self.preview_lines = self.preview_lines.saturating_sub(1).max(1);
    }

    /// Empties the activity feed without touching the result panels.
    pub fn clear_feed(&mut self) {
        self.feed.clear();
        self.feed_scroll = 0;
        self.follow = true;
    }

    fn push_feed(&mut self, kind: FeedKind, text: &str) {
        self.feed
            .extend(text.lines().map(|line| FeedLine { kind, text: line.to_owned() }));
    }

    /// First feed line to draw for a viewport of `height` rows.
    pub fn feed_start(&self, height: usize) -> usize {
        let last_page = self.feed.len().saturating_sub(height);
        if self.follow {
            last_page
        } else {
            self.feed_scroll.min(last_page)
        }
    }

    /// Scrolls the focused panel down by `lines` rows.
    ///
    /// Reaching the bottom of the feed turns follow mode back on.
    pub fn scroll_down(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Files => {
                self.file_list_state.scroll_down_by(lines);
            }
            PanelFocus::Activity => {
                let height = self.feed_viewport_height as usize;
                let last_page = self.feed.len().saturating_sub(height);
                self.feed_scroll = self.feed_start(height).saturating_add(lines as usize);
                if self.feed_scroll >= last_page {
                    self.feed_scroll = last_page;
                    self.follow = true;
                }
            }
            PanelFocus::Results => {
                self.results_scroll = self.results_scroll.saturating_add(lines);
            }
        }
    }

    /// Scrolls the focused panel up by `lines` rows. Leaves follow mode.
    pub fn scroll_up(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Files => {
                self.file_list_state.scroll_up_by(lines);
            }
            PanelFocus::Activity => {
                let start = self.feed_start(self.feed_viewport_height as usize);
                self.feed_scroll = start.saturating_sub(lines as usize);
                self.follow = false;
            }
            PanelFocus::Results => {
                self.results_scroll = self.results_scroll.saturating_sub(lines);
            }
        }
    }

    pub fn scroll_top(&mut self) {
        match self.focus {
            PanelFocus::Files => self.file_list_state.select_first(),
            PanelFocus::Activity => {
                self.feed_scroll = 0;
                self.follow = false;
            }
            PanelFocus::Results => self.results_scroll = 0,
        }
    }

    /// Jumps to the bottom. On the feed this re-enables follow mode.
    pub fn scroll_bottom(&mut self) {
        match self.focus {
            PanelFocus::Files => self.file_list_state.select_last(),
            PanelFocus::Activity => self.follow = true,
            PanelFocus::Results => self.results_scroll = u16::MAX,
        }
    }

    fn viewport_height(&self) -> u16 {
        match self.focus {
            PanelFocus::Files => self.files_viewport_height,
            PanelFocus::Activity => self.feed_viewport_height,
            PanelFocus::Results => self.results_viewport_height,
        }
    }

    pub fn half_page_down(&mut self) {
        self.scroll_down((self.viewport_height() / 2).max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up((self.viewport_height() / 2).max(1));
    }

    pub fn full_page_down(&mut self) {
        self.scroll_down(self.viewport_height().max(1));
    }

    pub fn full_page_up(&mut self) {
        self.scroll_up(self.viewport_height().max(1));
    }

    /// Moves the picker selection regardless of focus.
    pub fn prev_file(&mut self) {
        self.file_list_state.scroll_up_by(1);
    }

    pub fn next_file(&mut self) {
        self.file_list_state.scroll_down_by(1);
    }
}

impl RenderSink for AppState {
    fn render(&mut self, event: RenderEvent) {
        match event {
            RenderEvent::RunStarted { file_path, .. } => {
                self.clear_feed();
                self.output_path = None;
                self.outcome = None;
                self.analysis = None;
                self.results_scroll = 0;
                self.status_message = None;
                self.run_status = RunStatus::Running;
                self.push_feed(FeedKind::Notice, &format!("Running cleaner on {file_path}"));
                self.running_file = Some(file_path);
            }
            RenderEvent::Activity { text } => self.push_feed(FeedKind::Agent, &text),
            RenderEvent::ToolCall { text } => self.push_feed(FeedKind::ToolCall, &text),
            RenderEvent::ToolOutput { text } => self.push_feed(FeedKind::ToolOutput, &text),
            RenderEvent::OutputPath { path } => self.output_path = Some(path),
            RenderEvent::ExecutionResult { success, message } => {
                self.outcome = Some(ExecutionOutcome { success, message });
            }
            RenderEvent::AgentAnalysis { content } => self.analysis = Some(content),
            RenderEvent::Closed { outcome } => {
                self.run_status = RunStatus::Closed(outcome);
                self.push_feed(FeedKind::Notice, &format!("Run {}.", outcome.label()));
            }
            RenderEvent::TransportError { .. } => {
                self.run_status = RunStatus::Errored;
                self.push_feed(FeedKind::Error, TRANSPORT_ERROR_NOTICE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanwatch_core::types::RunId;

    fn started() -> AppState {
        let mut state = AppState::default();
        state.render(RenderEvent::RunStarted { run: RunId::new(), file_path: "a.jsonl".into() });
        state
    }

    #[test]
    fn run_started_resets_every_panel() {
        let mut state = started();
        state.render(RenderEvent::Activity { text: "old".into() });
        state.render(RenderEvent::OutputPath { path: "/old.csv".into() });
        state.render(RenderEvent::ExecutionResult { success: false, message: String::new() });
        state.render(RenderEvent::AgentAnalysis { content: "old".into() });

        state.render(RenderEvent::RunStarted { run: RunId::new(), file_path: "b.jsonl".into() });
        assert_eq!(state.feed.len(), 1);
        assert_eq!(state.feed[0].kind, FeedKind::Notice);
        assert!(state.output_path.is_none());
        assert!(state.outcome.is_none());
        assert!(state.analysis.is_none());
        assert_eq!(state.running_file.as_deref(), Some("b.jsonl"));
        assert_eq!(state.run_status, RunStatus::Running);
    }

    #[test]
    fn multi_line_entries_keep_their_kind() {
        let mut state = started();
        state.render(RenderEvent::ToolOutput { text: "row 1\nrow 2".into() });
        let tail: Vec<_> = state.feed[1..].iter().map(|l| (l.kind, l.text.as_str())).collect();
        assert_eq!(tail, vec![(FeedKind::ToolOutput, "row 1"), (FeedKind::ToolOutput, "row 2")]);
    }

    #[test]
    fn empty_execution_message_uses_default_sentence() {
        let ok = ExecutionOutcome { success: true, message: String::new() };
        let failed = ExecutionOutcome { success: false, message: String::new() };
        let custom = ExecutionOutcome { success: false, message: "KeyError".into() };
        assert_eq!(ok.display_message(), DEFAULT_SUCCESS_MESSAGE);
        assert_eq!(failed.display_message(), DEFAULT_FAILURE_MESSAGE);
        assert_eq!(custom.display_message(), "KeyError");
    }

    #[test]
    fn transport_error_appends_fixed_notice() {
        let mut state = started();
        state.render(RenderEvent::TransportError { detail: "connection refused".into() });
        let last = state.feed.last().unwrap();
        assert_eq!(last.kind, FeedKind::Error);
        assert_eq!(last.text, TRANSPORT_ERROR_NOTICE);
        assert_eq!(state.run_status, RunStatus::Errored);
    }

    #[test]
    fn closed_records_outcome() {
        let mut state = started();
        state.render(RenderEvent::Closed { outcome: RunOutcome::Failed });
        assert_eq!(state.run_status, RunStatus::Closed(RunOutcome::Failed));
        assert_eq!(state.feed.last().unwrap().text, "Run failed.");
    }

    #[test]
    fn scrolling_up_leaves_follow_and_bottom_restores_it() {
        let mut state = started();
        for i in 0..20 {
            state.render(RenderEvent::Activity { text: format!("line {i}") });
        }
        state.focus = PanelFocus::Activity;
        state.feed_viewport_height = 5;
        assert_eq!(state.feed_start(5), 16);

        state.scroll_up(3);
        assert!(!state.follow);
        assert_eq!(state.feed_start(5), 13);

        state.render(RenderEvent::Activity { text: "new".into() });
        assert_eq!(state.feed_start(5), 13);

        state.scroll_down(10);
        assert!(state.follow);
        assert_eq!(state.feed_start(5), 17);
    }

    #[test]
    fn set_files_keeps_selected_path() {
        let mut state = AppState::default();
        state.set_files(vec!["a.jsonl".into(), "b.jsonl".into()]);
        assert_eq!(state.selected_file(), Some("a.jsonl"));
        state.next_file();
        assert_eq!(state.selected_file(), Some("b.jsonl"));

        state.set_files(vec!["0.jsonl".into(), "b.jsonl".into(), "c.jsonl".into()]);
        assert_eq!(state.selected_file(), Some("b.jsonl"));

        state.set_files(Vec::new());
        assert_eq!(state.selected_file(), None);
        assert!(!state.files_loading);
    }

    #[test]
    fn preview_lines_stay_in_range() {
        let mut state = AppState::new(1, ClassifierMode::Plain);
        state.decrease_lines();
        assert_eq!(state.preview_lines, 1);
        state.increase_lines();
        assert_eq!(state.preview_lines, 2);
    }
}
