//! Owned data types shared by the classifier, the result parser, and the
//! session controller.
//!
//! Every type here is fully owned and `Send` so values can move between the
//! transport task and the UI loop without borrowing.

use std::fmt;

use serde::Serialize;

use crate::error::SessionError;

/// Preview line count sent in the handshake when the caller does not set one.
pub const DEFAULT_PREVIEW_LINES: u32 = 3;

/// Identifies one run of the external cleaning process.
///
/// A fresh id is minted for every run request. Transport events carry the id of
/// the run that produced them so the controller can drop anything that arrives
/// from a superseded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(uuid::Uuid);

impl RunId {
    /// Mints a new random (UUID v4) run id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The single outcome of classifying one inbound line.
///
/// Exactly one variant is produced per processed line. `Suppressed` carries no
/// payload and never reaches the render sink. `FinalOutputCaptured` is the
/// classification of the final-output marker line; the events the result parser
/// derives from its payload are what actually get rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationResult {
    Suppressed,
    ActivityItem { text: String },
    ToolCall { text: String },
    ToolOutput { text: String },
    OutputPathFound { path: String },
    ExecutionResult { success: bool, message: String },
    AgentAnalysis { content: String },
    FinalOutputCaptured { raw: String },
}

/// Fields decoded from a JSON final-output payload.
///
/// All fields are optional; only the ones present (and well-typed) are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredResult {
    pub output_path: Option<String>,
    pub success: Option<bool>,
    pub message: Option<String>,
    pub kind: Option<String>, // the payload's `type` field
    pub content: Option<String>,
}

/// Lifecycle phase of one [`SessionState`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
    Closed,
}

/// Terminal outcome of a run, decided when the transport closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Final output was captured and no execution failure was reported.
    Completed,
    /// Final output was captured and the last reported execution failed.
    Failed,
    /// The transport closed without ever delivering a final-output line.
    ClosedWithoutResult,
}

impl RunOutcome {
    pub fn label(self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::Failed => "failed",
            RunOutcome::ClosedWithoutResult => "closed without result",
        }
    }
}

/// A state change requested by a classification.
///
/// The classifier never mutates state itself; it returns these and the
/// controller applies them in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateMutation {
    /// Store the final-output payload (first capture wins).
    CaptureFinalOutput(String),
    /// Remember the announced output path.
    CaptureOutputPath(String),
    /// Remember the most recent execution verdict.
    RecordExecution(bool),
}

impl StateMutation {
    /// Derives the mutations implied by a batch of emitted events.
    pub fn from_events(events: &[ClassificationResult]) -> Vec<StateMutation> {
        events
            .iter()
            .filter_map(|e| match e {
                ClassificationResult::OutputPathFound { path } => {
                    Some(StateMutation::CaptureOutputPath(path.clone()))
                }
                ClassificationResult::ExecutionResult { success, .. } => {
                    Some(StateMutation::RecordExecution(*success))
                }
                _ => None,
            })
            .collect()
    }
}

/// Mutable per-run state, exclusively owned by the session controller.
///
/// Constructed (or reset) at the start of every run and never shared with a
/// later run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub final_output_text: Option<String>,
    pub captured_output_path: Option<String>,
    pub phase: SessionPhase,
    /// Verdict of the most recent `ExecutionResult` event in this run.
    pub last_success: Option<bool>,
    /// Set once the transport reported an error for this run.
    pub errored: bool,
}

impl SessionState {
    /// Discards everything from the previous run and returns to `Idle`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Applies one mutation.
    ///
    /// `final_output_text` is set at most once per run; a second capture leaves
    /// the stored payload untouched. `captured_output_path` is only ever
    /// replaced by a newer announcement, never cleared.
    pub fn apply(&mut self, mutation: StateMutation) {
        match mutation {
            StateMutation::CaptureFinalOutput(raw) => {
                if self.final_output_text.is_none() {
                    self.final_output_text = Some(raw);
                } else {
                    tracing::debug!("final output already captured; keeping first payload");
                }
            }
            StateMutation::CaptureOutputPath(path) => {
                self.captured_output_path = Some(path);
            }
            StateMutation::RecordExecution(success) => {
                self.last_success = Some(success);
            }
        }
    }
}

/// The outbound handshake, sent once immediately after the transport opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Handshake {
    pub file_path: String,
    pub lines: u32,
}

impl Handshake {
    /// Validates the run request before any transport is opened.
    ///
    /// # Errors
    ///
    /// `SessionError::NoFileSelected` when `file_path` is absent or blank, and
    /// `SessionError::InvalidLineCount` when `lines` is zero.
    pub fn new(file_path: Option<&str>, lines: Option<u32>) -> Result<Self, SessionError> {
        let file_path = file_path
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(SessionError::NoFileSelected)?;
        let lines = lines.unwrap_or(DEFAULT_PREVIEW_LINES);
        if lines == 0 {
            return Err(SessionError::InvalidLineCount(lines));
        }
        Ok(Self { file_path: file_path.to_owned(), lines })
    }
}

/// Typed presentation events delivered to a [`crate::session::RenderSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// A new run started; sinks should clear everything from the previous one.
    RunStarted { run: RunId, file_path: String },
    /// Generic activity log entry.
    Activity { text: String },
    ToolCall { text: String },
    ToolOutput { text: String },
    /// Reveal and populate the output-path panel.
    OutputPath { path: String },
    /// Reveal the outcome panel, styled by `success`.
    ExecutionResult { success: bool, message: String },
    /// Reveal the analysis panel.
    AgentAnalysis { content: String },
    /// The transport closed; the run reached `outcome`.
    Closed { outcome: RunOutcome },
    /// The transport failed. Sinks show [`TRANSPORT_ERROR_NOTICE`]; `detail` is
    /// for logs.
    TransportError { detail: String },
}

/// Fixed notice appended to the activity feed on a transport error.
pub const TRANSPORT_ERROR_NOTICE: &str = "WebSocket error occurred. Please try again.";

impl RenderEvent {
    /// Maps a classification 1:1 onto a render event.
    ///
    /// Returns `None` for `Suppressed` and for `FinalOutputCaptured`, whose
    /// payload is rendered through the events the result parser derives from it.
    pub fn from_classification(result: ClassificationResult) -> Option<Self> {
        match result {
            ClassificationResult::Suppressed
            | ClassificationResult::FinalOutputCaptured { .. } => None,
            ClassificationResult::ActivityItem { text } => Some(RenderEvent::Activity { text }),
            ClassificationResult::ToolCall { text } => Some(RenderEvent::ToolCall { text }),
            ClassificationResult::ToolOutput { text } => Some(RenderEvent::ToolOutput { text }),
            ClassificationResult::OutputPathFound { path } => {
                Some(RenderEvent::OutputPath { path })
            }
            ClassificationResult::ExecutionResult { success, message } => {
                Some(RenderEvent::ExecutionResult { success, message })
            }
            ClassificationResult::AgentAnalysis { content } => {
                Some(RenderEvent::AgentAnalysis { content })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_defaults_lines_and_trims_path() {
        let hs = Handshake::new(Some("  input_jsonl/a.jsonl "), None).unwrap();
        assert_eq!(hs.file_path, "input_jsonl/a.jsonl");
        assert_eq!(hs.lines, DEFAULT_PREVIEW_LINES);
    }

    #[test]
    fn handshake_rejects_missing_file_and_zero_lines() {
        assert!(matches!(Handshake::new(None, Some(3)), Err(SessionError::NoFileSelected)));
        assert!(matches!(Handshake::new(Some("   "), None), Err(SessionError::NoFileSelected)));
        assert!(matches!(
            Handshake::new(Some("a.jsonl"), Some(0)),
            Err(SessionError::InvalidLineCount(0))
        ));
    }

    #[test]
    fn handshake_serializes_with_wire_field_names() {
        let hs = Handshake::new(Some("input_jsonl/a.jsonl"), Some(5)).unwrap();
        let json = serde_json::to_value(&hs).unwrap();
        assert_eq!(json, serde_json::json!({"file_path": "input_jsonl/a.jsonl", "lines": 5}));
    }

    #[test]
    fn final_output_is_captured_once() {
        let mut state = SessionState::default();
        state.apply(StateMutation::CaptureFinalOutput("first".into()));
        state.apply(StateMutation::CaptureFinalOutput("second".into()));
        assert_eq!(state.final_output_text.as_deref(), Some("first"));
    }

    #[test]
    fn reset_clears_captured_path() {
        let mut state = SessionState::default();
        state.apply(StateMutation::CaptureOutputPath("/out.csv".into()));
        state.phase = SessionPhase::Running;
        state.reset();
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn suppressed_and_final_output_do_not_render() {
        assert_eq!(RenderEvent::from_classification(ClassificationResult::Suppressed), None);
        assert_eq!(
            RenderEvent::from_classification(ClassificationResult::FinalOutputCaptured {
                raw: "{}".into()
            }),
            None
        );
    }
}
