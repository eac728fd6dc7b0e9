//! Integration test for the session controller lifecycle.
//!
//! Exercises: start_run preconditions, handshake delivery, line classification,
//! finalization on close, transport errors, and supersession of an old run.

use cleanwatch_core::classifier::ClassifierMode;
use cleanwatch_core::error::{SessionError, TransportError};
use cleanwatch_core::session::{RenderSink, SessionController, Transport};
use cleanwatch_core::types::{Handshake, RenderEvent, RunId, RunOutcome, SessionPhase};

/// Records every open/discard call instead of touching the network.
#[derive(Default)]
struct FakeTransport {
    opened: Vec<(RunId, Handshake)>,
    discarded: usize,
    refuse: bool,
}

impl Transport for FakeTransport {
    fn open(&mut self, run: RunId, handshake: &Handshake) -> Result<(), TransportError> {
        if self.refuse {
            return Err(TransportError::Send("refused".into()));
        }
        self.opened.push((run, handshake.clone()));
        Ok(())
    }

    fn discard(&mut self) {
        self.discarded += 1;
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Vec<RenderEvent>,
}

impl RenderSink for RecordingSink {
    fn render(&mut self, event: RenderEvent) {
        self.events.push(event);
    }
}

fn controller() -> SessionController<FakeTransport> {
    SessionController::new(FakeTransport::default(), ClassifierMode::Classified)
}

#[test]
fn full_run_lifecycle() {
    let mut ctl = controller();
    let mut sink = RecordingSink::default();

    let run = ctl.start_run(Some("input_jsonl/mixed_example.jsonl"), None, &mut sink).unwrap();
    assert_eq!(ctl.state().phase, SessionPhase::Running);
    assert_eq!(
        ctl.transport().opened,
        vec![(run, Handshake { file_path: "input_jsonl/mixed_example.jsonl".into(), lines: 3 })]
    );

    for line in [
        "=== Run starting ===",
        "--- switched to: Validator ---",
        "[calling tool → load_data]",
        "[tool output] {\"id\": 1, \"Name\": null}",
        "Issues: key `Name` is not snake_case Current script: import json",
        "    for record in data:",
        "",
        "=== Run complete ===",
        r#"Final output: {"output_path": "/data/out.csv", "success": true}"#,
    ] {
        ctl.handle_line(run, line, &mut sink);
    }

    assert_eq!(ctl.state().final_output_text.as_deref(), Some(r#"{"output_path": "/data/out.csv", "success": true}"#));
    assert_eq!(ctl.state().captured_output_path.as_deref(), Some("/data/out.csv"));

    ctl.handle_close(run, &mut sink);
    assert_eq!(ctl.state().phase, SessionPhase::Closed);
    assert_eq!(ctl.outcome(), Some(RunOutcome::Completed));

    let path = RenderEvent::OutputPath { path: "/data/out.csv".into() };
    let ok = RenderEvent::ExecutionResult { success: true, message: String::new() };
    assert_eq!(
        sink.events,
        vec![
            RenderEvent::RunStarted { run, file_path: "input_jsonl/mixed_example.jsonl".into() },
            RenderEvent::Activity { text: "=== Run starting ===".into() },
            RenderEvent::Activity { text: "--- switched to: Validator ---".into() },
            RenderEvent::ToolCall { text: "[calling tool → load_data]".into() },
            RenderEvent::ToolOutput { text: "{\"id\": 1, \"Name\": null}".into() },
            RenderEvent::Activity { text: "Issues: key `Name` is not snake_case".into() },
            RenderEvent::Activity { text: "=== Run complete ===".into() },
            path.clone(),
            ok.clone(),
            // Re-parsed on close.
            path,
            ok,
            RenderEvent::Closed { outcome: RunOutcome::Completed },
        ]
    );
}

#[test]
fn missing_file_is_rejected_before_transport_opens() {
    let mut ctl = controller();
    let mut sink = RecordingSink::default();

    let err = ctl.start_run(None, Some(3), &mut sink).unwrap_err();
    assert!(matches!(err, SessionError::NoFileSelected));
    assert!(ctl.transport().opened.is_empty());
    assert!(sink.events.is_empty());
    assert_eq!(ctl.state().phase, SessionPhase::Idle);
}

#[test]
fn refused_transport_leaves_controller_idle() {
    let mut ctl = SessionController::new(
        FakeTransport { refuse: true, ..Default::default() },
        ClassifierMode::Classified,
    );
    let mut sink = RecordingSink::default();

    let err = ctl.start_run(Some("a.jsonl"), None, &mut sink).unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
    assert_eq!(ctl.current_run(), None);
    assert_eq!(ctl.state().phase, SessionPhase::Idle);
    assert!(sink.events.is_empty());
}

#[test]
fn close_without_final_output() {
    let mut ctl = controller();
    let mut sink = RecordingSink::default();
    let run = ctl.start_run(Some("a.jsonl"), Some(5), &mut sink).unwrap();

    ctl.handle_line(run, "Validation still running", &mut sink);
    ctl.handle_close(run, &mut sink);

    assert_eq!(ctl.outcome(), Some(RunOutcome::ClosedWithoutResult));
    assert_eq!(
        sink.events.last(),
        Some(&RenderEvent::Closed { outcome: RunOutcome::ClosedWithoutResult })
    );
    // Nothing synthesized beyond the close notice.
    assert_eq!(sink.events.len(), 3);
}

#[test]
fn reported_failure_marks_run_failed() {
    let mut ctl = controller();
    let mut sink = RecordingSink::default();
    let run = ctl.start_run(Some("a.jsonl"), None, &mut sink).unwrap();

    ctl.handle_line(run, r#"Final output: {"success": false, "message": "KeyError"}"#, &mut sink);
    ctl.handle_close(run, &mut sink);

    assert_eq!(ctl.outcome(), Some(RunOutcome::Failed));
}

#[test]
fn plain_text_final_output_is_finalized_on_close() {
    let mut ctl = controller();
    let mut sink = RecordingSink::default();
    let run = ctl.start_run(Some("a.jsonl"), None, &mut sink).unwrap();

    ctl.handle_line(
        run,
        "Final output:\nCleaned data available at: /tmp/clean.jsonl\nFinished successfully.",
        &mut sink,
    );
    assert_eq!(ctl.state().captured_output_path.as_deref(), Some("/tmp/clean.jsonl"));
    ctl.handle_close(run, &mut sink);

    assert_eq!(ctl.outcome(), Some(RunOutcome::Completed));
    let outcome_panels = sink
        .events
        .iter()
        .filter(|e| matches!(e, RenderEvent::ExecutionResult { success: true, .. }))
        .count();
    assert_eq!(outcome_panels, 2);
}

#[test]
fn second_final_output_does_not_replace_first() {
    let mut ctl = controller();
    let mut sink = RecordingSink::default();
    let run = ctl.start_run(Some("a.jsonl"), None, &mut sink).unwrap();

    ctl.handle_line(run, r#"Final output: {"output_path": "/first.csv"}"#, &mut sink);
    ctl.handle_line(run, r#"Final output: {"output_path": "/second.csv"}"#, &mut sink);

    assert_eq!(
        ctl.state().final_output_text.as_deref(),
        Some(r#"{"output_path": "/first.csv"}"#)
    );
    // The second payload is still rendered as an independent finalization.
    assert!(sink.events.contains(&RenderEvent::OutputPath { path: "/second.csv".into() }));
}

#[test]
fn transport_error_renders_notice_and_keeps_running() {
    let mut ctl = controller();
    let mut sink = RecordingSink::default();
    let run = ctl.start_run(Some("a.jsonl"), None, &mut sink).unwrap();

    ctl.handle_error(run, "connection reset", &mut sink);

    assert!(ctl.state().errored);
    assert_eq!(ctl.state().phase, SessionPhase::Running);
    assert_eq!(
        sink.events.last(),
        Some(&RenderEvent::TransportError { detail: "connection reset".into() })
    );
}

#[test]
fn superseded_run_never_reaches_sink() {
    let mut ctl = controller();
    let mut sink = RecordingSink::default();

    let old = ctl.start_run(Some("old.jsonl"), None, &mut sink).unwrap();
    ctl.handle_line(old, "Cleaned data available at: /old.csv", &mut sink);
    let new = ctl.start_run(Some("new.jsonl"), None, &mut sink).unwrap();

    assert_ne!(old, new);
    assert_eq!(ctl.transport().discarded, 1);
    assert_eq!(ctl.state().captured_output_path, None);

    sink.events.clear();
    ctl.handle_line(old, "late line from old run", &mut sink);
    ctl.handle_error(old, "old socket died", &mut sink);
    ctl.handle_close(old, &mut sink);
    assert!(sink.events.is_empty());

    ctl.handle_line(new, "fresh line", &mut sink);
    assert_eq!(sink.events, vec![RenderEvent::Activity { text: "fresh line".into() }]);
}

#[test]
fn lines_after_close_are_dropped() {
    let mut ctl = controller();
    let mut sink = RecordingSink::default();
    let run = ctl.start_run(Some("a.jsonl"), None, &mut sink).unwrap();
    ctl.handle_close(run, &mut sink);
    let before = sink.events.len();

    ctl.handle_line(run, "straggler", &mut sink);
    ctl.handle_close(run, &mut sink);
    assert_eq!(sink.events.len(), before);
}

#[test]
fn mode_change_applies_to_next_run() {
    let mut ctl = controller();
    let mut sink = RecordingSink::default();
    let first = ctl.start_run(Some("a.jsonl"), None, &mut sink).unwrap();
    ctl.set_mode(ClassifierMode::Plain);

    ctl.handle_line(first, "    x = 1", &mut sink);
    assert_eq!(sink.events.len(), 1, "classified run still suppresses code");

    let second = ctl.start_run(Some("a.jsonl"), None, &mut sink).unwrap();
    ctl.handle_line(second, "    x = 1", &mut sink);
    assert_eq!(sink.events.last(), Some(&RenderEvent::Activity { text: "    x = 1".into() }));
}
