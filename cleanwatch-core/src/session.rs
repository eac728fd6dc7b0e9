//! Session controller: the state machine that owns one run at a time.
//!
//! ```text
//! Idle ──start_run──▶ Running ──close──▶ Completed | Failed | ClosedWithoutResult
//!                        │
//!                        └──error──▶ terminal error notice (phase stays Running)
//! ```
//!
//! The controller never performs I/O itself. It talks to the outside world
//! through two seams: a [`Transport`] that it asks to open (and discard) duplex
//! sessions, and a [`RenderSink`] that receives every presentation event. The
//! host feeds inbound transport traffic back in through [`SessionController::handle_line`],
//! [`SessionController::handle_close`] and [`SessionController::handle_error`],
//! tagged with the [`RunId`] the transport was opened with. Traffic for any other
//! run id is dropped, so nothing from a superseded run ever reaches the sink.

use tracing::{debug, info, trace, warn};

use crate::classifier::{ClassifierMode, LineClassifier};
use crate::error::{SessionError, TransportError};
use crate::result_parser;
use crate::types::{
    ClassificationResult, Handshake, RenderEvent, RunId, RunOutcome, SessionPhase, SessionState,
    StateMutation,
};

/// Opens and discards duplex text sessions on behalf of the controller.
///
/// `open` must send `handshake` as soon as the channel is up and then report
/// every inbound line, the close, or an error back to the host tagged with `run`.
pub trait Transport {
    /// Opens a new session for `run`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the session cannot be set up at all. Failures
    /// that happen later (connect refused, read error) are reported through the
    /// host's event channel instead.
    fn open(&mut self, run: RunId, handshake: &Handshake) -> Result<(), TransportError>;

    /// Drops the current session without draining it.
    fn discard(&mut self);
}

/// Receives typed presentation events.
pub trait RenderSink {
    fn render(&mut self, event: RenderEvent);
}

impl<S: RenderSink + ?Sized> RenderSink for &mut S {
    fn render(&mut self, event: RenderEvent) {
        (**self).render(event);
    }
}

/// Drives one run at a time: resets state, opens the transport, classifies
/// inbound lines, and finalizes on close.
pub struct SessionController<T: Transport> {
    transport: T,
    mode: ClassifierMode,
    classifier: LineClassifier,
    state: SessionState,
    run: Option<RunId>,
    outcome: Option<RunOutcome>,
}

impl<T: Transport> SessionController<T> {
    pub fn new(transport: T, mode: ClassifierMode) -> Self {
        Self {
            transport,
            mode,
            classifier: LineClassifier::new(mode),
            state: SessionState::default(),
            run: None,
            outcome: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Outcome of the current run, once its transport has closed.
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    pub fn current_run(&self) -> Option<RunId> {
        self.run
    }

    /// Classifier mode that the next run will use.
    pub fn mode(&self) -> ClassifierMode {
        self.mode
    }

    /// Changes the classifier mode. Takes effect at the next `start_run`.
    pub fn set_mode(&mut self, mode: ClassifierMode) {
        self.mode = mode;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Starts a new run for `file_path`.
    ///
    /// Validates the request first; nothing is opened when no file is selected.
    /// Any run still in flight is discarded (not drained), the session state is
    /// reset, and `RunStarted` is rendered once the transport has accepted the
    /// handshake.
    ///
    /// # Errors
    ///
    /// `SessionError::NoFileSelected` / `InvalidLineCount` on a bad request, or
    /// `SessionError::Transport` if the transport refuses to open. In the latter
    /// case the controller is left `Idle` with no current run.
    pub fn start_run(
        &mut self,
        file_path: Option<&str>,
        lines: Option<u32>,
        sink: &mut impl RenderSink,
    ) -> Result<RunId, SessionError> {
        let handshake = Handshake::new(file_path, lines)?;

        if let Some(previous) = self.run.take() {
            debug!(run_id = %previous, "discarding previous run");
            self.transport.discard();
        }

        self.state.reset();
        self.outcome = None;
        self.classifier = LineClassifier::new(self.mode);

        let run = RunId::new();
        info!(
            run_id = %run,
            file_path = %handshake.file_path,
            lines = handshake.lines,
            mode = self.mode.label(),
            "starting run"
        );

        self.transport.open(run, &handshake)?;
        self.run = Some(run);
        self.state.phase = SessionPhase::Running;
        sink.render(RenderEvent::RunStarted { run, file_path: handshake.file_path });
        Ok(run)
    }

    /// Classifies one inbound line and renders its events.
    pub fn handle_line(&mut self, run: RunId, line: &str, sink: &mut impl RenderSink) {
        if !self.accepts(run) {
            trace!(run_id = %run, "dropping line from inactive run");
            return;
        }
        let classification = self.classifier.classify(line);
        trace!(rule = classification.rule, "classified line");
        for mutation in classification.mutations {
            self.state.apply(mutation);
        }
        self.emit(classification.events, sink);
    }

    /// Finalizes the run after the transport closed.
    ///
    /// A captured final-output payload is parsed once more here, so the result
    /// panels are populated even if the marker line was only partially handled
    /// on arrival. Always ends with a `Closed` notice.
    pub fn handle_close(&mut self, run: RunId, sink: &mut impl RenderSink) {
        if !self.accepts(run) {
            trace!(run_id = %run, "ignoring close from inactive run");
            return;
        }

        if let Some(raw) = self.state.final_output_text.clone() {
            let events = result_parser::parse(&raw);
            for mutation in StateMutation::from_events(&events) {
                self.state.apply(mutation);
            }
            self.emit(events, sink);
        }

        let outcome = match (&self.state.final_output_text, self.state.last_success) {
            (None, _) => RunOutcome::ClosedWithoutResult,
            (Some(_), Some(false)) => RunOutcome::Failed,
            (Some(_), _) => RunOutcome::Completed,
        };
        info!(run_id = %run, outcome = outcome.label(), "run closed");

        self.state.phase = SessionPhase::Closed;
        self.outcome = Some(outcome);
        sink.render(RenderEvent::Closed { outcome });
    }

    /// Surfaces a transport failure as the terminal error notice.
    ///
    /// The phase is left `Running`; no retry or reconnect is attempted.
    pub fn handle_error(&mut self, run: RunId, detail: &str, sink: &mut impl RenderSink) {
        if !self.accepts(run) {
            trace!(run_id = %run, "ignoring error from inactive run");
            return;
        }
        warn!(run_id = %run, detail, "transport error");
        self.state.errored = true;
        sink.render(RenderEvent::TransportError { detail: detail.to_owned() });
    }

    /// True when `run` is the current run and it is still running.
    fn accepts(&self, run: RunId) -> bool {
        self.run == Some(run) && self.state.phase == SessionPhase::Running
    }

    fn emit(&self, events: Vec<ClassificationResult>, sink: &mut impl RenderSink) {
        for event in events.into_iter().filter_map(RenderEvent::from_classification) {
            sink.render(event);
        }
    }
}
