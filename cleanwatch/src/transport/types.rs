//! Owned event types produced by the websocket worker task.
//!
//! Everything here is `Send` so it can cross from the worker task to the main
//! loop inside `AppEvent::Transport`.

use cleanwatch_core::types::RunId;

/// Traffic from one transport session, in arrival order.
///
/// A session produces any number of `Line`s followed by exactly one `Closed`
/// or one `Error`, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One inbound message, normalised to a single logical line.
    Line { run: RunId, text: String },
    /// The server closed the session cleanly.
    Closed { run: RunId },
    /// Connecting, sending the handshake, or reading failed.
    Error { run: RunId, message: String },
}

impl TransportEvent {
    pub fn run(&self) -> RunId {
        match self {
            TransportEvent::Line { run, .. }
            | TransportEvent::Closed { run }
            | TransportEvent::Error { run, .. } => *run,
        }
    }

    /// True for the last event a session will ever produce.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransportEvent::Line { .. })
    }
}
