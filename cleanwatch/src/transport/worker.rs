//! Background task that owns one websocket session for its lifetime.
//!
//! The task connects, sends the handshake as a single JSON text frame, and then
//! forwards every inbound text frame as `TransportEvent::Line`. It ends with a
//! single `Closed` (close frame or end of stream) or a single `Error`.
//! Aborting the task drops the socket without draining it.

use cleanwatch_core::error::TransportError;
use cleanwatch_core::session::Transport;
use cleanwatch_core::types::{Handshake, RunId};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};

use crate::event::AppEvent;
use crate::transport::types::TransportEvent;

/// Websocket implementation of the core `Transport` seam.
///
/// Holds at most one live worker task. Opening a new session or dropping the
/// transport aborts the previous task.
pub struct WsTransport {
    url: String,
    event_tx: UnboundedSender<AppEvent>,
    task: Option<JoinHandle<()>>,
}

impl WsTransport {
    /// Creates a transport that will connect to `url` (a `ws://` or `wss://`
    /// endpoint) and report on `event_tx`. Nothing connects until `open`.
    pub fn new(url: String, event_tx: UnboundedSender<AppEvent>) -> Self {
        Self { url, event_tx, task: None }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for WsTransport {
    fn open(&mut self, run: RunId, handshake: &Handshake) -> Result<(), TransportError> {
        self.discard();
        let payload = serde_json::to_string(handshake)?;
        let url = self.url.clone();
        let tx = self.event_tx.clone();
        self.task = Some(tokio::spawn(session_task(run, url, payload, tx)));
        Ok(())
    }

    fn discard(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("aborting websocket task");
            task.abort();
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.discard();
    }
}

/// Task body: runs the session and converts any failure into one `Error` event.
async fn session_task(run: RunId, url: String, handshake: String, tx: UnboundedSender<AppEvent>) {
    let terminal = match drive_session(run, &url, handshake, &tx).await {
        Ok(()) => TransportEvent::Closed { run },
        Err(e) => TransportEvent::Error { run, message: e.to_string() },
    };
    let _ = tx.send(AppEvent::Transport(terminal));
}

/// Connects, sends the handshake, and forwards text frames until the session ends.
///
/// Returns `Ok(())` on a close frame or end of stream.
///
/// # Errors
///
/// `TransportError::Connect` if the websocket handshake fails,
/// `TransportError::Send` if the run handshake cannot be written, and
/// `TransportError::Receive` on a read error.
async fn drive_session(
    run: RunId,
    url: &str,
    handshake: String,
    tx: &UnboundedSender<AppEvent>,
) -> Result<(), TransportError> {
    let (ws_stream, _) = connect_async(url).await.map_err(|e| TransportError::Connect {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    info!(run_id = %run, url, "websocket connected");

    ws_tx
        .send(Message::Text(handshake))
        .await
        .map_err(|e| TransportError::Send(e.to_string()))?;

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let line = normalize_frame(&text).to_owned();
                if tx.send(AppEvent::Transport(TransportEvent::Line { run, text: line })).is_err() {
                    // Main loop is gone; nothing left to report to.
                    return Ok(());
                }
            }
            Ok(Message::Close(frame)) => {
                debug!(run_id = %run, ?frame, "close frame received");
                break;
            }
            Ok(_) => {}
            Err(e) => return Err(TransportError::Receive(e.to_string())),
        }
    }

    info!(run_id = %run, "websocket closed");
    Ok(())
}

/// Strips the line terminators the server wraps around some messages.
///
/// The server sends e.g. `"\nFinal output:\n{...}\n"` as one message; without
/// this the `Final output:` prefix would never be at the start of the line.
/// Interior newlines are kept.
pub fn normalize_frame(text: &str) -> &str {
    text.trim_matches(|c| c == '\n' || c == '\r')
}
