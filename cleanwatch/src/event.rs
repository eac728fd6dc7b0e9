//! Event bus for cleanwatch.
//!
//! Terminal input, timer ticks, websocket traffic, and file-listing results are
//! all normalised into a single `AppEvent` enum and sent over a tokio unbounded
//! MPSC channel. The main loop receives from this channel and dispatches.
//!
//! Two independent intervals drive the render and logic cycles:
//! - **Render interval** (33 ms) triggers a `terminal.draw()` call.
//! - **Tick interval** (250 ms) advances the running-run spinner.
//!
//! Keeping them independent allows tuning the render rate without changing
//! how often the spinner and status bar update, and vice-versa.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::transport::types::TransportEvent;

/// All events the application can receive from any source.
///
/// Marked `#[non_exhaustive]` so that new sources (for example a server
/// health probe) do not break exhaustive match arms in existing handlers.
#[derive(Debug)]
#[non_exhaustive]
pub enum AppEvent {
    /// A key press from the terminal (`KeyEventKind::Press` only).
    ///
    /// Release and repeat events are filtered in [`spawn_event_task`] to avoid
    /// double-firing on Windows, which synthesises both press and release for
    /// every keystroke.
    Key(KeyEvent),
    /// A mouse event from the terminal (click, scroll, move).
    Mouse(MouseEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Logic tick (250 ms).
    Tick,
    /// Render tick (33 ms).
    Render,
    /// Inbound traffic from the websocket worker, tagged with its run id.
    Transport(TransportEvent),
    /// Result of a `GET /files` request: the file list or an error message.
    FilesLoaded(Result<Vec<String>, String>),
}

/// Holds the sender and receiver ends of the unified event channel.
///
/// The sender (`tx`) is cloned into the websocket transport and the file
/// fetcher; the receiver (`rx`) is owned by the main event loop.
pub struct EventHandler {
    /// Send half. Clone this for each background task that produces events.
    pub tx: mpsc::UnboundedSender<AppEvent>,
    /// Receive half, owned by the main loop (or the headless runner); call
    /// `.recv().await` to wait for the next event.
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    /// Creates a new `EventHandler` with a fresh unbounded channel.
    ///
    /// Unbounded is appropriate here: terminal input and timers arrive at a
    /// bounded hardware rate, and websocket lines arrive at the agent's pace,
    /// which the main loop outruns. If the server ever floods a run, swap to a
    /// bounded channel and let the worker await capacity.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the background tokio task that feeds terminal input and timers into
/// the unified event channel.
///
/// Two fully independent `tokio::time::interval` timers drive the render and
/// logic cycles; crossterm input is polled via `EventStream`. The websocket
/// worker and the file fetcher send on their own clones of `tx`.
///
/// # Key implementation choices
///
/// - `reader.next().fuse()`: required so that if the crossterm stream
///   terminates unexpectedly, `tokio::select!` does not keep polling a
///   completed future (which would panic).
/// - `KeyEventKind::Press` filter: Windows fires both `Press` and `Release`
///   for every keystroke. Without the filter, every key press appears twice.
/// - Send errors are ignored (`let _ = tx.send(…)`): once the receiver has
///   been dropped the process is shutting down.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(Duration::from_millis(250));
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            tokio::select! {
                _ = tick_tick => {
                    let _ = tx.send(AppEvent::Tick);
                }
                _ = render_tick => {
                    let _ = tx.send(AppEvent::Render);
                }
                maybe_event = crossterm_event => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => {
                            if key.kind == KeyEventKind::Press {
                                let _ = tx.send(AppEvent::Key(key));
                            }
                        }
                        Some(Ok(Event::Resize(w, h))) => {
                            let _ = tx.send(AppEvent::Resize(w, h));
                        }
                        Some(Ok(Event::Mouse(mouse))) => {
                            let _ = tx.send(AppEvent::Mouse(mouse));
                        }
                        _ => {}
                    }
                }
            }
        }
    });
}
