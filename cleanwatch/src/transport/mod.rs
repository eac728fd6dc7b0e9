//! Websocket transport for cleanwatch.
//!
//! `WsTransport` implements the core `Transport` seam. Each run gets its own
//! tokio task that owns the websocket for its lifetime; everything it receives
//! is forwarded onto the unified event bus as `AppEvent::Transport`, tagged with
//! the run id so stale traffic can be told apart from the current run.
pub mod types;
pub mod worker;

pub use worker::WsTransport;
