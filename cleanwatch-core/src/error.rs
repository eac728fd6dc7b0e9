//! Error types for session setup and transport plumbing.
//!
//! Classification and result parsing never fail; malformed input degrades to
//! plain-text handling. Only run preconditions and transport setup can error.

/// Failures raised by a [`crate::session::Transport`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("failed to send handshake: {0}")]
    Send(String),

    #[error("failed to read from transport: {0}")]
    Receive(String),

    #[error("failed to encode handshake: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures raised when a run cannot be started.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no input file selected")]
    NoFileSelected,

    #[error("preview line count must be at least 1 (got {0})")]
    InvalidLineCount(u32),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
