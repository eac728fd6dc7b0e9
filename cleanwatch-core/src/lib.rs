//! cleanwatch-core — line classification and session state for the cleanwatch panel.
//!
//! Nothing in this crate performs I/O. The binary crate owns the websocket
//! transport and the terminal; it feeds inbound lines to a
//! [`session::SessionController`] and receives typed [`types::RenderEvent`]s back
//! through a [`session::RenderSink`].

pub mod classifier;
pub mod error;
pub mod result_parser;
pub mod session;
pub mod types;
