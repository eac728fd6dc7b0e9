//! `--headless FILE`: one run without the terminal UI.
//!
//! Every render event is written to stdout as one tagged line. The process
//! exits once the transport closes or fails; the exit status is non-zero on a
//! transport error or a `Failed` outcome.

use std::io::Write;

use cleanwatch_core::session::{RenderSink, SessionController};
use cleanwatch_core::types::{RenderEvent, RunOutcome, TRANSPORT_ERROR_NOTICE};
use tracing::{error, info};

use crate::app::ExecutionOutcome;
use crate::config::Config;
use crate::event::{AppEvent, EventHandler};
use crate::transport::types::TransportEvent;
use crate::transport::WsTransport;

/// Writes render events as `[tag] text` lines.
///
/// The first write error is kept and later events are dropped; the caller
/// checks [`LineSink::take_error`] when the run is over.
pub struct LineSink<W: Write> {
    out: W,
    error: Option<std::io::Error>,
}

impl<W: Write> LineSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn take_error(&mut self) -> Option<std::io::Error> {
        self.error.take()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// The single output line for one event.
pub fn format_event(event: &RenderEvent) -> String {
    match event {
        RenderEvent::RunStarted { file_path, .. } => format!("[run] {file_path}"),
        RenderEvent::Activity { text } => format!("[agent] {text}"),
        RenderEvent::ToolCall { text } => format!("[tool] {text}"),
        RenderEvent::ToolOutput { text } => format!("[output] {text}"),
        RenderEvent::OutputPath { path } => format!("[path] {path}"),
        RenderEvent::ExecutionResult { success, message } => {
            let outcome = ExecutionOutcome { success: *success, message: message.clone() };
            let verdict = if *success { "ok" } else { "failed" };
            format!("[result] {verdict}: {}", outcome.display_message())
        }
        RenderEvent::AgentAnalysis { content } => format!("[analysis] {content}"),
        RenderEvent::Closed { outcome } => format!("[closed] {}", outcome.label()),
        RenderEvent::TransportError { .. } => format!("[error] {TRANSPORT_ERROR_NOTICE}"),
    }
}

impl<W: Write> RenderSink for LineSink<W> {
    fn render(&mut self, event: RenderEvent) {
        if self.error.is_some() {
            return;
        }
        let line = format_event(&event);
        if let Err(e) = writeln!(self.out, "{line}").and_then(|()| self.out.flush()) {
            self.error = Some(e);
        }
    }
}

/// Runs one session for `file_path`. Returns `true` when the run closed
/// without a transport error or a reported failure.
///
/// # Errors
///
/// Fails when the run cannot start (blank path, transport refused) or stdout
/// stops accepting writes.
pub async fn run(config: &Config, file_path: &str) -> anyhow::Result<bool> {
    let EventHandler { tx, mut rx } = EventHandler::new();
    let transport = WsTransport::new(config.ws_url(), tx);
    let mut controller = SessionController::new(transport, config.render_mode);
    let mut sink = LineSink::new(std::io::stdout());

    let run = controller.start_run(Some(file_path), Some(config.lines), &mut sink)?;
    info!(run_id = %run, url = controller.transport().url(), "headless run started");

    while let Some(event) = rx.recv().await {
        let AppEvent::Transport(event) = event else { continue };
        let terminal = event.is_terminal() && event.run() == run;
        match event {
            TransportEvent::Line { run, text } => controller.handle_line(run, &text, &mut sink),
            TransportEvent::Closed { run } => controller.handle_close(run, &mut sink),
            TransportEvent::Error { run, message } => {
                controller.handle_error(run, &message, &mut sink)
            }
        }
        if terminal {
            break;
        }
    }

    if let Some(e) = sink.take_error() {
        return Err(anyhow::Error::new(e).context("writing to stdout"));
    }

    let failed = controller.state().errored || controller.outcome() == Some(RunOutcome::Failed);
    if failed {
        error!(run_id = %run, "headless run did not succeed");
    }
    Ok(!failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanwatch_core::types::RunId;

    #[test]
    fn formats_each_event_kind() {
        assert_eq!(
            format_event(&RenderEvent::ToolCall { text: "[calling tool → run_py]".into() }),
            "[tool] [calling tool → run_py]"
        );
        assert_eq!(
            format_event(&RenderEvent::ExecutionResult { success: false, message: String::new() }),
            "[result] failed: Python script execution failed."
        );
        assert_eq!(
            format_event(&RenderEvent::ExecutionResult { success: true, message: "done".into() }),
            "[result] ok: done"
        );
        assert_eq!(
            format_event(&RenderEvent::Closed { outcome: RunOutcome::ClosedWithoutResult }),
            "[closed] closed without result"
        );
        assert_eq!(
            format_event(&RenderEvent::TransportError { detail: "refused".into() }),
            "[error] WebSocket error occurred. Please try again."
        );
    }

    #[test]
    fn sink_writes_one_line_per_event() {
        let mut sink = LineSink::new(Vec::new());
        sink.render(RenderEvent::RunStarted { run: RunId::new(), file_path: "a.jsonl".into() });
        sink.render(RenderEvent::OutputPath { path: "/out.csv".into() });
        assert!(sink.take_error().is_none());
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "[run] a.jsonl\n[path] /out.csv\n");
    }

    #[tokio::test]
    async fn unreachable_server_reports_failure() {
        let config = Config { server: "http://127.0.0.1:1".into(), ..Config::default() };
        assert!(!run(&config, "input_jsonl/a.jsonl").await.unwrap());
    }

    #[tokio::test]
    async fn blank_file_is_rejected() {
        assert!(run(&Config::default(), "  ").await.is_err());
    }
}
