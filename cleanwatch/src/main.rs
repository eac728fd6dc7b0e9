//! cleanwatch: live activity panel for the data-cleaning agent.
//!
//! # Startup sequence
//!
//! 1. Parse CLI args and load the config (soft failure: defaults + warning).
//! 2. Install logging. The file log is always on; headless runs add stderr.
//! 3. `--headless FILE` runs one session and exits without touching the terminal.
//! 4. Otherwise: panic hook, SIGTERM flag, `init_tui()`, event task, initial
//!    file-list fetch, then the event loop.
//!
//! `restore_tui()` runs after the event loop exits. Inside the loop `?` is
//! only used in the Render arm, and that error is carried out by `break` so
//! the terminal is restored first.

mod app;
mod cli;
mod config;
mod event;
mod files;
mod headless;
mod logging;
mod theme;
mod transport;
mod tui;
mod ui;

use std::process::ExitCode;
use std::sync::atomic::Ordering;

use anyhow::Context;
use clap::Parser;
use cleanwatch_core::session::SessionController;
use tracing::{info, warn};

use crate::app::AppState;
use crate::event::AppEvent;
use crate::transport::types::TransportEvent;
use crate::transport::WsTransport;
use crate::ui::keybindings::{self, KeyAction};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = cli::Args::parse();

    let path = args.config.clone().unwrap_or_else(config::config_path);
    let (mut config, config_error) = match config::Config::load(&path) {
        Ok(c) => (c, None),
        Err(e) => (config::Config::default(), Some(e)),
    };
    config.apply_args(&args);

    let _log_guard = logging::init(&config.resolved_log_dir(), args.headless.is_some())?;
    if let Some(e) = config_error {
        warn!(error = %e, "config ignored, using defaults");
    }
    info!(server = %config.server, lines = config.lines, mode = config.render_mode.label(), "starting");

    if let Some(file) = &args.headless {
        let ok = headless::run(&config, file).await?;
        return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    run_tui(&config).await?;
    Ok(ExitCode::SUCCESS)
}

/// Runs the interactive panel until the user quits or SIGTERM arrives.
async fn run_tui(config: &config::Config) -> anyhow::Result<()> {
    let theme = theme::Theme::from_name(&config.theme);
    let mut state = AppState::new(config.lines, config.render_mode);

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm().context("registering SIGTERM handler")?;
    let mut terminal = tui::init_tui().context("initialising terminal")?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    files::spawn_fetch(config.files_url(), handler.tx.clone());

    let transport = WsTransport::new(config.ws_url(), handler.tx.clone());
    let mut controller = SessionController::new(transport, config.render_mode);
    let mut rx = handler.rx;
    let mut loop_result: anyhow::Result<()> = Ok(());

    // Exits only via `break` so `restore_tui()` below always runs.
    'event_loop: loop {
        tokio::select! {
            // Heartbeat: SIGTERM is checked at least every 50ms even when idle.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            loop_result = Err(anyhow::Error::new(e).context("drawing frame"));
                            break 'event_loop;
                        }
                    }
                    Some(AppEvent::Key(key)) => {
                        match keybindings::handle_key(key, &mut state) {
                            KeyAction::Quit => break 'event_loop,
                            KeyAction::StartRun => start_run(&mut controller, &mut state),
                            KeyAction::RefreshFiles => {
                                files::spawn_fetch(config.files_url(), handler.tx.clone());
                            }
                            KeyAction::Continue => {}
                        }
                    }
                    Some(AppEvent::Mouse(mouse)) => {
                        keybindings::handle_mouse(mouse, &mut state);
                    }
                    Some(AppEvent::Tick) => state.on_tick(),
                    Some(AppEvent::Transport(event)) => {
                        dispatch_transport(&mut controller, &mut state, event);
                    }
                    Some(AppEvent::FilesLoaded(Ok(files))) => state.set_files(files),
                    Some(AppEvent::FilesLoaded(Err(message))) => state.files_failed(message),
                    // ratatui picks up the new size from frame.area() on the next Render.
                    Some(AppEvent::Resize(_, _)) => {}
                    None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    drop(controller);
    tui::restore_tui().context("restoring terminal")?;
    info!("panel closed");
    loop_result
}

/// Starts a run for the picker's selection with the panel's current settings.
///
/// A refused request (no file selected, transport failure) lands in the
/// status bar and leaves the previous run's panels untouched.
fn start_run(controller: &mut SessionController<WsTransport>, state: &mut AppState) {
    controller.set_mode(state.render_mode);
    let file = state.selected_file().map(str::to_owned);
    let lines = state.preview_lines;
    if let Err(e) = controller.start_run(file.as_deref(), Some(lines), state) {
        warn!(error = %e, "run not started");
        state.status_message = Some(e.to_string());
    }
}

/// Feeds one transport event to the controller, which drops it unless it
/// belongs to the current run.
fn dispatch_transport(
    controller: &mut SessionController<WsTransport>,
    state: &mut AppState,
    event: TransportEvent,
) {
    if event.is_terminal() && controller.current_run() != Some(event.run()) {
        tracing::debug!(run_id = %event.run(), "terminal event from superseded run");
    }
    match event {
        TransportEvent::Line { run, text } => controller.handle_line(run, &text, state),
        TransportEvent::Closed { run } => controller.handle_close(run, state),
        TransportEvent::Error { run, message } => controller.handle_error(run, &message, state),
    }
}
