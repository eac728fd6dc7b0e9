//! Client for the server's input-file listing (`GET /files`).

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::event::AppEvent;

/// Fetches the list of selectable input files.
///
/// # Errors
///
/// Fails on connection errors, non-2xx responses, or a body that is not a
/// JSON array of strings.
pub async fn fetch_files(url: &str) -> Result<Vec<String>, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<String>>()
        .await
}

/// Fetches the file list in the background and reports it as `FilesLoaded`.
pub fn spawn_fetch(url: String, tx: UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let result = match fetch_files(&url).await {
            Ok(files) => {
                info!(url, count = files.len(), "file list loaded");
                Ok(files)
            }
            Err(e) => {
                warn!(url, error = %e, "file list request failed");
                Err(e.to_string())
            }
        };
        let _ = tx.send(AppEvent::FilesLoaded(result));
    });
}
