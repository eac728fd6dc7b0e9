//! Configuration file and endpoint derivation.
//!
//! Read from `$XDG_CONFIG_HOME/cleanwatch/config.toml` (or
//! `~/.config/cleanwatch/config.toml`). Every key is optional. A missing file
//! means defaults; a broken file is reported to the caller, which logs it and
//! carries on with defaults.

use std::path::{Path, PathBuf};

use cleanwatch_core::classifier::ClassifierMode;
use cleanwatch_core::types::DEFAULT_PREVIEW_LINES;
use serde::Deserialize;

use crate::cli::Args;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("`lines` must be at least 1")]
    InvalidLines,
}

fn default_server() -> String {
    "http://127.0.0.1:8000".to_owned()
}

fn default_theme() -> String {
    "catppuccin-mocha".to_owned()
}

fn default_lines() -> u32 {
    DEFAULT_PREVIEW_LINES
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Base URL of the cleaning server.
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Preview line count sent in every handshake.
    #[serde(default = "default_lines")]
    pub lines: u32,
    #[serde(default)]
    pub render_mode: ClassifierMode,
    /// Directory for the rolling log file. `None` means [`default_log_dir`].
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            theme: default_theme(),
            lines: default_lines(),
            render_mode: ClassifierMode::default(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Loads the config at `path`. A file that does not exist yields defaults.
    ///
    /// # Errors
    ///
    /// `ConfigError::Read` if the file exists but cannot be read,
    /// `ConfigError::Parse` on invalid TOML or mistyped keys, and
    /// `ConfigError::InvalidLines` when `lines = 0`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path: path.to_owned(), source }),
        };
        Self::parse(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse { path: path.to_owned(), source },
            other => other,
        })
    }

    fn parse(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw)
            .map_err(|source| ConfigError::Parse { path: PathBuf::new(), source })?;
        if config.lines == 0 {
            return Err(ConfigError::InvalidLines);
        }
        Ok(config)
    }

    /// Applies command-line overrides on top of the file values.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(server) = &args.server {
            self.server = server.clone();
        }
        if let Some(theme) = &args.theme {
            self.theme = theme.clone();
        }
        if let Some(lines) = args.lines {
            self.lines = lines;
        }
        if args.plain {
            self.render_mode = ClassifierMode::Plain;
        }
    }

    /// Websocket endpoint: `<server>/ws` with `http` rewritten to `ws` and
    /// `https` to `wss`.
    pub fn ws_url(&self) -> String {
        let base = self.server.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_owned()
        };
        format!("{base}/ws")
    }

    /// File listing endpoint: `<server>/files`.
    pub fn files_url(&self) -> String {
        format!("{}/files", self.server.trim_end_matches('/'))
    }

    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }
}

/// Returns the default config file path.
///
/// Prefers `$XDG_CONFIG_HOME/cleanwatch/config.toml`; falls back to
/// `~/.config/cleanwatch/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join("config.toml")
}

/// `$XDG_STATE_HOME/cleanwatch`, or `~/.local/state/cleanwatch`.
pub fn default_log_dir() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state")
}

fn xdg_dir(var: &str, home_relative: &str) -> PathBuf {
    let base = std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(home_relative)))
        .unwrap_or_else(|| PathBuf::from(home_relative));
    base.join("cleanwatch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.lines, 3);
        assert_eq!(config.render_mode, ClassifierMode::Classified);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server = \"https://clean.example.com/\"\nrender_mode = \"plain\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server, "https://clean.example.com/");
        assert_eq!(config.render_mode, ClassifierMode::Plain);
        assert_eq!(config.theme, "catppuccin-mocha");
        assert_eq!(config.lines, 3);
    }

    #[test]
    fn parse_error_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lines = \"three\"").unwrap();

        match Config::load(file.path()) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn zero_lines_is_rejected() {
        assert!(matches!(Config::parse("lines = 0"), Err(ConfigError::InvalidLines)));
    }

    #[test]
    fn unknown_render_mode_is_a_parse_error() {
        assert!(matches!(Config::parse("render_mode = \"fancy\""), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn urls_follow_server_scheme() {
        let mut config = Config::default();
        assert_eq!(config.ws_url(), "ws://127.0.0.1:8000/ws");
        assert_eq!(config.files_url(), "http://127.0.0.1:8000/files");

        config.server = "https://clean.example.com/".into();
        assert_eq!(config.ws_url(), "wss://clean.example.com/ws");
        assert_eq!(config.files_url(), "https://clean.example.com/files");
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut config = Config::default();
        let args = Args {
            config: None,
            server: Some("http://10.0.0.2:9000".into()),
            theme: Some("dark".into()),
            lines: Some(10),
            plain: true,
            headless: None,
        };
        config.apply_args(&args);
        assert_eq!(config.server, "http://10.0.0.2:9000");
        assert_eq!(config.theme, "dark");
        assert_eq!(config.lines, 10);
        assert_eq!(config.render_mode, ClassifierMode::Plain);
    }
}
