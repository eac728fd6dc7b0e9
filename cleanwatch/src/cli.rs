//! Command-line arguments. Every flag overrides the matching config key.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "cleanwatch")]
#[command(author, version, about = "Live activity panel for the data-cleaning agent", long_about = None)]
pub struct Args {
    /// Config file to read instead of the XDG default
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the cleaning server, e.g. http://127.0.0.1:8000
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Color theme: dark or catppuccin-mocha
    #[arg(long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Number of preview lines the server should process
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub lines: Option<u32>,

    /// Show every line verbatim instead of classifying it
    #[arg(long)]
    pub plain: bool,

    /// Run one session for FILE without the terminal UI and print events to stdout
    #[arg(long, value_name = "FILE")]
    pub headless: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headless_run() {
        let args = Args::try_parse_from([
            "cleanwatch",
            "--headless",
            "input_jsonl/raw.jsonl",
            "--lines",
            "5",
            "--plain",
        ])
        .unwrap();
        assert_eq!(args.headless.as_deref(), Some("input_jsonl/raw.jsonl"));
        assert_eq!(args.lines, Some(5));
        assert!(args.plain);
    }

    #[test]
    fn rejects_zero_lines() {
        assert!(Args::try_parse_from(["cleanwatch", "--lines", "0"]).is_err());
    }
}
