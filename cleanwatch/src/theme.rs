//! Color themes for the cleanwatch panel.
//!
//! Two built-in themes:
//!
//! - `dark` uses ANSI 16 colors and works on any terminal.
//! - `catppuccin_mocha` uses the Catppuccin Mocha palette in RGB and wants truecolor.

use ratatui::style::Color;

/// Every color the panel renders with.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    pub border_active: Color,
    pub border_inactive: Color,

    // Activity feed, one color per entry kind
    pub feed_agent: Color,
    pub feed_tool_call: Color,
    pub feed_tool_output: Color,
    pub feed_error: Color,
    /// Run-started and run-closed notices.
    pub feed_notice: Color,

    // Results column
    pub output_path: Color,
    pub result_success: Color,
    pub result_failure: Color,
    pub analysis: Color,

    // File picker
    pub file_selected: Color,
    /// Marks the file the current run was started for.
    pub file_running: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub status_idle: Color,
    pub status_running: Color,
    pub status_closed: Color,
    pub status_error: Color,

    // General
    /// Dimmed text for placeholders and hints.
    pub muted: Color,
    pub background: Color,
}

impl Theme {
    /// Built-in dark theme using ANSI 16 colors. Safe on any terminal.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            feed_agent: Color::Reset,
            feed_tool_call: Color::Cyan,
            feed_tool_output: Color::Gray,
            feed_error: Color::Red,
            feed_notice: Color::Yellow,

            output_path: Color::Blue,
            result_success: Color::Green,
            result_failure: Color::Red,
            analysis: Color::Magenta,

            file_selected: Color::Cyan,
            file_running: Color::Green,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_idle: Color::Cyan,
            status_running: Color::Green,
            status_closed: Color::Yellow,
            status_error: Color::Red,

            muted: Color::DarkGray,
            background: Color::Reset,
        }
    }

    /// Catppuccin Mocha in RGB truecolor.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let teal = Color::Rgb(148, 226, 213); // #94e2d5
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let subtext0 = Color::Rgb(166, 173, 200); // #a6adc8
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let base = Color::Rgb(30, 30, 46); // #1e1e2e
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let peach = Color::Rgb(250, 179, 135); // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            feed_agent: text,
            feed_tool_call: teal,
            feed_tool_output: subtext0,
            feed_error: red,
            feed_notice: peach,

            output_path: blue,
            result_success: green,
            result_failure: red,
            analysis: mauve,

            file_selected: lavender,
            file_running: green,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_idle: lavender,
            status_running: green,
            status_closed: yellow,
            status_error: red,

            muted: overlay1,
            background: base,
        }
    }

    /// Resolves a theme name from config or the CLI.
    ///
    /// Unknown names fall back to `dark()` with a warning in the log, so a typo
    /// never prevents startup.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_accepts_both_spellings() {
        assert_eq!(Theme::from_name("catppuccin_mocha").background, Color::Rgb(30, 30, 46));
        assert_eq!(Theme::from_name("catppuccin-mocha").background, Color::Rgb(30, 30, 46));
    }

    #[test]
    fn unknown_name_falls_back_to_dark() {
        assert_eq!(Theme::from_name("solarized").border_active, Theme::dark().border_active);
    }
}
