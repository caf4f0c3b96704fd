use ratatui::style::Color;
use serde::Deserialize;

/// Available theme presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreset {
    #[default]
    Default,
    Dracula,
    Gruvbox,
}

impl ThemePreset {
    pub fn label(&self) -> &'static str {
        match self {
            ThemePreset::Default => "Default",
            ThemePreset::Dracula => "Dracula",
            ThemePreset::Gruvbox => "Gruvbox",
        }
    }

    pub fn theme(&self) -> Theme {
        match self {
            ThemePreset::Default => Theme::default_theme(),
            ThemePreset::Dracula => Theme::dracula(),
            ThemePreset::Gruvbox => Theme::gruvbox(),
        }
    }
}

/// Colors for the player screen
#[derive(Debug, Clone)]
pub struct Theme {
    pub foreground: Color,
    pub foreground_dim: Color,
    pub border: Color,
    pub accent: Color,

    // Status line
    pub warning: Color,
    pub error: Color,

    // Now playing
    pub now_playing_accent: Color,
    pub progress_bar_filled: Color,
    pub progress_bar_empty: Color,

    // Spectrum gradient, left to right
    pub spectrum_low: Color,
    pub spectrum_mid: Color,
    pub spectrum_high: Color,

    pub hint_key: Color,
    pub hint_text: Color,
}

impl Theme {
    /// Blue to cyan bars on a plain terminal
    pub fn default_theme() -> Self {
        Self {
            foreground: Color::White,
            foreground_dim: Color::DarkGray,
            border: Color::Cyan,
            accent: Color::Cyan,

            warning: Color::Yellow,
            error: Color::Red,

            now_playing_accent: Color::Cyan,
            progress_bar_filled: Color::Cyan,
            progress_bar_empty: Color::DarkGray,

            spectrum_low: Color::Blue,
            spectrum_mid: Color::Cyan,
            spectrum_high: Color::White,

            hint_key: Color::Yellow,
            hint_text: Color::DarkGray,
        }
    }

    pub fn dracula() -> Self {
        let foreground = Color::Rgb(248, 248, 242);
        let comment = Color::Rgb(98, 114, 164);
        let cyan = Color::Rgb(139, 233, 253);
        let pink = Color::Rgb(255, 121, 198);
        let purple = Color::Rgb(189, 147, 249);
        let red = Color::Rgb(255, 85, 85);
        let yellow = Color::Rgb(241, 250, 140);

        Self {
            foreground,
            foreground_dim: comment,
            border: purple,
            accent: purple,

            warning: yellow,
            error: red,

            now_playing_accent: pink,
            progress_bar_filled: purple,
            progress_bar_empty: comment,

            spectrum_low: cyan,
            spectrum_mid: purple,
            spectrum_high: pink,

            hint_key: yellow,
            hint_text: comment,
        }
    }

    pub fn gruvbox() -> Self {
        let fg = Color::Rgb(235, 219, 178);
        let gray = Color::Rgb(146, 131, 116);
        let red = Color::Rgb(251, 73, 52);
        let yellow = Color::Rgb(250, 189, 47);
        let aqua = Color::Rgb(142, 192, 124);
        let orange = Color::Rgb(254, 128, 25);

        Self {
            foreground: fg,
            foreground_dim: gray,
            border: yellow,
            accent: yellow,

            warning: yellow,
            error: red,

            now_playing_accent: orange,
            progress_bar_filled: yellow,
            progress_bar_empty: gray,

            spectrum_low: aqua,
            spectrum_mid: yellow,
            spectrum_high: orange,

            hint_key: yellow,
            hint_text: gray,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}
