use colored::Color;
use std::str::FromStr;

/// How the caller wants color decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Follow the environment (`NO_COLOR`, `CLICOLOR`, `CLICOLOR_FORCE`,
    /// whether stdout is a terminal).
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn resolve(self) -> bool {
        match self {
            ColorMode::Auto => colored::control::SHOULD_COLORIZE.should_colorize(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Error type returned when parsing a [`ColorMode`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ColorModeError {
    #[error("unknown color mode `{0}` (expected auto, always or never)")]
    Unknown(String),
}

impl FromStr for ColorMode {
    type Err = ColorModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorMode::Auto),
            "always" | "on" | "true" | "1" => Ok(ColorMode::Always),
            "never" | "off" | "false" | "0" => Ok(ColorMode::Never),
            _ => Err(ColorModeError::Unknown(s.to_string())),
        }
    }
}

/// Styling capability owned by the formatter.
///
/// Keeps color a plain value instead of process-wide state, so rendering
/// stays a pure function of the record and this config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleConfig {
    pub color_enabled: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::from_mode(ColorMode::Auto)
    }
}

impl StyleConfig {
    pub fn from_mode(mode: ColorMode) -> Self {
        Self { color_enabled: mode.resolve() }
    }

    pub fn plain() -> Self {
        Self { color_enabled: false }
    }

    pub fn colored() -> Self {
        Self { color_enabled: true }
    }

    /// Wrap `text` in the SGR sequence for `style`. Empty text stays empty.
    pub fn paint(&self, text: &str, style: Style) -> String {
        if !self.color_enabled || text.is_empty() {
            return text.to_string();
        }
        let mut codes = style.fg.to_fg_str().to_string();
        if let Some(bg) = style.bg {
            codes.push(';');
            codes.push_str(&bg.to_bg_str());
        }
        format!("\x1b[{}m{}\x1b[0m", codes, text)
    }
}

/// Foreground color plus optional background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bg: Option<Color>,
}

impl Style {
    pub const fn fg(fg: Color) -> Self {
        Style { fg, bg: None }
    }

    pub const fn on(self, bg: Color) -> Self {
        Style { fg: self.fg, bg: Some(bg) }
    }
}
