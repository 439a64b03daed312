//! Semantic color lookup for the terminal views.
//!
//! Views never pick raw colors. They ask the theme for a semantic slot
//! (`error`, `thinkingText`, ...) so a theme swap followed by a re-render
//! restyles everything consistently.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use serde::Deserialize;
use thiserror::Error;

use super::markdown::MarkdownTheme;
use super::terminal_color;

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("unknown theme color `{0}`")]
    UnknownColor(String),
    #[error("invalid color value `{value}` for `{name}`")]
    InvalidValue { name: String, value: String },
    #[error("unknown base theme `{0}` (expected `dark` or `light`)")]
    UnknownBase(String),
    #[error("failed to read theme file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse theme")]
    Parse(#[from] serde_json::Error),
}

/// Semantic color slots a theme provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeColor {
    Text,
    Muted,
    Accent,
    Error,
    ThinkingText,
}

impl ThemeColor {
    pub const ALL: [ThemeColor; 5] = [
        ThemeColor::Text,
        ThemeColor::Muted,
        ThemeColor::Accent,
        ThemeColor::Error,
        ThemeColor::ThinkingText,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeColor::Text => "text",
            ThemeColor::Muted => "muted",
            ThemeColor::Accent => "accent",
            ThemeColor::Error => "error",
            ThemeColor::ThinkingText => "thinkingText",
        }
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeColor {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeColor::ALL
            .into_iter()
            .find(|color| color.as_str() == s)
            .ok_or_else(|| ThemeError::UnknownColor(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    name: String,
    text: Color,
    muted: Color,
    accent: Color,
    error: Color,
    thinking_text: Color,
}

/// On-disk theme format.
#[derive(Debug, Deserialize)]
struct ThemeFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    colors: IndexMap<String, String>,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            text: Color::Reset,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            error: Color::LightRed,
            thinking_text: Color::DarkGray,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            text: Color::Reset,
            muted: Color::Gray,
            accent: Color::Blue,
            error: Color::Red,
            thinking_text: Color::Gray,
        }
    }

    /// Pick a built-in theme for the detected terminal background.
    pub fn detect() -> Self {
        Self::for_background(terminal_color::terminal_bg())
    }

    /// Built-in theme for a known (or unknown) background. With a known
    /// background the thinking color is blended from it instead of using a
    /// fixed palette entry.
    pub fn for_background(bg: Option<(u8, u8, u8)>) -> Self {
        let Some(bg) = bg else {
            return Self::dark();
        };
        let mut theme = if terminal_color::is_light(bg) {
            Self::light()
        } else {
            Self::dark()
        };
        theme.thinking_text = terminal_color::dimmed_text(bg);
        theme
    }

    pub fn from_json(source: &str) -> Result<Self, ThemeError> {
        let file: ThemeFile = serde_json::from_str(source)?;
        let mut theme = match file.base.as_deref() {
            None | Some("dark") => Self::dark(),
            Some("light") => Self::light(),
            Some(other) => return Err(ThemeError::UnknownBase(other.to_string())),
        };
        if let Some(name) = file.name {
            theme.name = name;
        }
        for (name, value) in file.colors {
            let slot: ThemeColor = name.parse()?;
            let color = Color::from_str(&value).map_err(|_| ThemeError::InvalidValue {
                name: name.clone(),
                value: value.clone(),
            })?;
            theme.set_color(slot, color);
        }
        Ok(theme)
    }

    pub fn from_file(path: &Path) -> Result<Self, ThemeError> {
        let source = std::fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let theme = Self::from_json(&source)?;
        tracing::debug!("Loaded theme '{}' from {}", theme.name, path.display());
        Ok(theme)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self, slot: ThemeColor) -> Color {
        match slot {
            ThemeColor::Text => self.text,
            ThemeColor::Muted => self.muted,
            ThemeColor::Accent => self.accent,
            ThemeColor::Error => self.error,
            ThemeColor::ThinkingText => self.thinking_text,
        }
    }

    pub fn set_color(&mut self, slot: ThemeColor, color: Color) {
        match slot {
            ThemeColor::Text => self.text = color,
            ThemeColor::Muted => self.muted = color,
            ThemeColor::Accent => self.accent = color,
            ThemeColor::Error => self.error = color,
            ThemeColor::ThinkingText => self.thinking_text = color,
        }
    }

    /// `text` styled with the foreground of `slot`.
    pub fn fg(&self, slot: ThemeColor, text: impl Into<Cow<'static, str>>) -> Span<'static> {
        Span::styled(text, Style::default().fg(self.color(slot)))
    }

    pub fn italic(&self, span: Span<'static>) -> Span<'static> {
        Span {
            style: span.style.add_modifier(Modifier::ITALIC),
            ..span
        }
    }

    pub fn markdown_theme(&self) -> MarkdownTheme {
        MarkdownTheme { text: self.text }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
