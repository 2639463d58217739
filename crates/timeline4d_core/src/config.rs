//! Engine configuration.
//!
//! # Responsibility
//! - Hold presentation settings (highlight color, date label) for the engine.
//! - Overlay environment overrides onto defaults.
//!
//! # Invariants
//! - A validated config always formats dates without error.

use crate::scene::{ColorParseError, HighlightColor};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter, Write};

/// Env var overriding `highlight_color` (`#RRGGBB` / `#RRGGBBAA`).
pub const ENV_HIGHLIGHT_COLOR: &str = "TIMELINE4D_HIGHLIGHT_COLOR";
/// Env var overriding `empty_label`.
pub const ENV_EMPTY_LABEL: &str = "TIMELINE4D_EMPTY_LABEL";
/// Env var overriding `label_format` (chrono strftime pattern).
pub const ENV_LABEL_FORMAT: &str = "TIMELINE4D_LABEL_FORMAT";

const DEFAULT_EMPTY_LABEL: &str = "N/A";
const DEFAULT_LABEL_FORMAT: &str = "%Y-%m-%d";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidColor(ColorParseError),
    InvalidLabelFormat(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidColor(err) => write!(f, "{err}"),
            Self::InvalidLabelFormat(value) => {
                write!(f, "date label format is invalid: `{value}`")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidColor(err) => Some(err),
            Self::InvalidLabelFormat(_) => None,
        }
    }
}

impl From<ColorParseError> for ConfigError {
    fn from(value: ColorParseError) -> Self {
        Self::InvalidColor(value)
    }
}

/// Presentation settings for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Overlay applied to in-progress elements.
    pub highlight_color: HighlightColor,
    /// Slider label shown when no timeline position is applied.
    pub empty_label: String,
    /// chrono strftime pattern for the current-date label.
    pub label_format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            highlight_color: HighlightColor::IN_PROGRESS,
            empty_label: DEFAULT_EMPTY_LABEL.to_string(),
            label_format: DEFAULT_LABEL_FORMAT.to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `TIMELINE4D_*` environment overrides.
    ///
    /// Blank variables are ignored. The result is validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = non_blank(lookup(ENV_HIGHLIGHT_COLOR)) {
            config.highlight_color = HighlightColor::parse_hex(&raw)?;
        }
        if let Some(raw) = non_blank(lookup(ENV_EMPTY_LABEL)) {
            config.empty_label = raw;
        }
        if let Some(raw) = non_blank(lookup(ENV_LABEL_FORMAT)) {
            config.label_format = raw;
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks the label format is a non-empty, well-formed strftime pattern.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = self.label_format.trim().is_empty()
            || StrftimeItems::new(&self.label_format).any(|item| matches!(item, Item::Error));
        if invalid {
            return Err(ConfigError::InvalidLabelFormat(self.label_format.clone()));
        }
        Ok(())
    }

    /// Formats the slider label for `at`.
    ///
    /// Falls back to ISO `YYYY-MM-DD` if the pattern cannot render.
    pub fn format_label(&self, at: NaiveDateTime) -> String {
        let mut label = String::new();
        if write!(label, "{}", at.format(&self.label_format)).is_err() {
            return at.date().format(DEFAULT_LABEL_FORMAT).to_string();
        }
        label
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}
