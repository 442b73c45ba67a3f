//! Tile layer and initial view configuration.
//!
//! The configuration is a TOML file embedded at compile time. The
//! overlay URL may contain a `{time}` placeholder that is resolved
//! against an [`OverlayTime`] when the page is rendered.

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Embedded map configuration.
const MAP_TOML: &str = include_str!("../map.toml");

/// Placeholder in tile URLs replaced by the overlay date segment.
const TIME_PLACEHOLDER: &str = "{time}";

/// Errors loading a [`MapConfig`].
#[derive(Debug, Error)]
pub enum MapConfigError {
    /// The TOML could not be parsed into a map configuration.
    #[error("Invalid map configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Initial map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// `[latitude, longitude]` of the initial center.
    pub center: [f64; 2],
    /// Initial zoom level.
    pub zoom: u8,
}

/// One raster tile layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayerConfig {
    /// Display name.
    pub name: String,
    /// URL template (`{z}`, `{x}`, `{y}` and optionally `{time}`).
    pub url: String,
    /// Attribution HTML.
    pub attribution: String,
    /// Highest zoom level the tile service provides.
    pub max_zoom: u8,
    /// Layer opacity (1.0 when omitted).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

const fn default_opacity() -> f64 {
    1.0
}

impl TileLayerConfig {
    /// URL template with the `{time}` placeholder resolved.
    #[must_use]
    pub fn resolve_url(&self, time: &OverlayTime) -> String {
        let segment = time
            .date()
            .map(|date| format!("{}/", date.format("%Y-%m-%d")))
            .unwrap_or_default();
        self.url.replace(TIME_PLACEHOLDER, &segment)
    }
}

/// Static map configuration: view, base map and imagery overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial view.
    pub view: ViewConfig,
    /// Base map drawn under everything else.
    pub base: TileLayerConfig,
    /// Satellite overlay drawn over the base map.
    pub overlay: TileLayerConfig,
}

impl MapConfig {
    /// Parses a map configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`MapConfigError::Toml`] if the TOML is malformed or a
    /// required field is missing.
    pub fn from_toml(toml_str: &str) -> Result<Self, MapConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// The configuration embedded in this crate.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse. It is a compile-time
    /// constant, so this is a development error caught by tests.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml(MAP_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded map.toml: {e}"))
    }
}

/// Which day of satellite imagery the overlay shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlayTime {
    /// Whatever the tile service considers most recent.
    #[default]
    Latest,
    /// The current UTC date.
    Today,
    /// A fixed historical date.
    Fixed(NaiveDate),
}

impl OverlayTime {
    /// The concrete date to request, or `None` for [`Self::Latest`].
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Latest => None,
            Self::Today => Some(Utc::now().date_naive()),
            Self::Fixed(date) => Some(*date),
        }
    }
}

/// Error parsing an [`OverlayTime`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid overlay time '{value}': expected 'latest', 'today' or YYYY-MM-DD")]
pub struct InvalidOverlayTimeError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for OverlayTime {
    type Err = InvalidOverlayTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "latest" | "" => Ok(Self::Latest),
            "today" => Ok(Self::Today),
            _ => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(Self::Fixed)
                .map_err(|_| InvalidOverlayTimeError {
                    value: s.to_string(),
                }),
        }
    }
}
