#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Bloom event record types and intensity classification.
//!
//! A bloom event is one `GeoJSON` feature: a point location plus a loose
//! `properties` object carrying the measured chlorophyll-a intensity
//! (mg/m³) and free-text metadata. Only the intensity drives
//! classification; every other field is carried through for display.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

/// Intensities strictly above this value are [`BloomCategory::High`].
pub const HIGH_THRESHOLD: f64 = 100.0;

/// Intensities strictly above this value (and not above
/// [`HIGH_THRESHOLD`]) are [`BloomCategory::Medium`].
pub const MEDIUM_THRESHOLD: f64 = 50.0;

/// Unit appended to intensity values wherever they are displayed.
pub const INTENSITY_UNIT: &str = "mg/m³";

/// Placeholder shown for a property the feature does not carry.
pub const MISSING_VALUE: &str = "unknown";

/// Three-way intensity bucket for a bloom event.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BloomCategory {
    /// Intensity above 100 mg/m³
    High,
    /// Intensity above 50 and up to 100 mg/m³
    Medium,
    /// Intensity of 50 mg/m³ or less
    Low,
}

impl BloomCategory {
    /// Returns the fixed display color for this category as a hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::High => "#ff0000",
            Self::Medium => "#ffcc00",
            Self::Low => "#6dff6d",
        }
    }

    /// Human-readable category name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Intensity range covered by this category, for legends.
    #[must_use]
    pub const fn range_label(self) -> &'static str {
        match self {
            Self::High => "> 100 mg/m³",
            Self::Medium => "50-100 mg/m³",
            Self::Low => "≤ 50 mg/m³",
        }
    }

    /// Returns all variants in legend order (highest first).
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::High, Self::Medium, Self::Low]
    }
}

/// Maps a numeric intensity to its [`BloomCategory`].
///
/// Total over `f64`: `NaN` fails both comparisons and lands in
/// [`BloomCategory::Low`].
#[must_use]
pub fn classify(intensity: f64) -> BloomCategory {
    if intensity > HIGH_THRESHOLD {
        BloomCategory::High
    } else if intensity > MEDIUM_THRESHOLD {
        BloomCategory::Medium
    } else {
        BloomCategory::Low
    }
}

/// Geographic position of a bloom event, in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl Location {
    /// Builds a location from a `GeoJSON` position (`[longitude, latitude, ...]`).
    ///
    /// Returns `None` if the position has fewer than two coordinates.
    #[must_use]
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [longitude, latitude, ..] => Some(Self {
                latitude: *latitude,
                longitude: *longitude,
            }),
            _ => None,
        }
    }
}

/// The `properties` object of a bloom feature.
///
/// Values are kept as raw JSON so they can be displayed exactly as the
/// data file wrote them. Nothing here is validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BloomProperties {
    /// Chlorophyll-a concentration in mg/m³.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Value>,
    /// Short categorical label (e.g. "Algal").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<Value>,
    /// Detection date, in whatever format the producer used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    /// Satellite or instrument identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
}

impl BloomProperties {
    /// Picks the bloom fields out of a `GeoJSON` properties object,
    /// ignoring anything else it carries.
    #[must_use]
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            intensity: map.get("intensity").cloned(),
            event_type: map.get("type").cloned(),
            date: map.get("date").cloned(),
            source: map.get("source").cloned(),
        }
    }

    /// Numeric intensity, if the field is a number or a numeric string.
    #[must_use]
    pub fn intensity_value(&self) -> Option<f64> {
        match self.intensity.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Category for this record. A missing or non-numeric intensity is
    /// [`BloomCategory::Low`].
    #[must_use]
    pub fn category(&self) -> BloomCategory {
        self.intensity_value().map_or(BloomCategory::Low, classify)
    }

    /// Intensity as displayed, verbatim.
    #[must_use]
    pub fn intensity_text(&self) -> String {
        display_value(self.intensity.as_ref())
    }

    /// Event type as displayed, verbatim.
    #[must_use]
    pub fn event_type_text(&self) -> String {
        display_value(self.event_type.as_ref())
    }

    /// Detection date as displayed, verbatim.
    #[must_use]
    pub fn date_text(&self) -> String {
        display_value(self.date.as_ref())
    }

    /// Source as displayed, verbatim.
    #[must_use]
    pub fn source_text(&self) -> String {
        display_value(self.source.as_ref())
    }
}

/// Formats a raw property for display: strings without quotes, numbers
/// in shortest decimal form (`75.0` and `1e2` show as `75` and `100`),
/// other JSON values serialized, `null` or absent as [`MISSING_VALUE`].
fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => MISSING_VALUE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.is_f64() => n
            .as_f64()
            .map_or_else(|| n.to_string(), |v| v.to_string()),
        Some(other) => other.to_string(),
    }
}

/// One bloom occurrence, as read from a single `GeoJSON` feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloomEvent {
    /// Point location, if the feature had point geometry.
    pub location: Option<Location>,
    /// Feature properties, if the feature had a `properties` object.
    pub properties: Option<BloomProperties>,
}

impl BloomEvent {
    /// Category for this event. Events without properties are
    /// [`BloomCategory::Low`].
    #[must_use]
    pub fn category(&self) -> BloomCategory {
        self.properties
            .as_ref()
            .map_or(BloomCategory::Low, BloomProperties::category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_thresholds() {
        assert_eq!(classify(0.0), BloomCategory::Low);
        assert_eq!(classify(50.0), BloomCategory::Low);
        assert_eq!(classify(50.0001), BloomCategory::Medium);
        assert_eq!(classify(75.0), BloomCategory::Medium);
        assert_eq!(classify(100.0), BloomCategory::Medium);
        assert_eq!(classify(100.0001), BloomCategory::High);
        assert_eq!(classify(1e9), BloomCategory::High);
    }

    #[test]
    fn classify_is_total() {
        assert_eq!(classify(-5.0), BloomCategory::Low);
        assert_eq!(classify(f64::NAN), BloomCategory::Low);
        assert_eq!(classify(f64::INFINITY), BloomCategory::High);
        assert_eq!(classify(f64::NEG_INFINITY), BloomCategory::Low);
    }

    #[test]
    fn category_colors() {
        assert_eq!(BloomCategory::High.color(), "#ff0000");
        assert_eq!(BloomCategory::Medium.color(), "#ffcc00");
        assert_eq!(BloomCategory::Low.color(), "#6dff6d");
    }

    #[test]
    fn category_string_roundtrip() {
        for category in BloomCategory::all() {
            let parsed: BloomCategory = category.to_string().parse().unwrap();
            assert_eq!(parsed, *category);
        }
        assert_eq!(BloomCategory::Medium.to_string(), "MEDIUM");
    }

    #[test]
    fn properties_from_map_ignore_extra_fields() {
        let value = serde_json::json!({
            "intensity": 75,
            "type": "Algal",
            "date": "2024-05-01",
            "source": "MODIS",
            "ndvi_peak": 0.31
        });
        let props = BloomProperties::from_map(value.as_object().unwrap());
        assert_eq!(props.intensity_value(), Some(75.0));
        assert_eq!(props.category(), BloomCategory::Medium);
        assert_eq!(props.intensity_text(), "75");
        assert_eq!(props.event_type_text(), "Algal");
        assert_eq!(props.date_text(), "2024-05-01");
        assert_eq!(props.source_text(), "MODIS");
    }

    #[test]
    fn numeric_string_intensity_is_classified() {
        let props = BloomProperties {
            intensity: Some(serde_json::json!(" 120.5 ")),
            ..BloomProperties::default()
        };
        assert_eq!(props.intensity_value(), Some(120.5));
        assert_eq!(props.category(), BloomCategory::High);
        assert_eq!(props.intensity_text(), " 120.5 ");
    }

    #[test]
    fn non_numeric_or_missing_intensity_is_low() {
        let text = BloomProperties {
            intensity: Some(serde_json::json!("Moderate Greenness")),
            ..BloomProperties::default()
        };
        assert_eq!(text.intensity_value(), None);
        assert_eq!(text.category(), BloomCategory::Low);

        let missing = BloomProperties::default();
        assert_eq!(missing.category(), BloomCategory::Low);
        assert_eq!(missing.intensity_text(), MISSING_VALUE);
        assert_eq!(BloomEvent::default().category(), BloomCategory::Low);
    }

    #[test]
    fn float_intensity_drops_trailing_zero() {
        let props: BloomProperties =
            serde_json::from_str(r#"{"intensity": 75.0, "date": 1e2, "source": 12.5}"#).unwrap();
        assert_eq!(props.intensity_text(), "75");
        assert_eq!(props.date_text(), "100");
        assert_eq!(props.source_text(), "12.5");
        assert_eq!(props.category(), BloomCategory::Medium);
    }

    #[test]
    fn low_range_label_includes_boundary() {
        assert_eq!(classify(50.0), BloomCategory::Low);
        assert_eq!(BloomCategory::Low.range_label(), "≤ 50 mg/m³");
    }

    #[test]
    fn location_from_position() {
        let loc = Location::from_position(&[75.05, 9.95]).unwrap();
        assert!((loc.longitude - 75.05).abs() < f64::EPSILON);
        assert!((loc.latitude - 9.95).abs() < f64::EPSILON);
        assert!(Location::from_position(&[1.0, 2.0, 30.0]).is_some());
        assert!(Location::from_position(&[1.0]).is_none());
    }
}
