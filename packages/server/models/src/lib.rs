#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the bloom map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the render types to allow independent evolution of the API
//! contract.

use bloom_map_bloom_models::{BloomCategory, Location};
use bloom_map_render::legend::LegendEntry;
use bloom_map_render::{MarkerStyle, RenderedMarker};
use serde::{Deserialize, Serialize};

/// A bloom marker as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMarker {
    /// Intensity category.
    pub category: BloomCategory,
    /// Marker position.
    pub location: Location,
    /// Circle marker options, in the map widget's naming.
    pub style: MarkerStyle,
    /// Popup HTML; `null` means no popup is bound.
    pub popup: Option<String>,
}

impl From<RenderedMarker> for ApiMarker {
    fn from(marker: RenderedMarker) -> Self {
        Self {
            category: marker.category,
            location: marker.location,
            style: marker.style,
            popup: marker.popup,
        }
    }
}

/// One legend row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLegendEntry {
    /// Category the row describes.
    pub category: BloomCategory,
    /// Swatch color.
    pub color: String,
    /// Row text.
    pub label: String,
}

impl From<LegendEntry> for ApiLegendEntry {
    fn from(entry: LegendEntry) -> Self {
        Self {
            category: entry.category,
            color: entry.color,
            label: entry.label,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned alongside non-success statuses.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Short description of the failure.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use bloom_map_render::legend::legend_entries;

    use super::*;

    #[test]
    fn marker_serializes_camel_case() {
        let marker = ApiMarker::from(RenderedMarker {
            category: BloomCategory::High,
            location: Location {
                latitude: 27.3,
                longitude: -82.5,
            },
            style: MarkerStyle::for_category(BloomCategory::High),
            popup: None,
        });
        let json = serde_json::to_value(&marker).unwrap();
        assert_eq!(json["category"], "HIGH");
        assert_eq!(json["location"]["latitude"], 27.3);
        assert_eq!(json["style"]["fillColor"], "#ff0000");
        assert!(json["popup"].is_null());
    }

    #[test]
    fn legend_entries_convert() {
        let api: Vec<ApiLegendEntry> = legend_entries()
            .into_iter()
            .map(ApiLegendEntry::from)
            .collect();
        assert_eq!(api.len(), 3);
        assert_eq!(api[2].category, BloomCategory::Low);
    }
}
