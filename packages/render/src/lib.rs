#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Marker styling, popups, legend and Leaflet page rendering for bloom
//! events.
//!
//! Each `GeoJSON` feature is turned into a [`RenderedMarker`]: a circle
//! marker style colored by [`classify`](bloom_map_bloom_models::classify)
//! and an optional popup. The browser page only has to place the
//! pre-rendered markers on the map.

pub mod layers;
pub mod legend;
pub mod page;

use bloom_map_bloom_models::{
    BloomCategory, BloomEvent, BloomProperties, INTENSITY_UNIT, Location,
};
use geojson::{Feature, FeatureCollection};
use serde::{Deserialize, Serialize};

/// Circle marker radius, in pixels.
pub const MARKER_RADIUS: f64 = 8.0;

/// Outline color shared by every marker.
pub const OUTLINE_COLOR: &str = "#ffffff";

/// Display options for one circle marker.
///
/// Field names serialize to the map widget's own option names
/// (`fillColor`, `fillOpacity`, ...), so the JSON can be handed to it
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    /// Radius in pixels.
    pub radius: f64,
    /// Fill color from the bloom category.
    pub fill_color: String,
    /// Outline color.
    pub color: String,
    /// Outline width in pixels.
    pub weight: f64,
    /// Outline opacity.
    pub opacity: f64,
    /// Fill opacity.
    pub fill_opacity: f64,
}

impl MarkerStyle {
    /// Style for a marker of the given category.
    #[must_use]
    pub fn for_category(category: BloomCategory) -> Self {
        Self {
            radius: MARKER_RADIUS,
            fill_color: category.color().to_string(),
            color: OUTLINE_COLOR.to_string(),
            weight: 1.0,
            opacity: 1.0,
            fill_opacity: 0.8,
        }
    }
}

/// A bloom event ready to be placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedMarker {
    /// Intensity bucket the style was derived from.
    pub category: BloomCategory,
    /// Where to place the marker.
    pub location: Location,
    /// Circle marker options.
    pub style: MarkerStyle,
    /// Popup HTML, or `None` when the feature has no properties (no popup
    /// is bound in that case).
    pub popup: Option<String>,
}

/// Marker style for a bloom event.
#[must_use]
pub fn render_style(event: &BloomEvent) -> MarkerStyle {
    MarkerStyle::for_category(event.category())
}

/// Popup HTML for a bloom event's properties.
///
/// Field values are inserted verbatim: no escaping, no truncation.
#[must_use]
pub fn render_popup(properties: &BloomProperties) -> String {
    format!(
        "<strong>Intensity:</strong> <span style=\"color:{color}\">{intensity} {INTENSITY_UNIT}</span><br>\
         <strong>Type:</strong> {event_type}<br>\
         <strong>Date:</strong> {date}<br>\
         <strong>Source:</strong> {source}",
        color = properties.category().color(),
        intensity = properties.intensity_text(),
        event_type = properties.event_type_text(),
        date = properties.date_text(),
        source = properties.source_text(),
    )
}

/// Reads a [`BloomEvent`] out of a `GeoJSON` feature.
///
/// Only point geometry yields a location.
#[must_use]
pub fn event_from_feature(feature: &Feature) -> BloomEvent {
    let location = feature
        .geometry
        .as_ref()
        .and_then(|geometry| match &geometry.value {
            geojson::Value::Point(position) => Location::from_position(position),
            _ => None,
        });

    BloomEvent {
        location,
        properties: feature.properties.as_ref().map(BloomProperties::from_map),
    }
}

/// Renders a single feature.
///
/// Returns `None` for features without point geometry, since they cannot
/// be drawn as a circle marker.
#[must_use]
pub fn render_feature(feature: &Feature) -> Option<RenderedMarker> {
    let event = event_from_feature(feature);

    let Some(location) = event.location else {
        log::debug!("Skipping bloom feature without point geometry");
        return None;
    };

    Some(RenderedMarker {
        category: event.category(),
        location,
        style: render_style(&event),
        popup: event.properties.as_ref().map(render_popup),
    })
}

/// Renders every drawable feature of a collection, in input order.
#[must_use]
pub fn render_collection(collection: &FeatureCollection) -> Vec<RenderedMarker> {
    let markers: Vec<RenderedMarker> = collection
        .features
        .iter()
        .filter_map(render_feature)
        .collect();

    log::debug!(
        "Rendered {} of {} bloom features",
        markers.len(),
        collection.features.len()
    );

    markers
}
