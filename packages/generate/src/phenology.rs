//! Bloom zone detection from NDVI peaks.
//!
//! Pixels whose peak NDVI over the time series reaches the threshold are
//! grouped into connected zones, and each zone becomes one point feature
//! at its centroid.

use std::path::Path;

use geo::{Centroid, MultiPoint, Point};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde_json::Value;

use crate::GenerateError;
use crate::raster::{NdviRaster, label_regions};

/// Raw NDVI peak value a pixel must reach to count as blooming.
pub const DEFAULT_THRESHOLD: f64 = 2500.0;

/// Multiplier from raw NDVI peak to the `intensity` property.
pub const DEFAULT_INTENSITY_SCALE: f64 = 0.01;

/// Divisor from raw NDVI to the conventional `[-1, 1]` range.
const NDVI_SCALE: f64 = 10_000.0;

/// Zone label written to `name` and `type`.
const ZONE_NAME: &str = "High Vegetation Zone";

/// Tuning and metadata for a phenology run.
#[derive(Debug, Clone, PartialEq)]
pub struct PhenologyOptions {
    /// Raw peak NDVI threshold (inclusive).
    pub threshold: f64,
    /// Multiplier applied to the raw zone peak to produce `intensity`.
    pub intensity_scale: f64,
    /// Value written to each feature's `date`.
    pub date: String,
    /// Value written to each feature's `source`.
    pub source: String,
}

impl Default for PhenologyOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            intensity_scale: DEFAULT_INTENSITY_SCALE,
            date: "2024 Bloom Period Proxy".to_string(),
            source: "MODIS NDVI".to_string(),
        }
    }
}

/// A connected area of blooming pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomZone {
    /// Centroid longitude (map x).
    pub longitude: f64,
    /// Centroid latitude (map y).
    pub latitude: f64,
    /// Highest raw NDVI peak within the zone.
    pub peak: f64,
    /// Number of pixels in the zone.
    pub pixel_count: usize,
}

/// Finds every zone of pixels whose peak NDVI is `>= options.threshold`.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidRaster`] if the raster shape is
/// inconsistent.
pub fn detect_zones(
    raster: &NdviRaster,
    options: &PhenologyOptions,
) -> Result<Vec<BloomZone>, GenerateError> {
    raster.validate()?;

    let peak = raster.peak();
    let highest = peak.iter().copied().fold(f64::NAN, f64::max);
    log::debug!("Highest raw peak value in raster: {highest:.0}");

    let mask: Vec<bool> = peak.iter().map(|v| *v >= options.threshold).collect();
    let regions = label_regions(&mask, raster.width, raster.height);

    let zones = regions
        .iter()
        .filter_map(|cells| {
            let centers: Vec<Point<f64>> = cells
                .iter()
                .map(|idx| {
                    let (x, y) = raster.pixel_center(idx % raster.width, idx / raster.width);
                    Point::new(x, y)
                })
                .collect();
            let centroid = MultiPoint::new(centers).centroid()?;
            let zone_peak = cells.iter().map(|idx| peak[*idx]).fold(f64::NAN, f64::max);

            Some(BloomZone {
                longitude: centroid.x(),
                latitude: centroid.y(),
                peak: zone_peak,
                pixel_count: cells.len(),
            })
        })
        .collect::<Vec<_>>();

    log::info!(
        "Detected {} bloom zones at threshold {}",
        zones.len(),
        options.threshold
    );

    Ok(zones)
}

/// Converts zones into a bloom `FeatureCollection`.
#[must_use]
pub fn zones_to_collection(zones: &[BloomZone], options: &PhenologyOptions) -> FeatureCollection {
    let features = zones
        .iter()
        .map(|zone| {
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), Value::from(ZONE_NAME));
            properties.insert("type".to_string(), Value::from(ZONE_NAME));
            properties.insert(
                "intensity".to_string(),
                Value::from(round2(zone.peak * options.intensity_scale)),
            );
            properties.insert("date".to_string(), Value::from(options.date.as_str()));
            properties.insert("source".to_string(), Value::from(options.source.as_str()));
            properties.insert(
                "species_proxy".to_string(),
                Value::from("Generic Vegetation"),
            );
            properties.insert(
                "ndvi_peak".to_string(),
                Value::from(round2(zone.peak / NDVI_SCALE)),
            );
            properties.insert("pixel_count".to_string(), Value::from(zone.pixel_count));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::Point(vec![
                    zone.longitude,
                    zone.latitude,
                ]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Runs the full pipeline: load raster, detect zones, write `GeoJSON`.
///
/// Returns the number of features written. When no pixel reaches the
/// threshold nothing is written and `0` is returned.
///
/// # Errors
///
/// Returns [`GenerateError`] if the raster cannot be loaded or the output
/// cannot be written.
pub fn run(input: &Path, output: &Path, options: &PhenologyOptions) -> Result<usize, GenerateError> {
    log::info!("Processing NDVI raster {}", input.display());
    let raster = NdviRaster::load(input)?;

    let zones = detect_zones(&raster, options)?;
    if zones.is_empty() {
        log::warn!(
            "No pixels reached the raw {} threshold, skipping save",
            options.threshold
        );
        return Ok(0);
    }

    let collection = zones_to_collection(&zones, options);
    write_collection(&collection, output)?;
    log::info!("Saved {} bloom zones to {}", zones.len(), output.display());

    Ok(zones.len())
}

/// Writes a collection as pretty-printed `GeoJSON`, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns [`GenerateError`] on I/O or serialization failure.
pub fn write_collection(collection: &FeatureCollection, path: &Path) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(collection)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
