#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Offline tooling for the bloom map.
//!
//! [`phenology`] turns an NDVI time-series raster into bloom point
//! features: per-pixel peak over time, threshold, connected zones,
//! centroids. [`export`] renders the static page and its marker list so
//! the map can be served without the API server.

pub mod export;
pub mod phenology;
pub mod raster;

use thiserror::Error;

/// Errors that can occur while generating bloom outputs.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// I/O error reading input or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `GeoTIFF` decoding failed.
    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// The raster shape is inconsistent.
    #[error("Invalid raster: {message}")]
    InvalidRaster {
        /// Description of what went wrong.
        message: String,
    },
}
