//! Static page export.
//!
//! Writes `index.html` together with a pre-rendered `markers.json` so the
//! bloom map can be hosted by any static file server.

use std::path::Path;

use bloom_map_render::layers::{MapConfig, OverlayTime};
use bloom_map_render::{page, render_collection};
use bloom_map_source::{BloomSource, load_or_empty};

use crate::GenerateError;

/// File name of the exported marker list, relative to the page.
pub const MARKERS_FILE: &str = "markers.json";

/// Exports the page and markers into `output_dir`.
///
/// A source that fails to load is logged and produces an empty marker
/// list; the page itself is always written. Returns the number of markers
/// exported.
///
/// # Errors
///
/// Returns [`GenerateError`] if the output files cannot be written.
pub async fn export_page(
    client: &reqwest::Client,
    source: &BloomSource,
    output_dir: &Path,
    time: &OverlayTime,
) -> Result<usize, GenerateError> {
    let collection = load_or_empty(client, source).await;
    let markers = render_collection(&collection);

    std::fs::create_dir_all(output_dir)?;

    let html = page::render_index_html(&MapConfig::embedded(), time, MARKERS_FILE);
    std::fs::write(output_dir.join("index.html"), html)?;
    std::fs::write(
        output_dir.join(MARKERS_FILE),
        serde_json::to_string(&markers)?,
    )?;

    log::info!(
        "Exported {} bloom markers to {}",
        markers.len(),
        output_dir.display()
    );

    Ok(markers.len())
}
