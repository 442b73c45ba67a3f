//! The single Leaflet page.
//!
//! The page script is deliberately thin: it sets up the two tile layers,
//! fetches pre-rendered markers from `markers_url`, and hands each one to
//! `L.circleMarker`. A failed fetch is logged to the console once and the
//! base map and legend stay up.

use serde::Serialize;

use crate::layers::{MapConfig, OverlayTime, TileLayerConfig};
use crate::legend::legend_html;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Bloom Map</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" crossorigin="" />
  <style>
    html, body { height: 100%; margin: 0; padding: 0; background: #111; }
    #map { height: 100%; width: 100%; }
    #legend {
      position: absolute;
      bottom: 24px;
      right: 12px;
      z-index: 1000;
      background: rgba(20, 20, 20, 0.85);
      color: #eee;
      font: 13px/20px sans-serif;
      padding: 8px 10px;
      border-radius: 4px;
    }
    #legend i {
      display: inline-block;
      width: 12px;
      height: 12px;
      margin-right: 6px;
      border-radius: 50%;
      border: 1px solid #fff;
      vertical-align: middle;
    }
  </style>
</head>
<body>
  <div id="map"></div>
  <div id="legend"><strong>Bloom intensity</strong>
{{LEGEND}}
  </div>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js" crossorigin=""></script>
  <script>
    const CONFIG = {{CONFIG}};

    const map = L.map('map').setView(CONFIG.view.center, CONFIG.view.zoom);

    L.tileLayer(CONFIG.base.url, {
      attribution: CONFIG.base.attribution,
      maxZoom: CONFIG.base.maxZoom,
      opacity: CONFIG.base.opacity,
    }).addTo(map);

    L.tileLayer(CONFIG.overlay.url, {
      attribution: CONFIG.overlay.attribution,
      maxNativeZoom: CONFIG.overlay.maxZoom,
      opacity: CONFIG.overlay.opacity,
    }).addTo(map);

    async function loadBlooms() {
      try {
        const response = await fetch(CONFIG.markersUrl);
        if (!response.ok) {
          throw new Error(`HTTP ${response.status}`);
        }
        const markers = await response.json();
        for (const m of markers) {
          const marker = L.circleMarker(
            [m.location.latitude, m.location.longitude],
            m.style,
          ).addTo(map);
          if (m.popup) {
            marker.bindPopup(m.popup);
          }
        }
      } catch (err) {
        console.error('Failed to load bloom data:', err);
      }
    }

    loadBlooms();
  </script>
</body>
</html>
"#;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageLayer<'a> {
    url: String,
    attribution: &'a str,
    max_zoom: u8,
    opacity: f64,
}

impl<'a> PageLayer<'a> {
    fn new(layer: &'a TileLayerConfig, time: &OverlayTime) -> Self {
        Self {
            url: layer.resolve_url(time),
            attribution: &layer.attribution,
            max_zoom: layer.max_zoom,
            opacity: layer.opacity,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageView {
    center: [f64; 2],
    zoom: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageConfig<'a> {
    view: PageView,
    base: PageLayer<'a>,
    overlay: PageLayer<'a>,
    markers_url: &'a str,
}

/// Renders the complete page.
///
/// `markers_url` is fetched by the page and must return a JSON array of
/// [`RenderedMarker`](crate::RenderedMarker)s.
#[must_use]
pub fn render_index_html(config: &MapConfig, time: &OverlayTime, markers_url: &str) -> String {
    let page_config = PageConfig {
        view: PageView {
            center: config.view.center,
            zoom: config.view.zoom,
        },
        base: PageLayer::new(&config.base, time),
        overlay: PageLayer::new(&config.overlay, time),
        markers_url,
    };

    // Serializing plain strings and numbers cannot fail.
    let config_json = serde_json::to_string(&page_config).unwrap_or_else(|_| "{}".to_string());

    INDEX_HTML
        .replace("{{LEGEND}}", &legend_html())
        .replace("{{CONFIG}}", &config_json.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn page_contains_layers_legend_and_markers_url() {
        let config = MapConfig::embedded();
        let html = render_index_html(&config, &OverlayTime::Latest, "/api/markers");

        assert!(html.contains("\"markersUrl\":\"/api/markers\""));
        assert!(html.contains("dark_all"));
        assert!(html.contains("MODIS_Aqua_Chlorophyll_A"));
        assert!(html.contains("<div id=\"legend\">"));
        assert_eq!(html.matches("legend-row").count(), 3);
        assert!(!html.contains("{{"));
    }

    #[test]
    fn page_uses_fixed_overlay_date() {
        let config = MapConfig::embedded();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let html = render_index_html(&config, &OverlayTime::Fixed(date), "markers.json");
        assert!(html.contains("/default/2024-05-01/GoogleMapsCompatible_Level7/"));
    }

    #[test]
    fn fetch_failure_is_logged_once() {
        let html = render_index_html(&MapConfig::embedded(), &OverlayTime::Latest, "m.json");
        assert_eq!(html.matches("console.error").count(), 1);
        assert!(html.contains("if (m.popup)"));
    }
}
