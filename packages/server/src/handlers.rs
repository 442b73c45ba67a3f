//! HTTP handler functions for the bloom map API.

use actix_web::{HttpResponse, web};
use bloom_map_render::legend::legend_entries;
use bloom_map_render::render_collection;
use bloom_map_server_models::{ApiError, ApiHealth, ApiLegendEntry, ApiMarker};
use bloom_map_source::load_collection;

use crate::AppState;

/// `GET /`
pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(state.index_html())
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/legend`
///
/// Returns the three fixed legend rows.
pub async fn legend() -> HttpResponse {
    let entries: Vec<ApiLegendEntry> = legend_entries()
        .into_iter()
        .map(ApiLegendEntry::from)
        .collect();
    HttpResponse::Ok().json(entries)
}

/// `GET /api/markers`
///
/// Loads the bloom source and returns one marker per point feature.
pub async fn markers(state: web::Data<AppState>) -> HttpResponse {
    match load_collection(&state.client, &state.source).await {
        Ok(collection) => {
            let markers: Vec<ApiMarker> = render_collection(&collection)
                .into_iter()
                .map(ApiMarker::from)
                .collect();
            HttpResponse::Ok().json(markers)
        }
        Err(e) => {
            log::error!("Failed to load bloom data from {}: {e}", state.source);
            HttpResponse::BadGateway().json(ApiError {
                error: "Failed to load bloom data".to_string(),
            })
        }
    }
}

/// `GET /geojson`
///
/// Returns the bloom `FeatureCollection` as loaded, without rendering.
pub async fn geojson(state: web::Data<AppState>) -> HttpResponse {
    match load_collection(&state.client, &state.source).await {
        Ok(collection) => HttpResponse::Ok().json(collection),
        Err(e) => {
            log::error!("Failed to load bloom data from {}: {e}", state.source);
            HttpResponse::BadGateway().json(ApiError {
                error: "Failed to load bloom data".to_string(),
            })
        }
    }
}
