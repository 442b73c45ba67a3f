#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the bloom map.
//!
//! Serves the Leaflet page at `/`, pre-rendered bloom markers at
//! `/api/markers`, the raw `GeoJSON` at `/geojson`, and the data
//! directory under `/data`. Bloom data is re-read on every request, so
//! replacing the data file takes effect without a restart.

mod handlers;

use std::path::{Path, PathBuf};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use bloom_map_render::layers::{MapConfig, OverlayTime};
use bloom_map_render::page;
use bloom_map_source::BloomSource;

/// File name of the default bloom data file inside the data directory.
pub const DEFAULT_DATA_FILE: &str = "nasa-blooms.json";

/// Path the page fetches markers from.
pub const MARKERS_PATH: &str = "/api/markers";

/// Server settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to listen on (`PORT`).
    pub port: u16,
    /// Directory served under `/data` (`BLOOM_DATA_DIR`).
    pub data_dir: PathBuf,
    /// Where bloom features are loaded from (`BLOOM_SOURCE`).
    pub source: BloomSource,
    /// Date of the satellite overlay (`BLOOM_OVERLAY_TIME`).
    pub overlay_time: OverlayTime,
}

impl ServerConfig {
    /// Reads the configuration from environment variables, falling back
    /// to defaults for anything unset or invalid.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = match lookup("PORT") {
            Some(p) => p.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid PORT '{p}', using 8080");
                8080
            }),
            None => 8080,
        };

        let data_dir =
            PathBuf::from(lookup("BLOOM_DATA_DIR").unwrap_or_else(|| "data".to_string()));

        let source = lookup("BLOOM_SOURCE").map_or_else(
            || BloomSource::File(data_dir.join(DEFAULT_DATA_FILE)),
            |s| BloomSource::from(s.as_str()),
        );

        let overlay_time = match lookup("BLOOM_OVERLAY_TIME") {
            Some(t) => t.parse().unwrap_or_else(|e| {
                log::warn!("{e}, using latest imagery");
                OverlayTime::Latest
            }),
            None => OverlayTime::Latest,
        };

        Self {
            bind_addr,
            port,
            data_dir,
            source,
            overlay_time,
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// HTTP client for remote bloom sources.
    pub client: reqwest::Client,
    /// Where bloom features are loaded from.
    pub source: BloomSource,
    /// Static view and tile layer configuration.
    pub map_config: MapConfig,
    /// Overlay date, resolved again on every page request.
    pub overlay_time: OverlayTime,
}

impl AppState {
    /// Builds the state for `config`.
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            source: config.source.clone(),
            map_config: MapConfig::embedded(),
            overlay_time: config.overlay_time,
        }
    }

    /// Renders the page for the current moment, so
    /// [`OverlayTime::Today`] follows the UTC date.
    #[must_use]
    pub fn index_html(&self) -> String {
        page::render_index_html(&self.map_config, &self.overlay_time, MARKERS_PATH)
    }
}

/// Registers all routes. `data_dir` is served statically under `/data`.
pub fn routes(cfg: &mut web::ServiceConfig, data_dir: &Path) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/geojson", web::get().to(handlers::geojson))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/legend", web::get().to(handlers::legend))
                .route("/markers", web::get().to(handlers::markers)),
        )
        .service(Files::new("/data", data_dir));
}

/// Starts the bloom map server.
///
/// Reads [`ServerConfig`] from the environment and runs the Actix-Web
/// HTTP server. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();
    log::info!("Serving bloom data from {}", config.source);

    let state = web::Data::new(AppState::new(&config));
    let data_dir = config.data_dir.clone();

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(|cfg| routes(cfg, &data_dir))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(
            config.source,
            BloomSource::File(PathBuf::from("data/nasa-blooms.json"))
        );
        assert_eq!(config.overlay_time, OverlayTime::Latest);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "9000"),
            ("BLOOM_DATA_DIR", "/srv/blooms"),
            ("BLOOM_SOURCE", "https://example.org/blooms.json"),
            ("BLOOM_OVERLAY_TIME", "today"),
        ]);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, PathBuf::from("/srv/blooms"));
        assert_eq!(
            config.source,
            BloomSource::Url("https://example.org/blooms.json".to_string())
        );
        assert_eq!(config.overlay_time, OverlayTime::Today);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("BLOOM_OVERLAY_TIME", "soon")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.overlay_time, OverlayTime::Latest);
    }

    #[test]
    fn source_defaults_inside_data_dir() {
        let config = config_from(&[("BLOOM_DATA_DIR", "public")]);
        assert_eq!(
            config.source,
            BloomSource::File(PathBuf::from("public/nasa-blooms.json"))
        );
    }
}
