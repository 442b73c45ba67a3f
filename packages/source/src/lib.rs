#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bloom event `GeoJSON` loading.
//!
//! Reads a `GeoJSON` `FeatureCollection` from a local file or fetches it
//! from a URL. Nothing is validated beyond `GeoJSON` well-formedness, and
//! nothing is retried or cached.

use std::fmt;
use std::path::PathBuf;

use geojson::{FeatureCollection, GeoJson};
use thiserror::Error;

/// Errors that can occur while loading bloom data.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("GeoJSON request to {url} failed with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: reqwest::StatusCode,
    },

    /// I/O error reading a local file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload is not a `GeoJSON` `FeatureCollection`.
    #[error("GeoJSON parse error: {0}")]
    GeoJson(#[from] geojson::Error),
}

/// Where bloom data is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BloomSource {
    /// A local `GeoJSON` file.
    File(PathBuf),
    /// A URL serving `GeoJSON`.
    Url(String),
}

impl From<&str> for BloomSource {
    /// `http://` and `https://` locations become [`BloomSource::Url`];
    /// anything else is treated as a file path.
    fn from(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for BloomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Parses a `GeoJSON` document that must be a `FeatureCollection`.
///
/// # Errors
///
/// Returns [`SourceError::GeoJson`] if the text is not valid JSON, not
/// valid `GeoJSON`, or a `GeoJSON` object other than a `FeatureCollection`.
pub fn parse_collection(body: &str) -> Result<FeatureCollection, SourceError> {
    let geojson: GeoJson = body.parse()?;
    Ok(FeatureCollection::try_from(geojson)?)
}

/// Loads the bloom `FeatureCollection` from `source`.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read, the request fails
/// or returns a non-success status, or the body does not parse.
pub async fn load_collection(
    client: &reqwest::Client,
    source: &BloomSource,
) -> Result<FeatureCollection, SourceError> {
    let body = match source {
        BloomSource::File(path) => tokio::fs::read_to_string(path).await?,
        BloomSource::Url(url) => {
            let resp = client.get(url).send().await?;
            if !resp.status().is_success() {
                return Err(SourceError::Status {
                    url: url.clone(),
                    status: resp.status(),
                });
            }
            resp.text().await?
        }
    };

    let collection = parse_collection(&body)?;
    log::debug!(
        "Loaded {} bloom features from {source}",
        collection.features.len()
    );
    Ok(collection)
}

/// Loads the bloom collection, collapsing any failure into one logged
/// error and an empty collection.
pub async fn load_or_empty(client: &reqwest::Client, source: &BloomSource) -> FeatureCollection {
    match load_collection(client, source).await {
        Ok(collection) => collection,
        Err(e) => {
            log::error!("Failed to load bloom data from {source}: {e}");
            empty_collection()
        }
    }
}

/// A `FeatureCollection` with no features.
#[must_use]
pub const fn empty_collection() -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "bloom_map_source_{}_{name}.json",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn source_from_location() {
        assert_eq!(
            BloomSource::from("https://example.org/blooms.json"),
            BloomSource::Url("https://example.org/blooms.json".to_string())
        );
        assert_eq!(
            BloomSource::from("data/nasa-blooms.json"),
            BloomSource::File(PathBuf::from("data/nasa-blooms.json"))
        );
    }

    #[test]
    fn parses_feature_collection() {
        let body = sample_body();
        let collection = parse_collection(&body).unwrap();
        assert_eq!(collection.features.len(), 1);
        assert!(collection.features[0].properties.is_some());
    }

    #[test]
    fn parses_empty_collection() {
        let collection =
            parse_collection(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert!(collection.features.is_empty());
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(matches!(
            parse_collection("not json"),
            Err(SourceError::GeoJson(_))
        ));
        assert!(matches!(
            parse_collection(r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#),
            Err(SourceError::GeoJson(_))
        ));
    }

    #[tokio::test]
    async fn loads_from_file() {
        let path = temp_file("loads_from_file", &sample_body());
        let client = reqwest::Client::new();
        let collection = load_collection(&client, &BloomSource::File(path.clone()))
            .await
            .unwrap();
        assert_eq!(collection.features.len(), 1);
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let client = reqwest::Client::new();
        let source = BloomSource::File(PathBuf::from("/nonexistent/bloom_map/blooms.json"));
        assert!(matches!(
            load_collection(&client, &source).await,
            Err(SourceError::Io(_))
        ));
    }

    #[tokio::test]
    async fn load_or_empty_collapses_failures() {
        let client = reqwest::Client::new();

        let missing = BloomSource::File(PathBuf::from("/nonexistent/bloom_map/blooms.json"));
        assert!(load_or_empty(&client, &missing).await.features.is_empty());

        let path = temp_file("load_or_empty_malformed", "{\"type\": \"Feature");
        let malformed = BloomSource::File(path.clone());
        assert!(load_or_empty(&client, &malformed).await.features.is_empty());
        std::fs::remove_file(path).unwrap();
    }

    fn local_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    /// Serves a single canned HTTP response on a local port and returns a
    /// URL pointing at it.
    async fn serve_once(status_line: &'static str, body: String) -> String {
        use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}/blooms.json")
    }

    /// A URL on a local port nothing is listening on.
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/blooms.json")
    }

    #[tokio::test]
    async fn loads_from_url() {
        let url = serve_once("200 OK", sample_body()).await;
        let collection = load_collection(&local_client(), &BloomSource::Url(url))
            .await
            .unwrap();
        assert_eq!(collection.features.len(), 1);
    }

    #[tokio::test]
    async fn connection_refused_is_an_http_error() {
        let source = BloomSource::Url(closed_port_url());
        assert!(matches!(
            load_collection(&local_client(), &source).await,
            Err(SourceError::Http(_))
        ));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let url = serve_once("404 Not Found", "{}".to_string()).await;
        let result = load_collection(&local_client(), &BloomSource::Url(url.clone())).await;
        match result {
            Err(SourceError::Status { url: failed, status }) => {
                assert_eq!(failed, url);
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn load_or_empty_collapses_network_failures() {
        let client = local_client();

        let refused = BloomSource::Url(closed_port_url());
        assert!(load_or_empty(&client, &refused).await.features.is_empty());

        let not_found = BloomSource::Url(serve_once("404 Not Found", "{}".to_string()).await);
        assert!(load_or_empty(&client, &not_found).await.features.is_empty());
    }

    fn sample_body() -> String {
        r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-82.5, 27.3] },
                "properties": {
                    "intensity": 120,
                    "type": "Algal",
                    "date": "2024-05-01",
                    "source": "MODIS"
                }
            }]
        }"#
        .to_string()
    }
}
