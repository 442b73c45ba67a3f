#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the bloom map.
//!
//! Thin entry point; see [`bloom_map_server::run_server`].

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    bloom_map_server::run_server().await
}
