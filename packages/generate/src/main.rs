#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for the offline bloom map tools.
//!
//! `phenology` derives bloom points from an NDVI raster; `page` exports the
//! static map page.

use std::path::PathBuf;

use bloom_map_generate::export::export_page;
use bloom_map_generate::phenology::{self, PhenologyOptions};
use bloom_map_render::layers::OverlayTime;
use bloom_map_source::BloomSource;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bloom_map_generate", about = "Bloom map generation tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive bloom `GeoJSON` from an NDVI time-series raster
    Phenology {
        /// NDVI raster (`GeoTIFF`, or JSON for other extensions)
        #[arg(long, default_value = "data/ndvi_series.tif")]
        input: PathBuf,
        /// Output `GeoJSON` file
        #[arg(long, default_value = "data/bloom_phenology.json")]
        output: PathBuf,
        /// Raw peak NDVI threshold (inclusive)
        #[arg(long, default_value_t = phenology::DEFAULT_THRESHOLD)]
        threshold: f64,
        /// Multiplier from raw NDVI peak to `intensity`
        #[arg(long, default_value_t = phenology::DEFAULT_INTENSITY_SCALE)]
        intensity_scale: f64,
        /// Value for each feature's `date` property
        #[arg(long, default_value = "2024 Bloom Period Proxy")]
        date: String,
        /// Value for each feature's `source` property
        #[arg(long, default_value = "MODIS NDVI")]
        source: String,
    },
    /// Export the static map page and pre-rendered markers
    Page {
        /// `GeoJSON` file path or URL
        #[arg(long, default_value = "data/nasa-blooms.json")]
        source: String,
        /// Directory to write `index.html` and `markers.json` into
        #[arg(long, default_value = "data/generated")]
        output_dir: PathBuf,
        /// Overlay imagery date: `latest`, `today` or `YYYY-MM-DD`
        #[arg(long, default_value = "latest")]
        overlay_time: OverlayTime,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Phenology {
            input,
            output,
            threshold,
            intensity_scale,
            date,
            source,
        } => {
            let options = PhenologyOptions {
                threshold,
                intensity_scale,
                date,
                source,
            };
            phenology::run(&input, &output, &options)?;
        }
        Commands::Page {
            source,
            output_dir,
            overlay_time,
        } => {
            let client = reqwest::Client::new();
            let source = BloomSource::from(source.as_str());
            export_page(&client, &source, &output_dir, &overlay_time).await?;
        }
    }

    Ok(())
}
