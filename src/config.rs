//! Command-line configuration for the `osmviews` binary.
//!
//! Every option that names a file or a size can also be set through an
//! environment variable with the `OSMVIEWS_` prefix:
//!
//! - `OSMVIEWS_FILE` - Path of the local raster (default: osmviews.tiff)
//! - `OSMVIEWS_CACHE_TILES` - Max decoded tiles to keep (default: 512)
//! - `OSMVIEWS_URL` - Where `download` fetches the raster from
//!
//! # Example
//!
//! ```text
//! osmviews download --file /data/osmviews.tiff
//! osmviews rank --file /data/osmviews.tiff 47.391483 8.488963 -33.8568 151.2153
//! osmviews info --file /data/osmviews.tiff
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::fetch::DEFAULT_URL;
use crate::tile::DEFAULT_TILE_CACHE_CAPACITY;

// =============================================================================
// Default Values
// =============================================================================

/// Default raster path.
pub const DEFAULT_FILE: &str = "osmviews.tiff";

// =============================================================================
// CLI Arguments
// =============================================================================

/// OSMviews - popularity ranks of places on Earth.
///
/// Looks up how often map tiles around a coordinate were viewed on
/// OpenStreetMap, using a locally downloaded rank raster.
#[derive(Parser, Debug, Clone)]
#[command(name = "osmviews")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the rank of one or more coordinates.
    Rank(RankConfig),

    /// Print the byte order and tile layout of a raster.
    Info(InfoConfig),

    /// Download the raster, skipping the transfer if it is unchanged.
    Download(DownloadConfig),
}

/// Output style for `rank`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One tab-separated `lat lng rank` line per coordinate
    #[default]
    Text,
    /// A JSON array of objects
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct RankConfig {
    /// Path of the rank raster.
    #[arg(long, default_value = DEFAULT_FILE, env = "OSMVIEWS_FILE")]
    pub file: PathBuf,

    /// Maximum number of decoded tiles to keep in memory.
    #[arg(long, default_value_t = DEFAULT_TILE_CACHE_CAPACITY, env = "OSMVIEWS_CACHE_TILES")]
    pub cache_tiles: usize,

    /// Output style.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Coordinates as consecutive latitude/longitude pairs, in degrees.
    #[arg(required = true, num_args = 2.., allow_negative_numbers = true)]
    pub coordinates: Vec<f64>,
}

impl RankConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_tiles == 0 {
            return Err("cache_tiles must be greater than 0".to_string());
        }

        if self.coordinates.is_empty() || self.coordinates.len() % 2 != 0 {
            return Err(format!(
                "coordinates must come in latitude/longitude pairs, got {} value(s)",
                self.coordinates.len()
            ));
        }

        Ok(())
    }

    /// Coordinates grouped as `(lat, lng)` pairs.
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.coordinates
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect()
    }
}

#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    /// Path of the rank raster.
    #[arg(long, default_value = DEFAULT_FILE, env = "OSMVIEWS_FILE")]
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadConfig {
    /// Where to store the raster. Validators go to a `.json` file beside it.
    #[arg(long, default_value = DEFAULT_FILE, env = "OSMVIEWS_FILE")]
    pub file: PathBuf,

    /// URL of the published raster.
    #[arg(long, default_value = DEFAULT_URL, env = "OSMVIEWS_URL")]
    pub url: String,
}

impl DownloadConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(format!("url must be http(s), got '{}'", self.url));
        }
        Ok(())
    }
}

impl Cli {
    /// Validate whichever subcommand was chosen.
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Rank(config) => config.validate(),
            Command::Info(_) => Ok(()),
            Command::Download(config) => config.validate(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
