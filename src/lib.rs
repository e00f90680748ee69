//! # OSMviews
//!
//! Popularity ranks of places on Earth, read from the OSMviews raster.
//!
//! The raster is a world map at zoom level 18 in Web-Mercator projection.
//! Each pixel holds a float counting how often the map tiles at that spot
//! were viewed. The file is a tiled, deflate-compressed TIFF; this crate
//! reads exactly the subset of TIFF needed for that layout, and inflates
//! only the tiles a lookup touches.
//!
//! ## Architecture
//!
//! - [`io`] - Positioned byte-range reads over the local file
//! - [`mod@format`] - TIFF header, tag directory and raster geometry
//! - [`geo`] - Latitude/longitude to pixel and tile mapping
//! - [`tile`] - Tile inflation and the LRU tile cache
//! - [`reader`] - The public [`Reader`] and its thread-safe wrapper
//! - [`fetch`] - Conditional download of the raster
//! - [`config`] - CLI types for the `osmviews` binary
//!
//! ## Example
//!
//! ```rust,no_run
//! use osmviews::Reader;
//!
//! let mut reader = Reader::open("osmviews.tiff")?;
//! let zurich = reader.rank(47.391483, 8.488963)?;
//! let north_pole = reader.rank(90.0, 0.0)?;
//! assert_eq!(north_pole, 0.0);
//! println!("Zurich: {zurich}");
//! reader.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod geo;
pub mod io;
pub mod reader;
pub mod tile;

// Re-export commonly used types
pub use error::{FetchError, FormatError, IoError, TiffError, TileError};
pub use fetch::{download, FetchOutcome};
pub use format::tiff::{ByteOrder, RasterGeometry};
pub use io::{FileRangeReader, RangeReader};
pub use reader::{open, Reader, SharedReader};
pub use tile::{CacheStats, DEFAULT_TILE_CACHE_CAPACITY};
