//! Single-owner rank reader.
//!
//! Opening parses the header, the tag directory and the raster geometry
//! once. Each lookup then touches at most one tile.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{FormatError, TiffError, TileError};
use crate::format::tiff::{ByteOrder, RasterGeometry, TagDirectory, TiffHeader};
use crate::geo::locate;
use crate::io::{FileRangeReader, RangeReader};
use crate::tile::{CacheStats, TileStore, DEFAULT_TILE_CACHE_CAPACITY};

/// Open a rank raster with the default tile cache capacity.
///
/// Shorthand for [`Reader::open`].
pub fn open(path: impl AsRef<Path>) -> Result<Reader, FormatError> {
    Reader::open(path)
}

/// Popularity rank lookups against a tiled raster.
///
/// Owns the underlying resource exclusively. The file is released when the
/// reader is closed or dropped, including when opening fails half-way.
///
/// # Example
///
/// ```rust,no_run
/// let mut views = osmviews::open("osmviews.tiff")?;
/// let rank = views.rank(47.391483, 8.488963)?;
/// println!("rank: {rank}");
/// views.close();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Reader<R: RangeReader = FileRangeReader> {
    byte_order: ByteOrder,
    geometry: Arc<RasterGeometry>,
    tiles: TileStore<R>,
}

impl Reader<FileRangeReader> {
    /// Open the raster at `path`.
    ///
    /// # Errors
    /// - `FormatError::Io` if the file cannot be opened or read
    /// - `FormatError::Unrecognized` on bad magic, missing tags or an
    ///   unsupported tile layout
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        Self::open_with_cache_capacity(path, DEFAULT_TILE_CACHE_CAPACITY)
    }

    /// Open the raster at `path`, caching at most `capacity` decoded tiles.
    pub fn open_with_cache_capacity(
        path: impl AsRef<Path>,
        capacity: usize,
    ) -> Result<Self, FormatError> {
        let file = FileRangeReader::open(path)?;
        Self::with_cache_capacity(file, capacity)
    }
}

/// Parse header, tag directory and geometry.
fn parse_layout<R: RangeReader>(reader: &mut R) -> Result<(ByteOrder, RasterGeometry), TiffError> {
    let header = TiffHeader::read(reader)?;
    debug!(
        byte_order = header.byte_order.as_str(),
        ifd_offset = header.ifd_offset,
        "Parsed TIFF header"
    );

    let directory = TagDirectory::read(reader, &header)?;
    let geometry = RasterGeometry::from_directory(&directory)?;
    Ok((header.byte_order, geometry))
}

impl<R: RangeReader> Reader<R> {
    /// Build a reader over an already-open resource.
    pub fn from_reader(reader: R) -> Result<Self, FormatError> {
        Self::with_cache_capacity(reader, DEFAULT_TILE_CACHE_CAPACITY)
    }

    /// Build a reader over an already-open resource with a custom cache size.
    ///
    /// On error `reader` is dropped before this returns.
    pub fn with_cache_capacity(mut reader: R, capacity: usize) -> Result<Self, FormatError> {
        let (byte_order, geometry) = match parse_layout(&mut reader) {
            Ok(layout) => layout,
            Err(e) => return Err(FormatError::from_tiff(reader.identifier(), e)),
        };

        info!(
            source = reader.identifier(),
            zoom = geometry.zoom,
            tiles = geometry.tile_count(),
            tile_size = geometry.tile_width,
            "Opened rank raster"
        );

        Ok(Reader {
            byte_order,
            geometry: Arc::new(geometry),
            tiles: TileStore::new(reader, byte_order, capacity),
        })
    }

    /// Popularity rank at a coordinate.
    ///
    /// Latitudes at or beyond ±85.051129° are outside the projection and
    /// rank 0.0 without touching the tile store.
    ///
    /// # Errors
    /// - `OutsideRaster` for coordinates off the pixel grid (e.g. longitude 180)
    /// - `TileOutOfRange` if the coordinate maps past the tile directory
    /// - `Io`, `Decode`, `SizeMismatch` if the tile cannot be loaded
    pub fn rank(&mut self, lat: f64, lng: f64) -> Result<f64, TileError> {
        let Some(location) = locate(lat, lng, &self.geometry)? else {
            return Ok(0.0);
        };

        let tile = self.tiles.get_tile(&self.geometry, location.tile_index)?;
        let pixel = tile
            .get(location.offset)
            .ok_or_else(|| TileError::SizeMismatch {
                tile_index: location.tile_index,
                expected: self.geometry.pixels_per_tile(),
                actual: tile.len(),
            })?;

        Ok(pixel as f64)
    }

    /// Close the reader, releasing the file and discarding cached tiles.
    ///
    /// Dropping the reader has the same effect.
    pub fn close(self) {
        debug!(source = self.tiles.reader().identifier(), "Closing rank raster");
    }

    /// Byte order of the raster file.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Layout of the raster.
    pub fn geometry(&self) -> &RasterGeometry {
        &self.geometry
    }

    /// Shared handle to the layout, valid after the reader is gone.
    pub fn shared_geometry(&self) -> Arc<RasterGeometry> {
        Arc::clone(&self.geometry)
    }

    /// Tile cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.tiles.cache_stats()
    }

    /// Identifier of the underlying resource.
    pub fn identifier(&self) -> &str {
        self.tiles.reader().identifier()
    }
}

impl<R: RangeReader> std::fmt::Debug for Reader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("source", &self.identifier())
            .field("byte_order", &self.byte_order)
            .field("zoom", &self.geometry.zoom)
            .field("tiles", &self.geometry.tile_count())
            .finish()
    }
}
