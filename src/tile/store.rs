//! Tile store: read, inflate and cache tiles on demand.
//!
//! On a cache hit no I/O happens. On a miss the store reads the tile's
//! compressed bytes, decodes them and inserts the result, evicting the
//! least-recently-used tile when full. A failed read or decode leaves the
//! cache untouched.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::TileError;
use crate::format::tiff::{ByteOrder, RasterGeometry};
use crate::io::RangeReader;

use super::cache::{CacheStats, TileCache};
use super::decoder::{decode_tile, Tile};

/// Decoded-tile source backed by a range reader and an LRU cache.
pub struct TileStore<R: RangeReader> {
    reader: R,
    byte_order: ByteOrder,
    cache: TileCache,
}

impl<R: RangeReader> TileStore<R> {
    /// Create a store over `reader` caching at most `capacity` tiles.
    pub fn new(reader: R, byte_order: ByteOrder, capacity: usize) -> Self {
        Self {
            reader,
            byte_order,
            cache: TileCache::with_capacity(capacity),
        }
    }

    /// Get a decoded tile, reading it from the file on a cache miss.
    ///
    /// # Errors
    /// - `TileOutOfRange` if `tile_index` is not in the tile directory
    /// - `Io` if the compressed bytes cannot be read
    /// - `Decode` / `SizeMismatch` if they do not inflate to a full tile
    pub fn get_tile(
        &mut self,
        geometry: &RasterGeometry,
        tile_index: usize,
    ) -> Result<Arc<Tile>, TileError> {
        let count = geometry.tile_count();
        if tile_index >= count {
            return Err(TileError::TileOutOfRange {
                index: tile_index,
                count,
            });
        }

        if let Some(tile) = self.cache.get(tile_index) {
            trace!(tile_index, "Tile cache hit");
            return Ok(tile);
        }

        let offset = geometry.tile_offsets[tile_index];
        let len = geometry.tile_byte_counts[tile_index] as usize;
        debug!(
            tile_index,
            offset,
            len,
            source = self.reader.identifier(),
            "Tile cache miss, reading tile"
        );

        let compressed = self.reader.read_exact_at(offset, len)?;
        let tile = Arc::new(decode_tile(
            tile_index,
            &compressed,
            self.byte_order,
            geometry.pixels_per_tile(),
        )?);

        if let Some(evicted) = self.cache.put(tile_index, Arc::clone(&tile)) {
            trace!(evicted, "Evicted tile from cache");
        }

        Ok(tile)
    }

    /// Cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop all cached tiles.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// The underlying reader.
    pub fn reader(&self) -> &R {
        &self.reader
    }
}
