use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::TileError;
use crate::format::tiff::RasterGeometry;
use crate::io::{FileRangeReader, RangeReader};
use crate::tile::CacheStats;

use super::rank_reader::Reader;

/// A [`Reader`] that can be queried from several threads.
///
/// A single lock covers seek, read, inflate and cache insert, so two
/// threads asking for the same tile never interleave file access. For
/// parallel throughput, open one reader per thread instead.
pub struct SharedReader<R: RangeReader = FileRangeReader> {
    inner: Mutex<Reader<R>>,
    geometry: Arc<RasterGeometry>,
}

impl<R: RangeReader> SharedReader<R> {
    /// Wrap a reader.
    pub fn new(reader: Reader<R>) -> Self {
        let geometry = reader.shared_geometry();
        Self {
            inner: Mutex::new(reader),
            geometry,
        }
    }

    // A panic while holding the lock cannot leave a half-inserted tile
    // behind, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Reader<R>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Popularity rank at a coordinate. See [`Reader::rank`].
    pub fn rank(&self, lat: f64, lng: f64) -> Result<f64, TileError> {
        self.lock().rank(lat, lng)
    }

    /// Layout of the raster.
    pub fn geometry(&self) -> &RasterGeometry {
        &self.geometry
    }

    /// Tile cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.lock().cache_stats()
    }

    /// Unwrap the inner reader.
    pub fn into_inner(self) -> Reader<R> {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<R: RangeReader> From<Reader<R>> for SharedReader<R> {
    fn from(reader: Reader<R>) -> Self {
        Self::new(reader)
    }
}
