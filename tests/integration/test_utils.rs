//! Test utilities for integration tests.
//!
//! Builders for synthetic rank rasters in either byte order, plus a range
//! reader spy that counts reads and drops.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tempfile::TempDir;

use osmviews::error::IoError;
use osmviews::io::RangeReader;

// =============================================================================
// Tracking Range Reader
// =============================================================================

/// Shared counters of a [`TrackingReader`], readable after the reader moved.
#[derive(Clone, Default)]
pub struct Tracker {
    reads: Arc<AtomicUsize>,
    drops: Arc<AtomicUsize>,
    requests: Arc<std::sync::Mutex<Vec<(u64, usize)>>>,
}

impl Tracker {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }

    /// Number of reads at `offset`.
    pub fn reads_at(&self, offset: u64) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(o, _)| *o == offset)
            .count()
    }
}

/// An in-memory range reader that records every read and its own drop.
pub struct TrackingReader {
    data: Bytes,
    identifier: String,
    tracker: Tracker,
}

impl TrackingReader {
    pub fn new(data: Vec<u8>, identifier: impl Into<String>) -> (Self, Tracker) {
        let tracker = Tracker::default();
        let reader = Self {
            data: Bytes::from(data),
            identifier: identifier.into(),
            tracker: tracker.clone(),
        };
        (reader, tracker)
    }
}

impl RangeReader for TrackingReader {
    fn read_exact_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.tracker.reads.fetch_add(1, Ordering::SeqCst);
        self.tracker.requests.lock().unwrap().push((offset, len));

        let start = offset as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size: self.data.len() as u64,
            });
        }
        Ok(self.data.slice(start..end))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl Drop for TrackingReader {
    fn drop(&mut self) {
        self.tracker.drops.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Raster Builder
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    fn u16(self, v: u16) -> [u8; 2] {
        match self {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        }
    }

    fn u32(self, v: u32) -> [u8; 4] {
        match self {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        }
    }

    fn f32(self, v: f32) -> [u8; 4] {
        match self {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        }
    }
}

// Field types
const SHORT: u16 = 3;
const LONG: u16 = 4;

/// One raw tag directory entry.
#[derive(Debug, Clone)]
struct Entry {
    tag: u16,
    field_type: u16,
    count: u32,
    /// Values that do not fit inline get written after the directory
    payload: Vec<u8>,
}

/// Builder for synthetic rank rasters.
///
/// Produces a square, tiled, zlib-compressed float raster with a single tag
/// directory. Every pixel holds `fill` unless overridden with
/// [`RasterBuilder::pixel`].
pub struct RasterBuilder {
    endian: Endian,
    image_width: u32,
    tile_size: u32,
    fill: f32,
    pixels: HashMap<(u32, u32), f32>,
    omitted: Vec<u16>,
    extra: Vec<Entry>,
    corrupt_tiles: Vec<usize>,
}

impl RasterBuilder {
    pub fn new(image_width: u32, tile_size: u32) -> Self {
        Self {
            endian: Endian::Little,
            image_width,
            tile_size,
            fill: 0.0,
            pixels: HashMap::new(),
            omitted: Vec::new(),
            extra: Vec::new(),
            corrupt_tiles: Vec::new(),
        }
    }

    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn fill(mut self, value: f32) -> Self {
        self.fill = value;
        self
    }

    /// Set a single pixel, addressed in whole-raster coordinates.
    pub fn pixel(mut self, x: u32, y: u32, value: f32) -> Self {
        self.pixels.insert((x, y), value);
        self
    }

    /// Leave a required tag out of the directory.
    pub fn without_tag(mut self, tag: u16) -> Self {
        self.omitted.push(tag);
        self
    }

    /// Add an inline entry with an arbitrary field type.
    pub fn with_raw_entry(mut self, tag: u16, field_type: u16, count: u32, value: u32) -> Self {
        let payload = self.endian.u32(value).to_vec();
        self.extra.push(Entry {
            tag,
            field_type,
            count,
            payload,
        });
        self
    }

    /// Replace a tile's compressed bytes with garbage of the same length.
    pub fn corrupt_tile(mut self, index: usize) -> Self {
        self.corrupt_tiles.push(index);
        self
    }

    pub fn tiles_across(&self) -> u32 {
        self.image_width.div_ceil(self.tile_size)
    }

    pub fn tile_count(&self) -> usize {
        let across = self.tiles_across() as usize;
        across * across
    }

    fn tile_bytes(&self, index: usize) -> Vec<u8> {
        let across = self.tiles_across() as usize;
        let (tx, ty) = ((index % across) as u32, (index / across) as u32);

        let mut raw = Vec::with_capacity((self.tile_size * self.tile_size * 4) as usize);
        for row in 0..self.tile_size {
            for col in 0..self.tile_size {
                let x = tx * self.tile_size + col;
                let y = ty * self.tile_size + row;
                let value = self.pixels.get(&(x, y)).copied().unwrap_or(self.fill);
                raw.extend_from_slice(&self.endian.f32(value));
            }
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).unwrap();
        let compressed = encoder.finish().unwrap();

        if self.corrupt_tiles.contains(&index) {
            vec![0xAB; compressed.len()]
        } else {
            compressed
        }
    }

    fn long_entry(&self, tag: u16, values: &[u32]) -> Entry {
        let mut payload = Vec::with_capacity(values.len() * 4);
        for v in values {
            payload.extend_from_slice(&self.endian.u32(*v));
        }
        Entry {
            tag,
            field_type: LONG,
            count: values.len() as u32,
            payload,
        }
    }

    fn short_entry(&self, tag: u16, value: u16) -> Entry {
        let mut payload = self.endian.u16(value).to_vec();
        payload.extend_from_slice(&[0, 0]);
        Entry {
            tag,
            field_type: SHORT,
            count: 1,
            payload,
        }
    }

    /// Serialize the raster.
    pub fn build(&self) -> Vec<u8> {
        let tiles: Vec<Vec<u8>> = (0..self.tile_count()).map(|i| self.tile_bytes(i)).collect();

        let mut entries = vec![
            self.long_entry(256, &[self.image_width]),
            self.long_entry(257, &[self.image_width]),
            // TileWidth as SHORT, TileLength as LONG: both are legal
            self.short_entry(322, self.tile_size as u16),
            self.long_entry(323, &[self.tile_size]),
            // Offsets are patched once the layout is known
            self.long_entry(324, &vec![0; tiles.len()]),
            self.long_entry(
                325,
                &tiles.iter().map(|t| t.len() as u32).collect::<Vec<_>>(),
            ),
        ];
        entries.extend(self.extra.iter().cloned());
        entries.retain(|e| !self.omitted.contains(&e.tag));
        entries.sort_by_key(|e| e.tag);

        let directory_size = 2 + entries.len() * 12 + 4;
        let overflow_start = 8 + directory_size;
        let overflow_size: usize = entries
            .iter()
            .filter(|e| e.payload.len() > 4)
            .map(|e| e.payload.len())
            .sum();

        // Tile data follows the overflow area
        let mut offset = (overflow_start + overflow_size) as u32;
        let mut offsets = Vec::with_capacity(tiles.len());
        for tile in &tiles {
            offsets.push(offset);
            offset += tile.len() as u32;
        }
        if let Some(entry) = entries.iter_mut().find(|e| e.tag == 324) {
            let patched = self.long_entry(324, &offsets);
            entry.payload = patched.payload;
        }

        let mut out = Vec::new();
        match self.endian {
            Endian::Little => out.extend_from_slice(b"II*\0"),
            Endian::Big => out.extend_from_slice(b"MM\0*"),
        }
        out.extend_from_slice(&self.endian.u32(8));

        out.extend_from_slice(&self.endian.u16(entries.len() as u16));
        let mut overflow = Vec::new();
        for entry in &entries {
            out.extend_from_slice(&self.endian.u16(entry.tag));
            out.extend_from_slice(&self.endian.u16(entry.field_type));
            out.extend_from_slice(&self.endian.u32(entry.count));
            if entry.payload.len() > 4 {
                let at = (overflow_start + overflow.len()) as u32;
                out.extend_from_slice(&self.endian.u32(at));
                overflow.extend_from_slice(&entry.payload);
            } else {
                let mut inline = [0u8; 4];
                inline[..entry.payload.len()].copy_from_slice(&entry.payload);
                out.extend_from_slice(&inline);
            }
        }
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.extend_from_slice(&overflow);

        for tile in &tiles {
            out.extend_from_slice(tile);
        }
        out
    }
}

// =============================================================================
// Files on Disk
// =============================================================================

/// Write `data` to `name` inside a fresh temporary directory.
///
/// The directory is removed when the returned guard is dropped.
pub fn write_temp(name: &str, data: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, data).unwrap();
    (dir, path)
}

/// The 2×2 raster with a single tile holding 42.42 everywhere.
pub fn uniform_raster(endian: Endian) -> Vec<u8> {
    RasterBuilder::new(2, 2).endian(endian).fill(42.42).build()
}

// =============================================================================
// Coordinates
// =============================================================================

/// Latitude/longitude of the centre of pixel `(x, y)` at `zoom`.
pub fn pixel_center(x: u64, y: u64, zoom: u32) -> (f64, f64) {
    let n = (1u64 << zoom) as f64;
    let lng = (x as f64 + 0.5) / n * 360.0 - 180.0;
    let merc = std::f64::consts::PI * (1.0 - 2.0 * (y as f64 + 0.5) / n);
    let lat = merc.sinh().atan().to_degrees();
    (lat, lng)
}
