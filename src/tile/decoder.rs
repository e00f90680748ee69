//! Tile payload decoding.
//!
//! Each tile is a zlib stream that inflates to `tile_width * tile_length`
//! 32-bit floats in the file's byte order, row-major.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::TileError;
use crate::format::tiff::ByteOrder;

/// Size of a pixel sample in bytes.
const SAMPLE_SIZE: usize = std::mem::size_of::<f32>();

/// A decoded tile: row-major float pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    index: usize,
    pixels: Vec<f32>,
}

impl Tile {
    /// Wrap already-decoded pixels.
    pub fn new(index: usize, pixels: Vec<f32>) -> Self {
        Self { index, pixels }
    }

    /// Row-major tile index in the raster's tile grid.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Pixel at a row-major in-tile offset.
    pub fn get(&self, offset: usize) -> Option<f32> {
        self.pixels.get(offset).copied()
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the tile holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// Inflate a compressed tile and reinterpret it as floats.
///
/// # Errors
/// - `Decode` if the zlib stream is corrupt or truncated
/// - `SizeMismatch` if it does not inflate to exactly `pixel_count` floats
pub fn decode_tile(
    tile_index: usize,
    compressed: &[u8],
    byte_order: ByteOrder,
    pixel_count: usize,
) -> Result<Tile, TileError> {
    let expected = pixel_count
        .checked_mul(SAMPLE_SIZE)
        .ok_or(TileError::SizeMismatch {
            tile_index,
            expected: usize::MAX,
            actual: 0,
        })?;

    // Read at most one byte more than expected, enough to detect oversized
    // tiles. The preallocation follows the input, not the declared size.
    let mut raw = Vec::with_capacity(expected.min(compressed.len().saturating_mul(4)));
    ZlibDecoder::new(compressed)
        .take((expected as u64).saturating_add(1))
        .read_to_end(&mut raw)
        .map_err(|source| TileError::Decode { tile_index, source })?;

    if raw.len() != expected {
        return Err(TileError::SizeMismatch {
            tile_index,
            expected,
            actual: raw.len(),
        });
    }

    let pixels = raw
        .chunks_exact(SAMPLE_SIZE)
        .map(|c| byte_order.read_f32(c))
        .collect();

    Ok(Tile::new(tile_index, pixels))
}
