//! Raster geometry derived from the tag directory.
//!
//! Tile addressing uses shifts and masks instead of division, so the image
//! width and the (square) tile size must be powers of two. This is checked
//! once at open time; a raster that fails the check is rejected instead of
//! being silently misaddressed.

use serde::Serialize;

use crate::error::TiffError;

use super::parser::TagDirectory;

/// Immutable layout parameters of a tiled raster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RasterGeometry {
    /// Image width in pixels
    pub image_width: u32,

    /// Image height in pixels
    pub image_length: u32,

    /// Tile width in pixels
    pub tile_width: u32,

    /// Tile height in pixels
    pub tile_length: u32,

    /// Number of tiles in X direction
    pub tiles_across: u32,

    /// Number of tiles in Y direction
    pub tiles_down: u32,

    /// Web-Mercator zoom level: the projection grid is `2^zoom` pixels wide
    pub zoom: u32,

    /// log2 of the tile width
    pub shift: u32,

    /// `2^shift - 1`, selects the in-tile pixel coordinate
    pub mask: u64,

    /// File offset of each tile, row-major
    #[serde(skip)]
    pub tile_offsets: Vec<u64>,

    /// Compressed size of each tile, index-aligned with `tile_offsets`
    #[serde(skip)]
    pub tile_byte_counts: Vec<u64>,
}

/// Number of bits needed to represent `value`.
#[inline]
fn bit_length(value: u32) -> u32 {
    u32::BITS - value.leading_zeros()
}

fn require_power_of_two(tag: &'static str, value: u32) -> Result<(), TiffError> {
    if value.is_power_of_two() {
        Ok(())
    } else {
        Err(TiffError::NotPowerOfTwo { tag, value })
    }
}

/// Size in bytes of one inflated tile, if it fits in memory addressing.
fn decoded_tile_bytes(tile_width: u32, tile_length: u32) -> Option<usize> {
    (tile_width as usize)
        .checked_mul(tile_length as usize)?
        .checked_mul(std::mem::size_of::<f32>())
}

impl RasterGeometry {
    /// Derive the geometry from a parsed tag directory.
    ///
    /// # Errors
    /// - `MissingTag` if any of the six tile-layout tags is absent
    /// - `NotPowerOfTwo` if the image width or a tile dimension is not a power of two
    /// - `InvalidTagValue` for non-square tiles, tiles wider than the image,
    ///   or tile arrays of the wrong length
    pub fn from_directory(dir: &TagDirectory) -> Result<Self, TiffError> {
        let image_width = dir.image_width()?;
        let image_length = dir.image_length()?;
        let tile_width = dir.tile_width()?;
        let tile_length = dir.tile_length()?;
        let tile_offsets = dir.tile_offsets()?;
        let tile_byte_counts = dir.tile_byte_counts()?;

        require_power_of_two("ImageWidth", image_width)?;
        require_power_of_two("TileWidth", tile_width)?;
        require_power_of_two("TileLength", tile_length)?;

        if tile_width != tile_length {
            return Err(TiffError::InvalidTagValue {
                tag: "TileLength",
                message: format!(
                    "tiles must be square, got {}x{}",
                    tile_width, tile_length
                ),
            });
        }

        if tile_width > image_width {
            return Err(TiffError::InvalidTagValue {
                tag: "TileWidth",
                message: format!(
                    "tile width {} exceeds image width {}",
                    tile_width, image_width
                ),
            });
        }
        if decoded_tile_bytes(tile_width, tile_length).is_none() {
            return Err(TiffError::InvalidTagValue {
                tag: "TileWidth",
                message: format!(
                    "a {}x{} float tile is not addressable",
                    tile_width, tile_length
                ),
            });
        }

        let tiles_across = image_width.div_ceil(tile_width);
        let tiles_down = image_length.div_ceil(tile_length);
        let tile_count = tiles_across as usize * tiles_down as usize;

        if tile_offsets.len() != tile_count {
            return Err(TiffError::InvalidTagValue {
                tag: "TileOffsets",
                message: format!("expected {} entries, got {}", tile_count, tile_offsets.len()),
            });
        }
        if tile_byte_counts.len() != tile_count {
            return Err(TiffError::InvalidTagValue {
                tag: "TileByteCounts",
                message: format!(
                    "expected {} entries, got {}",
                    tile_count,
                    tile_byte_counts.len()
                ),
            });
        }

        // Ceiling log2; exact since both are powers of two
        let zoom = bit_length(image_width - 1);
        let shift = bit_length(tile_width - 1);
        let mask = (1u64 << shift) - 1;

        Ok(RasterGeometry {
            image_width,
            image_length,
            tile_width,
            tile_length,
            tiles_across,
            tiles_down,
            zoom,
            shift,
            mask,
            tile_offsets,
            tile_byte_counts,
        })
    }

    /// Total number of tiles.
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tile_offsets.len()
    }

    /// Number of pixels in one tile.
    ///
    /// Cannot overflow: `from_directory` rejects tiles whose decoded size
    /// does not fit in a `usize`.
    #[inline]
    pub fn pixels_per_tile(&self) -> usize {
        self.tile_width as usize * self.tile_length as usize
    }

    /// Get the tile index for a given tile coordinate.
    ///
    /// Returns None if the coordinates are out of bounds.
    pub fn tile_index(&self, tile_x: u32, tile_y: u32) -> Option<usize> {
        if tile_x >= self.tiles_across || tile_y >= self.tiles_down {
            return None;
        }
        Some(tile_y as usize * self.tiles_across as usize + tile_x as usize)
    }
}

// =============================================================================
// Tests
// =============================================================================
