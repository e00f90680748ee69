use std::f64::consts::PI;

use crate::error::TileError;
use crate::format::tiff::RasterGeometry;

/// Latitude bound of the Web-Mercator projection, in degrees.
///
/// Points at or beyond this latitude (either hemisphere) are clipped.
pub const MAX_LATITUDE: f64 = 85.051129;

/// Where a coordinate falls in the raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLocation {
    /// Pixel column in the full raster
    pub x: u64,

    /// Pixel row in the full raster
    pub y: u64,

    /// Row-major index of the containing tile
    pub tile_index: usize,

    /// Row-major pixel offset inside the tile
    pub offset: usize,
}

/// Project `(lat, lng)` onto the raster grid.
///
/// Returns `Ok(None)` when the latitude is clipped by the projection; no
/// trigonometry is evaluated in that case. Coordinates that land outside
/// the `2^zoom` pixel grid (longitude 180, NaN) are `OutsideRaster`.
///
/// The returned tile index is not checked against the tile directory: a
/// raster shorter than it is wide yields indices past the last tile, which
/// the tile store rejects.
pub fn locate(
    lat: f64,
    lng: f64,
    geometry: &RasterGeometry,
) -> Result<Option<PixelLocation>, TileError> {
    if lat <= -MAX_LATITUDE || lat >= MAX_LATITUDE {
        return Ok(None);
    }

    let n = (1u64 << geometry.zoom) as f64;
    let x = ((lng + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - lat.to_radians().tan().asinh() / PI) / 2.0 * n).floor();

    if !(0.0..n).contains(&x) || !(0.0..n).contains(&y) {
        return Err(TileError::OutsideRaster { lat, lng });
    }

    let (x, y) = (x as u64, y as u64);
    let shift = geometry.shift;
    let mask = geometry.mask;

    let tile_index = (y >> shift) as usize * geometry.tiles_across as usize + (x >> shift) as usize;
    let offset = (y & mask) as usize * geometry.tile_width as usize + (x & mask) as usize;

    Ok(Some(PixelLocation {
        x,
        y,
        tile_index,
        offset,
    }))
}
