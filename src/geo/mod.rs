//! Geographic coordinate handling.
//!
//! Maps latitude/longitude onto the raster's pixel grid with the spherical
//! Web-Mercator projection used by standard map tiling schemes.

mod mercator;

pub use mercator::{locate, PixelLocation, MAX_LATITUDE};
