//! Format parsers for the rank raster.
//!
//! The raster is a single-image, tiled GeoTIFF produced by the popularity
//! pipeline. See [`tiff`] for the supported subset.

pub mod tiff;
