//! TIFF parser for the rank raster.
//!
//! This module understands exactly the subset of TIFF needed to locate
//! tiled, deflate-compressed, 32-bit float pixel data.
//!
//! # Key Concepts
//!
//! - **Byte order**: The magic (`II*\0` or `MM\0*`) declares the endianness.
//!   All multi-byte values, tile pixels included, are read respecting it.
//!
//! - **Tag directory (IFD)**: Typed (tag, value) entries describing the image
//!   layout. Only the first directory is read; unknown tags are skipped.
//!
//! - **Inline vs offset values**: Values of at most four bytes are stored in
//!   the entry itself, larger values at an offset pointed to by the entry.
//!
//! - **Geometry**: Tile grid, zoom level and shift/mask constants derived
//!   once from the directory.

mod geometry;
mod parser;
mod tags;
mod values;

pub use geometry::RasterGeometry;
pub use parser::{ByteOrder, IfdEntry, TagDirectory, TiffHeader, IFD_ENTRY_SIZE, TIFF_HEADER_SIZE};
pub use tags::{FieldType, TiffTag};
pub use values::{TagValue, ValueReader};
