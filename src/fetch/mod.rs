//! Keeping the local raster copy fresh.
//!
//! The published raster is refreshed periodically. [`download`] performs a
//! conditional GET using the `ETag` / `Last-Modified` values remembered in a
//! JSON sidecar next to the raster, so an unchanged raster is never
//! transferred twice. The reader itself knows nothing about any of this; it
//! only consumes the resulting local path.

mod download;
mod metadata;

pub use download::{download, download_from, download_with_client, FetchOutcome, DEFAULT_URL};
pub use metadata::{metadata_path, FetchMetadata};
