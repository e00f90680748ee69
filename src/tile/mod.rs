//! Tile decoding and caching.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Reader::rank               │
//! └────────────────────┬────────────────────┘
//!                      │ tile index
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               TileStore                 │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  TileCache   │  │  decode_tile    │  │
//! │  │  (LRU, 512   │  │  (inflate →     │  │
//! │  │   tiles)     │  │   f32 pixels)   │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │ offset, length
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              RangeReader                │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileStore`]: Serves decoded tiles, reading and inflating on a miss
//! - [`TileCache`]: LRU cache keyed by tile index with count-based eviction
//! - [`Tile`]: Row-major float pixels of one tile
//! - [`decode_tile`]: zlib inflate plus byte-order aware float conversion

mod cache;
mod decoder;
mod store;

pub use cache::{CacheStats, TileCache, DEFAULT_TILE_CACHE_CAPACITY};
pub use decoder::{decode_tile, Tile};
pub use store::TileStore;
