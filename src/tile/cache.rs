//! Tile cache for decoded tiles.
//!
//! This module provides an LRU cache keyed by tile index, preventing repeated
//! read/inflate cycles for tiles that are queried again.
//!
//! # Count-Based Eviction
//!
//! The cache holds at most `capacity` distinct tiles. Inserting a new tile
//! into a full cache evicts the least-recently-used one. Both hits and
//! insertions refresh recency.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde::Serialize;

use super::decoder::Tile;

/// Default cache capacity: 512 tiles
pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 512;

// =============================================================================
// Cache Statistics
// =============================================================================

/// Counters describing cache behavior since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,

    /// Lookups that found nothing
    pub misses: u64,

    /// Tiles dropped to make room
    pub evictions: u64,

    /// Tiles currently cached
    pub len: usize,

    /// Maximum number of tiles
    pub capacity: usize,
}

// =============================================================================
// Tile Cache
// =============================================================================

/// LRU cache for decoded tiles with count-based capacity.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use osmviews::tile::{Tile, TileCache};
///
/// let mut cache = TileCache::with_capacity(2);
/// cache.put(0, Arc::new(Tile::new(0, vec![1.0])));
/// cache.put(1, Arc::new(Tile::new(1, vec![2.0])));
///
/// // Touch tile 0 so tile 1 becomes least recently used
/// assert!(cache.get(0).is_some());
/// cache.put(2, Arc::new(Tile::new(2, vec![3.0])));
///
/// assert!(cache.contains(0));
/// assert!(!cache.contains(1));
/// ```
pub struct TileCache {
    entries: LruCache<usize, Arc<Tile>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl TileCache {
    /// Create a new tile cache with default capacity (512 tiles).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TILE_CACHE_CAPACITY)
    }

    /// Create a new tile cache holding at most `capacity` tiles.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Get a tile from the cache.
    ///
    /// Marks the entry as recently used and updates the hit/miss counters.
    pub fn get(&mut self, tile_index: usize) -> Option<Arc<Tile>> {
        match self.entries.get(&tile_index) {
            Some(tile) => {
                self.hits += 1;
                Some(Arc::clone(tile))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Check if a tile is cached without updating LRU order or counters.
    pub fn contains(&self, tile_index: usize) -> bool {
        self.entries.contains(&tile_index)
    }

    /// Store a tile, marking it as most recently used.
    ///
    /// Returns the index of the tile evicted to make room, if any.
    pub fn put(&mut self, tile_index: usize, tile: Arc<Tile>) -> Option<usize> {
        match self.entries.push(tile_index, tile) {
            Some((evicted, _)) if evicted != tile_index => {
                self.evictions += 1;
                Some(evicted)
            }
            _ => None,
        }
    }

    /// Remove all entries. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get the current number of cached tiles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the maximum number of tiles.
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            len: self.len(),
            capacity: self.capacity(),
        }
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
