//! Rank lookup integration tests.
//!
//! Tests verify:
//! - Stored floats come back exactly, in both byte orders
//! - Polar latitudes rank 0.0 without reading tiles
//! - Corrupt tiles fail without poisoning the cache
//! - The shared reader answers from several threads

use std::sync::Arc;
use std::thread;

use osmviews::{open, Reader, SharedReader, TileError};

use super::test_utils::{
    pixel_center, uniform_raster, write_temp, Endian, RasterBuilder, TrackingReader,
};

// =============================================================================
// Uniform Raster
// =============================================================================

#[test]
fn test_rank_little_endian_file() {
    let (_dir, path) = write_temp("osmviews.tiff", &uniform_raster(Endian::Little));

    let mut reader = open(&path).unwrap();
    let rank = reader.rank(47.391483, 8.488963).unwrap();

    assert_eq!(rank, 42.42f32 as f64);
    assert!((rank - 42.42).abs() < 1e-5);
    reader.close();
}

#[test]
fn test_rank_big_endian_file() {
    let (_dir, path) = write_temp("osmviews.tiff", &uniform_raster(Endian::Big));

    let mut reader = Reader::open(&path).unwrap();
    assert_eq!(reader.byte_order().as_str(), "MM");
    assert_eq!(reader.rank(47.391483, 8.488963).unwrap(), 42.42f32 as f64);
}

#[test]
fn test_rank_every_quadrant_of_uniform_raster() {
    let (reader, _) = TrackingReader::new(uniform_raster(Endian::Little), "uniform");
    let mut reader = Reader::from_reader(reader).unwrap();

    for (lat, lng) in [(45.0, -90.0), (45.0, 90.0), (-45.0, -90.0), (-45.0, 90.0)] {
        assert_eq!(reader.rank(lat, lng).unwrap(), 42.42f32 as f64);
    }
}

// =============================================================================
// Per-Pixel Values
// =============================================================================

fn marked_raster(endian: Endian) -> Vec<u8> {
    // 4x4 pixels in 2x2 tiles; zoom 2
    RasterBuilder::new(4, 2)
        .endian(endian)
        .fill(1.0)
        .pixel(3, 0, 7.5)
        .pixel(0, 3, 1234.25)
        .pixel(2, 1, 0.125)
        .build()
}

#[test]
fn test_rank_returns_exact_pixel() {
    for endian in [Endian::Little, Endian::Big] {
        let (reader, _) = TrackingReader::new(marked_raster(endian), "marked");
        let mut reader = Reader::from_reader(reader).unwrap();
        assert_eq!(reader.geometry().zoom, 2);

        let (lat, lng) = pixel_center(3, 0, 2);
        assert_eq!(reader.rank(lat, lng).unwrap(), 7.5);

        let (lat, lng) = pixel_center(0, 3, 2);
        assert_eq!(reader.rank(lat, lng).unwrap(), 1234.25);

        let (lat, lng) = pixel_center(2, 1, 2);
        assert_eq!(reader.rank(lat, lng).unwrap(), 0.125);

        let (lat, lng) = pixel_center(1, 1, 2);
        assert_eq!(reader.rank(lat, lng).unwrap(), 1.0);
    }
}

// =============================================================================
// Latitude Clipping
// =============================================================================

#[test]
fn test_polar_latitudes_rank_zero_without_reads() {
    let (reader, tracker) = TrackingReader::new(uniform_raster(Endian::Little), "uniform");
    let mut reader = Reader::from_reader(reader).unwrap();
    let reads_after_open = tracker.reads();

    assert_eq!(reader.rank(90.0, 0.0).unwrap(), 0.0);
    assert_eq!(reader.rank(-85.5, 0.0).unwrap(), 0.0);
    assert_eq!(reader.rank(85.051129, 10.0).unwrap(), 0.0);
    assert_eq!(reader.rank(-85.051129, 10.0).unwrap(), 0.0);

    assert_eq!(tracker.reads(), reads_after_open);
    let stats = reader.cache_stats();
    assert_eq!(stats.hits + stats.misses, 0);
}

#[test]
fn test_longitude_180_is_outside_raster() {
    let (reader, _) = TrackingReader::new(uniform_raster(Endian::Little), "uniform");
    let mut reader = Reader::from_reader(reader).unwrap();

    let result = reader.rank(0.0, 180.0);
    assert!(matches!(result, Err(TileError::OutsideRaster { .. })));

    let result = reader.rank(f64::NAN, 0.0);
    assert!(matches!(result, Err(TileError::OutsideRaster { .. })));
}

// =============================================================================
// Corrupt Tiles
// =============================================================================

#[test]
fn test_corrupt_tile_fails_and_is_not_cached() {
    let data = RasterBuilder::new(4, 2).fill(3.0).corrupt_tile(1).build();
    let (reader, tracker) = TrackingReader::new(data, "corrupt");
    let mut reader = Reader::from_reader(reader).unwrap();

    // Pixel (2, 0) lives in tile 1
    let (lat, lng) = pixel_center(2, 0, 2);
    assert!(matches!(
        reader.rank(lat, lng),
        Err(TileError::Decode { tile_index: 1, .. })
    ));
    assert_eq!(reader.cache_stats().len, 0);

    // Retrying reads the tile again rather than serving a cached failure
    let before = tracker.reads();
    assert!(reader.rank(lat, lng).is_err());
    assert_eq!(tracker.reads(), before + 1);

    // Other tiles are unaffected
    let (lat, lng) = pixel_center(0, 0, 2);
    assert_eq!(reader.rank(lat, lng).unwrap(), 3.0);
}

// =============================================================================
// Resource Release
// =============================================================================

#[test]
fn test_close_releases_reader() {
    let (reader, tracker) = TrackingReader::new(uniform_raster(Endian::Little), "uniform");
    let mut reader = Reader::from_reader(reader).unwrap();
    reader.rank(10.0, 10.0).unwrap();
    assert_eq!(tracker.drops(), 0);

    reader.close();
    assert_eq!(tracker.drops(), 1);
}

#[test]
fn test_drop_releases_reader() {
    let (reader, tracker) = TrackingReader::new(uniform_raster(Endian::Little), "uniform");
    {
        let _reader = Reader::from_reader(reader).unwrap();
    }
    assert_eq!(tracker.drops(), 1);
}

// =============================================================================
// Shared Reader
// =============================================================================

#[test]
fn test_shared_reader_across_threads() {
    let (reader, tracker) = TrackingReader::new(marked_raster(Endian::Little), "marked");
    let shared = Arc::new(SharedReader::new(Reader::from_reader(reader).unwrap()));
    let reads_after_open = tracker.reads();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let (lat, lng) = pixel_center(3, 0, 2);
                shared.rank(lat, lng).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 7.5);
    }

    // One read for the tile, every other lookup was a hit
    assert_eq!(tracker.reads(), reads_after_open + 1);
    let stats = shared.cache_stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 7);

    let shared = Arc::try_unwrap(shared).ok().unwrap();
    assert_eq!(shared.geometry().tile_count(), 4);
    shared.into_inner().close();
    assert_eq!(tracker.drops(), 1);
}

#[test]
fn test_shared_reader_does_not_copy_geometry() {
    let (reader, _) = TrackingReader::new(marked_raster(Endian::Little), "marked");
    let reader = Reader::from_reader(reader).unwrap();
    let layout = reader.shared_geometry();

    let shared = SharedReader::from(reader);
    assert!(std::ptr::eq(shared.geometry(), Arc::as_ptr(&layout)));

    let reader = shared.into_inner();
    assert!(std::ptr::eq(reader.geometry(), Arc::as_ptr(&layout)));
    assert_eq!(Arc::strong_count(&layout), 2);
}
