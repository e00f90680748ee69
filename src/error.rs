use std::path::PathBuf;

use thiserror::Error;

/// I/O errors that can occur when reading the raster file
#[derive(Debug, Error)]
pub enum IoError {
    /// The raster file could not be opened
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Seeking or reading failed
    #[error("Read of {len} bytes at offset {offset} failed: {source}")]
    Read {
        offset: u64,
        len: usize,
        #[source]
        source: std::io::Error,
    },

    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },
}

/// Errors that can occur when parsing the TIFF structure
#[derive(Debug, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// First four bytes are neither `II*\0` nor `MM\0*`
    #[error("Invalid TIFF magic bytes: {0:02X?}")]
    InvalidMagic([u8; 4]),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Tag directory offset points outside the file
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// Required tag is missing from the tag directory
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    /// Dimension that must be a power of two for shift/mask addressing
    #[error("{tag} must be a power of two, got {value}")]
    NotPowerOfTwo { tag: &'static str, value: u32 },
}

/// Errors returned when opening a raster
#[derive(Debug, Error)]
pub enum FormatError {
    /// Filesystem failure while opening or parsing
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// The file is not a raster this reader understands
    #[error("Unrecognized file format: {}: {source}", path.display())]
    Unrecognized {
        path: PathBuf,
        #[source]
        source: TiffError,
    },
}

impl FormatError {
    /// Attach the offending path to a parse error.
    ///
    /// I/O failures stay I/O failures; everything else becomes `Unrecognized`.
    pub fn from_tiff(path: impl Into<PathBuf>, err: TiffError) -> Self {
        match err {
            TiffError::Io(io) => FormatError::Io(io),
            other => FormatError::Unrecognized {
                path: path.into(),
                source: other,
            },
        }
    }
}

/// Errors that can occur when answering a rank query
#[derive(Debug, Error)]
pub enum TileError {
    /// I/O error while reading tile data
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// The zlib stream of a tile is corrupt or truncated
    #[error("Cannot decompress tile {tile_index}: {source}")]
    Decode {
        tile_index: usize,
        #[source]
        source: std::io::Error,
    },

    /// Decompressed payload does not hold one float per tile pixel
    #[error("Tile {tile_index} decoded to {actual} bytes, expected {expected}")]
    SizeMismatch {
        tile_index: usize,
        expected: usize,
        actual: usize,
    },

    /// Tile index outside the tile directory
    #[error("Tile index {index} out of range (raster has {count} tiles)")]
    TileOutOfRange { index: usize, count: usize },

    /// Coordinate projects outside the raster's pixel grid
    #[error("Coordinate ({lat}, {lng}) lies outside the raster")]
    OutsideRaster { lat: f64, lng: f64 },
}

/// Errors from refreshing the local raster copy
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a status other than 200 or 304
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// Writing the downloaded file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sidecar metadata could not be serialized
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}
