//! TIFF header and tag directory parsing.
//!
//! # Header Structure (8 bytes)
//! ```text
//! Bytes 0-3: Magic ("II*\0" = little-endian, "MM\0*" = big-endian)
//! Bytes 4-7: Offset to the tag directory (4 bytes, in the file's byte order)
//! ```
//!
//! # Tag Directory Structure
//! ```text
//! 2 bytes:       Entry count N
//! N * 12 bytes:  Entries (2 tag + 2 type + 4 count + 4 value/offset)
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::error::TiffError;
use crate::io::{
    read_u16_be, read_u16_le, read_u32_be, read_u32_le, read_u64_be, read_u64_le, RangeReader,
};

use super::tags::{FieldType, TiffTag};
use super::values::{TagValue, ValueReader};

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes of a little-endian TIFF ("II" for Intel, then 42)
const MAGIC_LITTLE_ENDIAN: [u8; 4] = *b"II*\0";

/// Magic bytes of a big-endian TIFF ("MM" for Motorola, then 42)
const MAGIC_BIG_ENDIAN: [u8; 4] = *b"MM\0*";

/// Size of the TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of one tag directory entry in bytes
pub const IFD_ENTRY_SIZE: usize = 12;

/// Size of the entry count at the start of a tag directory
const IFD_COUNT_SIZE: usize = 2;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF file.
///
/// Fixed for the lifetime of a reader. All multi-byte values in the file,
/// including tile pixels, are decoded respecting this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Read a u16 from a byte slice using this byte order.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => read_u16_le(bytes),
            ByteOrder::BigEndian => read_u16_be(bytes),
        }
    }

    /// Read a u32 from a byte slice using this byte order.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => read_u32_le(bytes),
            ByteOrder::BigEndian => read_u32_be(bytes),
        }
    }

    /// Read a u64 from a byte slice using this byte order.
    #[inline]
    pub fn read_u64(self, bytes: &[u8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => read_u64_le(bytes),
            ByteOrder::BigEndian => read_u64_be(bytes),
        }
    }

    /// Read an IEEE 754 single from a byte slice using this byte order.
    #[inline]
    pub fn read_f32(self, bytes: &[u8]) -> f32 {
        f32::from_bits(self.read_u32(bytes))
    }

    /// Read an IEEE 754 double from a byte slice using this byte order.
    #[inline]
    pub fn read_f64(self, bytes: &[u8]) -> f64 {
        f64::from_bits(self.read_u64(bytes))
    }

    /// Short name for display ("II" or "MM").
    pub const fn as_str(self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "II",
            ByteOrder::BigEndian => "MM",
        }
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the file
    pub byte_order: ByteOrder,

    /// Offset to the tag directory
    pub ifd_offset: u64,
}

impl TiffHeader {
    /// Parse a TIFF header from raw bytes.
    ///
    /// # Arguments
    /// * `bytes` - Raw header bytes (at least 8)
    /// * `file_size` - Total file size (used to validate the directory offset)
    ///
    /// # Errors
    /// - `FileTooSmall` if there aren't enough bytes for the header
    /// - `InvalidMagic` if the first four bytes are not `II*\0` or `MM\0*`
    /// - `InvalidIfdOffset` if the directory offset is outside the file
    pub fn parse(bytes: &[u8], file_size: u64) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        let byte_order = match magic {
            MAGIC_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            MAGIC_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidMagic(magic)),
        };

        let ifd_offset = byte_order.read_u32(&bytes[4..8]) as u64;
        if ifd_offset >= file_size {
            return Err(TiffError::InvalidIfdOffset(ifd_offset));
        }

        Ok(TiffHeader {
            byte_order,
            ifd_offset,
        })
    }

    /// Read and parse the header at the start of `reader`.
    ///
    /// Files shorter than the header are rejected as `FileTooSmall` rather
    /// than as an I/O error, since a short text file is a format problem.
    pub fn read<R: RangeReader>(reader: &mut R) -> Result<Self, TiffError> {
        let size = reader.size();
        if size < TIFF_HEADER_SIZE as u64 {
            let available = reader.read_exact_at(0, size as usize)?;
            if available.len() >= 4 {
                let magic = [available[0], available[1], available[2], available[3]];
                if magic != MAGIC_LITTLE_ENDIAN && magic != MAGIC_BIG_ENDIAN {
                    return Err(TiffError::InvalidMagic(magic));
                }
            }
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: size,
            });
        }

        let bytes = reader.read_exact_at(0, TIFF_HEADER_SIZE)?;
        Self::parse(&bytes, size)
    }
}

// =============================================================================
// IfdEntry
// =============================================================================

/// A single 12-byte tag directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfdEntry {
    /// Numeric tag ID
    pub tag_id: u16,

    /// Decoded field type, `None` if the type code is not understood
    pub field_type: Option<FieldType>,

    /// Raw field type code
    pub field_type_raw: u16,

    /// Number of values
    pub count: u32,

    /// The 4-byte value-or-offset field, undecoded
    pub value_offset_bytes: [u8; 4],
}

impl IfdEntry {
    /// Parse an entry from exactly [`IFD_ENTRY_SIZE`] bytes.
    pub fn parse(bytes: &[u8], byte_order: ByteOrder) -> Self {
        let tag_id = byte_order.read_u16(&bytes[0..2]);
        let field_type_raw = byte_order.read_u16(&bytes[2..4]);
        let count = byte_order.read_u32(&bytes[4..8]);
        let value_offset_bytes = [bytes[8], bytes[9], bytes[10], bytes[11]];

        IfdEntry {
            tag_id,
            field_type: FieldType::from_u16(field_type_raw),
            field_type_raw,
            count,
            value_offset_bytes,
        }
    }

    /// Total size of the value in bytes, `None` for unknown field types.
    pub fn value_byte_size(&self) -> Option<u64> {
        self.field_type
            .map(|t| t.size_in_bytes() as u64 * self.count as u64)
    }

    /// Whether the value is stored in the entry itself.
    pub fn is_inline(&self) -> bool {
        self.field_type
            .map(|t| t.fits_inline(self.count))
            .unwrap_or(false)
    }

    /// Interpret the value field as a file offset.
    #[inline]
    pub fn value_offset(&self, byte_order: ByteOrder) -> u64 {
        byte_order.read_u32(&self.value_offset_bytes) as u64
    }
}

// =============================================================================
// TagDirectory
// =============================================================================

/// Mapping from recognized tag to its decoded value.
///
/// Built once per open file. Unknown tags and entries with unknown field
/// types are skipped, so a required tag with an odd type simply shows up as
/// missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagDirectory {
    values: HashMap<TiffTag, TagValue>,
}

impl TagDirectory {
    /// Read the tag directory the header points at.
    pub fn read<R: RangeReader>(reader: &mut R, header: &TiffHeader) -> Result<Self, TiffError> {
        let byte_order = header.byte_order;

        let count_bytes = reader.read_exact_at(header.ifd_offset, IFD_COUNT_SIZE)?;
        let entry_count = byte_order.read_u16(&count_bytes) as usize;

        // Fetch all entries in a single read
        let entries_offset = header.ifd_offset + IFD_COUNT_SIZE as u64;
        let entries = reader.read_exact_at(entries_offset, entry_count * IFD_ENTRY_SIZE)?;

        let mut values = HashMap::new();
        let mut value_reader = ValueReader::new(reader, byte_order);

        for raw in entries.chunks_exact(IFD_ENTRY_SIZE) {
            let entry = IfdEntry::parse(raw, byte_order);

            let Some(tag) = TiffTag::from_u16(entry.tag_id) else {
                continue;
            };

            match value_reader.read_value(&entry)? {
                Some(value) => {
                    values.insert(tag, value);
                }
                None => {
                    debug!(
                        tag = tag.name(),
                        field_type = entry.field_type_raw,
                        "Skipping tag with unsupported field type"
                    );
                }
            }
        }

        debug!(
            entries = entry_count,
            recognized = values.len(),
            offset = header.ifd_offset,
            "Parsed tag directory"
        );

        Ok(TagDirectory { values })
    }

    /// Build a directory from already-decoded values.
    pub fn from_values(values: impl IntoIterator<Item = (TiffTag, TagValue)>) -> Self {
        TagDirectory {
            values: values.into_iter().collect(),
        }
    }

    /// Get the value of a tag, if present.
    pub fn get(&self, tag: TiffTag) -> Option<&TagValue> {
        self.values.get(&tag)
    }

    /// Number of recognized tags.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no recognized tag was found.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, tag: TiffTag) -> Result<&TagValue, TiffError> {
        self.get(tag).ok_or(TiffError::MissingTag(tag.name()))
    }

    fn require_u32(&self, tag: TiffTag) -> Result<u32, TiffError> {
        let value = self.require(tag)?;
        value.as_u32().ok_or_else(|| TiffError::InvalidTagValue {
            tag: tag.name(),
            message: format!("expected a single integer, got {}", value.kind()),
        })
    }

    fn require_u64_array(&self, tag: TiffTag) -> Result<Vec<u64>, TiffError> {
        let value = self.require(tag)?;
        value.to_u64_vec().ok_or_else(|| TiffError::InvalidTagValue {
            tag: tag.name(),
            message: format!("expected integers, got {}", value.kind()),
        })
    }

    /// ImageWidth in pixels.
    pub fn image_width(&self) -> Result<u32, TiffError> {
        self.require_u32(TiffTag::ImageWidth)
    }

    /// ImageLength in pixels.
    pub fn image_length(&self) -> Result<u32, TiffError> {
        self.require_u32(TiffTag::ImageLength)
    }

    /// TileWidth in pixels.
    pub fn tile_width(&self) -> Result<u32, TiffError> {
        self.require_u32(TiffTag::TileWidth)
    }

    /// TileLength in pixels.
    pub fn tile_length(&self) -> Result<u32, TiffError> {
        self.require_u32(TiffTag::TileLength)
    }

    /// File offset of each tile, row-major.
    pub fn tile_offsets(&self) -> Result<Vec<u64>, TiffError> {
        self.require_u64_array(TiffTag::TileOffsets)
    }

    /// Compressed size of each tile, index-aligned with the offsets.
    pub fn tile_byte_counts(&self) -> Result<Vec<u64>, TiffError> {
        self.require_u64_array(TiffTag::TileByteCounts)
    }
}

// =============================================================================
// Tests
// =============================================================================
