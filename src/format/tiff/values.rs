//! TIFF tag value reading.
//!
//! Values are stored either inline in the IFD entry (when they fit the
//! 4-byte field) or at an offset in the file. Arrays are fetched with a
//! single positional read, so the directory walk never has to restore a
//! cursor.

use crate::error::TiffError;
use crate::io::RangeReader;

use super::parser::{ByteOrder, IfdEntry};
use super::tags::FieldType;

// =============================================================================
// TagValue
// =============================================================================

/// Decoded value of a tag.
///
/// A count of one decodes to a scalar, any other count to an array of the
/// entry's field type.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Short(u16),
    Long(u32),
    Float(f32),
    Double(f64),
    Ascii(String),
    Shorts(Vec<u16>),
    Longs(Vec<u32>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
}

impl TagValue {
    /// Decode `count` values of `field_type` from `bytes`.
    ///
    /// `bytes` must hold at least `count * field_type.size_in_bytes()` bytes;
    /// anything beyond that (inline padding) is ignored.
    pub fn decode(
        field_type: FieldType,
        count: usize,
        bytes: &[u8],
        byte_order: ByteOrder,
    ) -> Result<Self, TiffError> {
        let size = field_type.size_in_bytes();
        let bytes = &bytes[..count * size];

        let value = match field_type {
            FieldType::Ascii => {
                let text = std::str::from_utf8(bytes).map_err(|e| TiffError::InvalidTagValue {
                    tag: "ascii",
                    message: e.to_string(),
                })?;
                TagValue::Ascii(text.trim_end_matches('\0').to_string())
            }
            FieldType::Short => {
                let mut values: Vec<u16> = bytes
                    .chunks_exact(size)
                    .map(|c| byte_order.read_u16(c))
                    .collect();
                if count == 1 {
                    TagValue::Short(values.remove(0))
                } else {
                    TagValue::Shorts(values)
                }
            }
            FieldType::Long => {
                let mut values: Vec<u32> = bytes
                    .chunks_exact(size)
                    .map(|c| byte_order.read_u32(c))
                    .collect();
                if count == 1 {
                    TagValue::Long(values.remove(0))
                } else {
                    TagValue::Longs(values)
                }
            }
            FieldType::Float => {
                let mut values: Vec<f32> = bytes
                    .chunks_exact(size)
                    .map(|c| byte_order.read_f32(c))
                    .collect();
                if count == 1 {
                    TagValue::Float(values.remove(0))
                } else {
                    TagValue::Floats(values)
                }
            }
            FieldType::Double => {
                let mut values: Vec<f64> = bytes
                    .chunks_exact(size)
                    .map(|c| byte_order.read_f64(c))
                    .collect();
                if count == 1 {
                    TagValue::Double(values.remove(0))
                } else {
                    TagValue::Doubles(values)
                }
            }
        };

        Ok(value)
    }

    /// Single unsigned integer, accepting one-element arrays.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            TagValue::Short(v) => Some(*v as u32),
            TagValue::Long(v) => Some(*v),
            TagValue::Shorts(v) if v.len() == 1 => Some(v[0] as u32),
            TagValue::Longs(v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }

    /// Unsigned integers widened to u64. A scalar becomes a one-element vector.
    pub fn to_u64_vec(&self) -> Option<Vec<u64>> {
        match self {
            TagValue::Short(v) => Some(vec![*v as u64]),
            TagValue::Long(v) => Some(vec![*v as u64]),
            TagValue::Shorts(v) => Some(v.iter().map(|&x| x as u64).collect()),
            TagValue::Longs(v) => Some(v.iter().map(|&x| x as u64).collect()),
            _ => None,
        }
    }

    /// Text value, if this is an ASCII tag.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Ascii(s) => Some(s),
            _ => None,
        }
    }

    /// Short description of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TagValue::Short(_) => "SHORT",
            TagValue::Long(_) => "LONG",
            TagValue::Float(_) => "FLOAT",
            TagValue::Double(_) => "DOUBLE",
            TagValue::Ascii(_) => "ASCII",
            TagValue::Shorts(_) => "SHORT array",
            TagValue::Longs(_) => "LONG array",
            TagValue::Floats(_) => "FLOAT array",
            TagValue::Doubles(_) => "DOUBLE array",
        }
    }
}

// =============================================================================
// ValueReader
// =============================================================================

/// Reads tag values from a TIFF file.
///
/// Combines a RangeReader with the file's byte order.
pub struct ValueReader<'a, R: RangeReader> {
    reader: &'a mut R,
    byte_order: ByteOrder,
}

impl<'a, R: RangeReader> ValueReader<'a, R> {
    /// Create a new ValueReader.
    pub fn new(reader: &'a mut R, byte_order: ByteOrder) -> Self {
        Self { reader, byte_order }
    }

    /// Get the byte order.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Decode the value of an entry.
    ///
    /// Returns `Ok(None)` for entries whose field type is not understood.
    pub fn read_value(&mut self, entry: &IfdEntry) -> Result<Option<TagValue>, TiffError> {
        let Some(field_type) = entry.field_type else {
            return Ok(None);
        };
        let count = entry.count as usize;

        let value = if entry.is_inline() {
            TagValue::decode(field_type, count, &entry.value_offset_bytes, self.byte_order)?
        } else {
            let offset = entry.value_offset(self.byte_order);
            let len = count * field_type.size_in_bytes();
            let bytes = self.reader.read_exact_at(offset, len)?;
            TagValue::decode(field_type, count, &bytes, self.byte_order)?
        };

        Ok(Some(value))
    }
}

// =============================================================================
// Tests
// =============================================================================
