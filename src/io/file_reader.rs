use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use bytes::{Bytes, BytesMut};

use super::range_reader::{check_range, RangeReader};
use crate::error::IoError;

/// Range reader over a local file.
///
/// Owns the file handle exclusively; dropping the reader closes the file.
pub struct FileRangeReader {
    file: File,
    size: u64,
    identifier: String,
}

impl FileRangeReader {
    /// Open `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let open_err = |source| IoError::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(open_err)?;
        let size = file.metadata().map_err(open_err)?.len();

        Ok(Self {
            file,
            size,
            identifier: path.display().to_string(),
        })
    }
}

impl RangeReader for FileRangeReader {
    fn read_exact_at(&mut self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        check_range(offset, len, self.size)?;

        let read_err = |source| IoError::Read {
            offset,
            len,
            source,
        };

        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(read_err)?;

        let mut buf = BytesMut::zeroed(len);
        self.file.read_exact(&mut buf).map_err(read_err)?;
        Ok(buf.freeze())
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl std::fmt::Debug for FileRangeReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRangeReader")
            .field("identifier", &self.identifier)
            .field("size", &self.size)
            .finish()
    }
}
