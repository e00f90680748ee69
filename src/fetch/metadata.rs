use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::FetchError;

/// Validators of the last successful download.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchMetadata {
    /// Entity tag sent back as `If-None-Match`
    #[serde(rename = "ETag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Timestamp sent back as `If-Modified-Since`
    #[serde(
        rename = "Last-Modified",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<String>,
}

impl FetchMetadata {
    /// Load the sidecar at `path`.
    ///
    /// A missing, unreadable or malformed sidecar yields empty metadata,
    /// which simply makes the next download unconditional.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str(&text) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring malformed download metadata");
                Self::default()
            }
        }
    }

    /// Write the sidecar to `path`.
    pub fn save(&self, path: &Path) -> Result<(), FetchError> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Whether there is anything to make a request conditional on.
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

/// Sidecar path for a raster: `osmviews.tiff` → `osmviews.json`.
///
/// A `.tif`/`.tiff` extension is replaced; any other name gets `.json`
/// appended.
pub fn metadata_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tif") | Some("tiff") => path.with_extension("json"),
        _ => {
            let mut name = OsString::from(path.as_os_str());
            name.push(".json");
            PathBuf::from(name)
        }
    }
}
