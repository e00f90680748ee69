use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use reqwest::StatusCode;
use tracing::{debug, info};

use super::metadata::{metadata_path, FetchMetadata};
use crate::error::FetchError;

/// Where the published raster lives.
pub const DEFAULT_URL: &str = "https://osmviews.toolforge.org/download/osmviews.tiff";

/// Buffer size for streaming the response body to disk (512 KiB).
const COPY_BUFFER_SIZE: usize = 512 * 1024;

/// Result of a download attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server answered 304; the local copy is current and untouched
    NotModified,

    /// A fresh copy replaced the local file
    Downloaded { bytes: u64 },
}

/// Refresh `path` from [`DEFAULT_URL`].
pub fn download(path: impl AsRef<Path>) -> Result<FetchOutcome, FetchError> {
    download_from(path, DEFAULT_URL)
}

/// Refresh `path` from `url`.
pub fn download_from(path: impl AsRef<Path>, url: &str) -> Result<FetchOutcome, FetchError> {
    let client = Client::builder()
        .user_agent(concat!("osmviews/", env!("CARGO_PKG_VERSION")))
        .build()?;
    download_with_client(&client, path.as_ref(), url)
}

/// Refresh `path` from `url` using an existing HTTP client.
///
/// The body is written to `<path>.tmp` and renamed over `path` only once
/// complete, so readers never see a partial raster.
pub fn download_with_client(
    client: &Client,
    path: &Path,
    url: &str,
) -> Result<FetchOutcome, FetchError> {
    let sidecar = metadata_path(path);

    // Validators only make sense if the file they describe is still there
    let known = if path.exists() {
        FetchMetadata::load(&sidecar)
    } else {
        FetchMetadata::default()
    };

    let mut request = client.get(url);
    if let Some(etag) = &known.etag {
        request = request.header(IF_NONE_MATCH, etag.as_str());
    }
    if let Some(last_modified) = &known.last_modified {
        request = request.header(IF_MODIFIED_SINCE, last_modified.as_str());
    }

    debug!(url, conditional = !known.is_empty(), "Requesting raster");
    let mut response = request.send()?;

    let status = response.status();
    if status == StatusCode::NOT_MODIFIED {
        info!(path = %path.display(), "Raster is up to date");
        return Ok(FetchOutcome::NotModified);
    }
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let fresh = FetchMetadata {
        etag: header_string(response.headers(), ETAG.as_str()),
        last_modified: header_string(response.headers(), LAST_MODIFIED.as_str()),
    };

    let tmp_path = tmp_path(path);
    let bytes = match write_body(&mut response, &tmp_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
    };

    fs::rename(&tmp_path, path)?;
    fresh.save(&sidecar)?;

    info!(path = %path.display(), bytes, "Downloaded raster");
    Ok(FetchOutcome::Downloaded { bytes })
}

fn write_body(body: &mut impl std::io::Read, tmp_path: &Path) -> std::io::Result<u64> {
    let file = File::create(tmp_path)?;
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, file);
    let bytes = std::io::copy(body, &mut writer)?;
    writer.flush()?;
    Ok(bytes)
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
