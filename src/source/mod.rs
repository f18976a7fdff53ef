//! Byte range sources for G3D files.
//!
//! The reader only ever needs `read(offset, length)`, so any storage that can
//! serve byte ranges can back it. A read past the end of the data is not an
//! error: it returns `Ok(None)` and the reader treats it as "no data".
//! Transport failures are errors and are never turned into `None`.
//!
//! # Implementations
//!
//! - [`MemorySource`] - in-memory blob
//! - [`HttpSource`] - HTTP/HTTPS server with Range request support
//!
//! # Example
//!
//! ```no_run
//! use g3dr::source::{ByteRangeSource, MemorySource};
//!
//! # async fn demo() -> g3dr::Result<()> {
//! let source = MemorySource::new(vec![0u8; 4096]);
//! let header = source.read(0, 1024).await?;
//! assert_eq!(header.map(|b| b.len()), Some(1024));
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "http")]
mod http;
mod memory;

#[cfg(feature = "http")]
pub use http::HttpSource;
pub use memory::MemorySource;

use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Random access to a byte range of a file
#[async_trait]
pub trait ByteRangeSource: Send + Sync {
    /// Read up to `length` bytes starting at `offset`.
    ///
    /// Returns `Ok(None)` when nothing is available at `offset`, and a shorter
    /// buffer when the source ends inside the range.
    async fn read(&self, offset: u64, length: u64) -> Result<Option<Bytes>>;
}

/// Where a G3D file lives
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Whole file held in memory
    Blob(Bytes),
    /// HTTP or HTTPS URL of a server honouring Range requests
    Url(String),
}

impl FileSource {
    /// Resolve a command-line style location.
    ///
    /// `http://` and `https://` locations become [`FileSource::Url`]; an
    /// existing local file is loaded into a [`FileSource::Blob`].
    pub async fn from_location(location: &str) -> Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            return Ok(FileSource::Url(location.to_string()));
        }

        let path = Path::new(location);
        if !path.is_file() {
            return Err(Error::Configuration(format!(
                "{} is neither an http(s) URL nor a readable file",
                location
            )));
        }
        let data = tokio::fs::read(path).await?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "loaded local file");
        Ok(FileSource::Blob(Bytes::from(data)))
    }

    /// Check the source and build the matching byte range reader.
    pub fn open(&self, timeout: Option<Duration>) -> Result<Arc<dyn ByteRangeSource>> {
        match self {
            FileSource::Blob(data) => Ok(Arc::new(MemorySource::new(data.clone()))),
            FileSource::Url(raw) => {
                let parsed = url::Url::parse(raw)
                    .map_err(|e| Error::Configuration(format!("invalid URL {}: {}", raw, e)))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(Error::Configuration(format!(
                        "unsupported URL scheme {} (expected http or https)",
                        parsed.scheme()
                    )));
                }
                open_url(parsed.as_str(), timeout)
            }
        }
    }
}

#[cfg(feature = "http")]
fn open_url(url: &str, timeout: Option<Duration>) -> Result<Arc<dyn ByteRangeSource>> {
    Ok(Arc::new(HttpSource::new(url, timeout)?))
}

#[cfg(not(feature = "http"))]
fn open_url(url: &str, _timeout: Option<Duration>) -> Result<Arc<dyn ByteRangeSource>> {
    Err(Error::Configuration(format!(
        "cannot open {}: built without the `http` feature",
        url
    )))
}

/// Cut `[offset, offset + length)` out of a complete buffer.
pub(crate) fn slice_range(data: &Bytes, offset: u64, length: u64) -> Option<Bytes> {
    let len = data.len() as u64;
    if length == 0 || offset >= len {
        return None;
    }
    let end = offset.saturating_add(length).min(len);
    Some(data.slice(offset as usize..end as usize))
}
