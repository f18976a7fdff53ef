//! HTTP/HTTPS byte range source.
//!
//! Every read is a single GET with a `Range` header. Servers that ignore the
//! header and answer 200 with the whole object are handled by slicing the
//! body locally, so callers always see range semantics.

use super::{ByteRangeSource, slice_range};
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Byte range source backed by a range-capable HTTP server.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    /// Create a new HttpSource.
    ///
    /// # Arguments
    ///
    /// * `url` - Full URL of the G3D file
    /// * `timeout` - Optional per-request timeout, applied to every read
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn range_header(offset: u64, length: u64) -> String {
        // HTTP ranges are inclusive on both ends
        format!("bytes={}-{}", offset, offset + length - 1)
    }
}

#[async_trait]
impl ByteRangeSource for HttpSource {
    async fn read(&self, offset: u64, length: u64) -> Result<Option<Bytes>> {
        if length == 0 {
            return Ok(None);
        }

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::RANGE, Self::range_header(offset, length))
            .send()
            .await
            .map_err(|e| Error::Transport(format!("HTTP GET request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            tracing::debug!(url = %self.url, offset, length, "range not satisfiable");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::Transport(format!(
                "unexpected HTTP status {} for {}",
                status, self.url
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("failed to read HTTP response: {}", e)))?;

        let bytes = if status == StatusCode::PARTIAL_CONTENT {
            slice_range(&body, 0, length)
        } else {
            tracing::debug!(url = %self.url, "server ignored Range header, slicing full body");
            slice_range(&body, offset, length)
        };
        tracing::debug!(
            url = %self.url,
            offset,
            length,
            returned = bytes.as_ref().map(Bytes::len),
            "http range read"
        );
        Ok(bytes)
    }
}
