use super::{ByteRangeSource, slice_range};
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Serves byte ranges out of an in-memory blob.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl ByteRangeSource for MemorySource {
    async fn read(&self, offset: u64, length: u64) -> Result<Option<Bytes>> {
        let bytes = slice_range(&self.data, offset, length);
        tracing::trace!(offset, length, returned = bytes.as_ref().map(Bytes::len), "memory read");
        Ok(bytes)
    }
}
