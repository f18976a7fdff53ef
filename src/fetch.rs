//! Region queries against a decoded index.
//!
//! A query maps `[start, end)` to candidate bins, keeps the bins present in
//! the index, then reads every matching block concurrently. Blocks are
//! polled together inside the caller's task rather than spawned; results are
//! reassembled in bin order whatever order the reads finish in.

use crate::binning::reg2bins;
use crate::codec::{CompressionCodec, ObjectCodec, Value};
use crate::source::ByteRangeSource;
use crate::types::{BlockLocation, FooterIndex, Record};
use crate::{Error, Result};
use futures::future::join_all;

pub struct RecordFetcher<'a> {
    source: &'a dyn ByteRangeSource,
    object_codec: &'a dyn ObjectCodec,
    compression: &'a dyn CompressionCodec,
}

impl<'a> RecordFetcher<'a> {
    pub fn new(
        source: &'a dyn ByteRangeSource,
        object_codec: &'a dyn ObjectCodec,
        compression: &'a dyn CompressionCodec,
    ) -> Self {
        Self {
            source,
            object_codec,
            compression,
        }
    }

    /// Fetch every record stored in bins overlapping `[start, end)`.
    ///
    /// Returns `Ok(None)` when `resolution` or `chrom` is not indexed. Every
    /// issued block read runs to completion and no records are returned if
    /// any failed. A transport failure takes precedence over a malformed
    /// block; otherwise the first failure in bin order is returned.
    pub async fn fetch(
        &self,
        index: &FooterIndex,
        chrom: &str,
        start: u64,
        end: u64,
        resolution: u32,
    ) -> Result<Option<Vec<Record>>> {
        let Some(chromosomes) = index.resolution(resolution) else {
            tracing::debug!(resolution, "resolution not indexed");
            return Ok(None);
        };
        let Some(bins) = chromosomes.get(chrom) else {
            tracing::debug!(chrom, resolution, "chromosome not indexed");
            return Ok(None);
        };

        let candidates = reg2bins(start, end);
        let locations: Vec<(u32, BlockLocation)> = candidates
            .iter()
            .filter_map(|bin| bins.get(bin).map(|location| (*bin, *location)))
            .collect();

        let blocks = join_all(
            locations
                .iter()
                .map(|&(bin, location)| self.fetch_block(bin, location)),
        )
        .await;

        let mut records = Vec::new();
        let mut failure = None;
        for block in blocks {
            match block {
                Ok(rows) => records.extend(rows),
                Err(e) if e.is_transport() => return Err(e),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        tracing::debug!(
            chrom,
            start,
            end,
            resolution,
            candidates = candidates.len(),
            blocks = locations.len(),
            records = records.len(),
            "fetched region"
        );
        Ok(Some(records))
    }

    async fn fetch_block(&self, bin: u32, location: BlockLocation) -> Result<Vec<Record>> {
        let Some(compressed) = self.source.read(location.offset, location.size).await? else {
            tracing::debug!(bin, offset = location.offset, "block not present in source");
            return Ok(Vec::new());
        };
        let raw = self.compression.decompress(&compressed)?;
        let value = self.object_codec.decode(&raw)?;
        split_rows(&value).inspect_err(|e| {
            tracing::warn!(bin, offset = location.offset, error = %e, "malformed block");
        })
    }
}

/// Split each decoded row on tabs.
fn split_rows(value: &Value) -> Result<Vec<Record>> {
    value
        .expect_list("block")?
        .iter()
        .map(|row| {
            row.as_text()
                .map(|line| line.split('\t').map(str::to_owned).collect())
                .ok_or_else(|| Error::Format(format!("block row {:?} is not a string", row)))
        })
        .collect()
}
