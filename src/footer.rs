use crate::codec::{CompressionCodec, ObjectCodec, Value};
use crate::source::ByteRangeSource;
use crate::types::{BinMap, BlockLocation, FileHeader, FooterIndex};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Read, inflate and decode the index region named by `header`.
///
/// Returns `Ok(None)` when the region is empty or the source has no bytes
/// there; queries against such a file find no data.
pub async fn read_footer(
    source: &dyn ByteRangeSource,
    header: &FileHeader,
    object_codec: &dyn ObjectCodec,
    compression: &dyn CompressionCodec,
) -> Result<Option<FooterIndex>> {
    let Some(compressed) = source.read(header.index_offset, header.index_size).await? else {
        tracing::warn!(
            index_offset = header.index_offset,
            index_size = header.index_size,
            "no index region found"
        );
        return Ok(None);
    };

    let raw = compression.decompress(&compressed)?;
    let value = object_codec.decode(&raw)?;
    let index = FooterIndex::from_value(&value)?;
    tracing::debug!(
        compressed = compressed.len(),
        inflated = raw.len(),
        resolutions = ?index.resolutions(),
        blocks = index.block_count(),
        "read index"
    );
    Ok(Some(index))
}

impl FooterIndex {
    /// Convert `{resolution: {chrom: {bin: {offset, size}}}}` into the typed index.
    ///
    /// Resolution and bin keys may be integers or their decimal string form.
    pub fn from_value(value: &Value) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (res_key, chroms) in value.expect_dict("index")? {
            let resolution = u32_key(res_key, "resolution")?;
            let mut by_chrom = BTreeMap::new();
            for (chrom_key, bins) in chroms.expect_dict("index resolution entry")? {
                let chrom = chrom_key
                    .as_text()
                    .ok_or_else(|| {
                        Error::Format(format!("chromosome key {:?} is not a string", chrom_key))
                    })?
                    .into_owned();
                by_chrom.insert(chrom, bin_map(bins)?);
            }
            entries.insert(resolution, by_chrom);
        }
        Ok(FooterIndex::new(entries))
    }
}

fn bin_map(value: &Value) -> Result<BinMap> {
    value
        .expect_dict("index chromosome entry")?
        .iter()
        .map(|(bin, location)| Ok((u32_key(bin, "bin")?, block_location(location)?)))
        .collect()
}

fn block_location(value: &Value) -> Result<BlockLocation> {
    value.expect_dict("block location")?;
    let number = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_int)
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| Error::Format(format!("block location has no valid `{}`", name)))
    };
    Ok(BlockLocation {
        offset: number("offset")?,
        size: number("size")?,
    })
}

fn u32_key(key: &Value, what: &str) -> Result<u32> {
    key.as_int()
        .and_then(|k| u32::try_from(k).ok())
        .ok_or_else(|| Error::Format(format!("invalid {} key {:?}", what, key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DeflateCodec, JsonCodec};
    use crate::source::MemorySource;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    const FOOTER_JSON: &str = r#"{"20000": {"chr1": {"5": {"offset": 4096, "size": 512},
        "4681": {"offset": 1024, "size": 100}}, "chrX": {}}, "5000": {}}"#;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn header(index_offset: u64, index_size: u64) -> FileHeader {
        FileHeader {
            magic: "G3D".to_string(),
            genome: "hg19".to_string(),
            version: 1,
            resolutions: vec![5000, 20000],
            name: "test".to_string(),
            index_offset,
            index_size,
        }
    }

    #[test]
    fn test_from_value() {
        let index = FooterIndex::from_value(&JsonCodec.decode(FOOTER_JSON.as_bytes()).unwrap())
            .unwrap();
        assert_eq!(index.resolutions(), vec![5000, 20000]);
        let chr1 = index.chromosome(20000, "chr1").unwrap();
        assert_eq!(chr1.get(&5), Some(&BlockLocation { offset: 4096, size: 512 }));
        assert_eq!(chr1.get(&4681), Some(&BlockLocation { offset: 1024, size: 100 }));
        assert!(index.chromosome(20000, "chrX").unwrap().is_empty());
    }

    #[test]
    fn test_from_value_rejects_bad_keys() {
        for bad in [
            r#"{"fine": {}}"#,
            r#"{"20000": {"chr1": {"bin5": {"offset": 1, "size": 1}}}}"#,
            r#"{"20000": {"chr1": {"5": {"offset": 1}}}}"#,
            r#"{"20000": {"chr1": {"5": {"offset": -1, "size": 1}}}}"#,
            r#"{"20000": []}"#,
        ] {
            let value = JsonCodec.decode(bad.as_bytes()).unwrap();
            assert!(FooterIndex::from_value(&value).unwrap_err().is_format(), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_read_footer() {
        let compressed = zlib(FOOTER_JSON.as_bytes());
        let mut blob = vec![0u8; 1024];
        blob.extend_from_slice(&compressed);
        let source = MemorySource::new(blob);

        let index = read_footer(
            &source,
            &header(1024, compressed.len() as u64),
            &JsonCodec,
            &DeflateCodec,
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(index.block_count(), 2);
    }

    #[tokio::test]
    async fn test_index_outside_file_is_absent() {
        let source = MemorySource::new(vec![0u8; 1024]);
        let index = read_footer(&source, &header(2048, 256), &JsonCodec, &DeflateCodec)
            .await
            .unwrap();
        assert!(index.is_none());
    }

    #[tokio::test]
    async fn test_uncompressed_index_is_format_error() {
        let mut blob = vec![0u8; 1024];
        blob.extend_from_slice(FOOTER_JSON.as_bytes());
        let source = MemorySource::new(blob);
        let err = read_footer(
            &source,
            &header(1024, FOOTER_JSON.len() as u64),
            &JsonCodec,
            &DeflateCodec,
        )
        .await
        .unwrap_err();
        assert!(err.is_format());
    }
}
