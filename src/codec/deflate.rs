use super::CompressionCodec;
use crate::{Error, Result};
use flate2::read::{MultiGzDecoder, ZlibDecoder};
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// DEFLATE decompressor accepting both gzip and zlib framing.
///
/// Framing is picked from the gzip magic bytes; anything else is treated as a
/// zlib stream, which is what the G3D writer emits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeflateCodec;

impl CompressionCodec for DeflateCodec {
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() * 4);
        let inflated = if data.starts_with(&GZIP_MAGIC) {
            MultiGzDecoder::new(data).read_to_end(&mut out)
        } else {
            ZlibDecoder::new(data).read_to_end(&mut out)
        };
        inflated.map_err(|e| Error::Format(format!("failed to decompress: {}", e)))?;
        Ok(out)
    }
}
