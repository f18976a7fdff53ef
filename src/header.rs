use crate::codec::{ObjectCodec, Value};
use crate::source::ByteRangeSource;
use crate::types::FileHeader;
use crate::{Error, Result};

/// Size of the header region at the start of every G3D file.
pub const HEADER_SIZE: u64 = 1024;

/// Read and decode the header region.
///
/// Returns `Ok(None)` when the source has nothing at offset 0.
pub async fn read_header(
    source: &dyn ByteRangeSource,
    codec: &dyn ObjectCodec,
) -> Result<Option<FileHeader>> {
    let Some(bytes) = source.read(0, HEADER_SIZE).await? else {
        tracing::warn!("no header region found");
        return Ok(None);
    };

    let value = codec.decode(&bytes)?;
    let header = FileHeader::from_value(&value)?;
    tracing::debug!(
        magic = %header.magic,
        genome = %header.genome,
        version = header.version,
        index_offset = header.index_offset,
        index_size = header.index_size,
        "read header"
    );
    Ok(Some(header))
}

impl FileHeader {
    /// Build a header from its decoded form, requiring all seven fields.
    pub fn from_value(value: &Value) -> Result<Self> {
        value.expect_dict("header")?;

        let magic = text_field(value, "magic")?;
        let genome = text_field(value, "genome")?;
        let version = int_field(value, "version")?;
        let resolutions = field(value, "resolutions")?
            .expect_list("header field `resolutions`")?
            .iter()
            .map(|r| {
                r.as_int()
                    .and_then(|r| u32::try_from(r).ok())
                    .ok_or_else(|| Error::Format(format!("invalid resolution {:?}", r)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FileHeader {
            magic,
            genome,
            version,
            resolutions,
            name: text_field(value, "name")?,
            index_offset: offset_field(value, "index_offset")?,
            index_size: offset_field(value, "index_size")?,
        })
    }
}

fn field<'a>(value: &'a Value, name: &str) -> Result<&'a Value> {
    value
        .get(name)
        .ok_or_else(|| Error::Format(format!("header is missing field `{}`", name)))
}

fn text_field(value: &Value, name: &str) -> Result<String> {
    field(value, name)?
        .as_text()
        .map(|s| s.into_owned())
        .ok_or_else(|| Error::Format(format!("header field `{}` is not a string", name)))
}

fn int_field(value: &Value, name: &str) -> Result<i64> {
    field(value, name)?
        .as_int()
        .ok_or_else(|| Error::Format(format!("header field `{}` is not an integer", name)))
}

fn offset_field(value: &Value, name: &str) -> Result<u64> {
    let raw = int_field(value, name)?;
    u64::try_from(raw)
        .map_err(|_| Error::Format(format!("header field `{}` is negative: {}", name, raw)))
}
