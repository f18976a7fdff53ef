//! Payload codecs for header, footer and block regions.
//!
//! Every region of a G3D file is an object-serialized value; the footer and
//! the data blocks are additionally DEFLATE-compressed. Both steps sit behind
//! traits so the reader is not tied to one encoding.
//!
//! # Implementations
//!
//! - [`PickleCodec`] - Python pickle, the encoding written by the G3D tools
//! - [`JsonCodec`] - JSON, for files produced outside the Python toolchain
//! - [`DeflateCodec`] - zlib or gzip framed DEFLATE via flate2

mod deflate;
mod json;
mod pickle;

pub use deflate::DeflateCodec;
pub use json::JsonCodec;
pub use pickle::PickleCodec;

use crate::{Error, Result};
use std::borrow::Cow;

/// Codec-neutral decoded value.
///
/// Dict keys keep their decoded type; typed conversion happens in the header
/// and footer readers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Dict(Vec<(Value, Value)>),
}

impl Value {
    /// Text content of string values; bytes are decoded as lossy UTF-8.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Bytes(b) => Some(String::from_utf8_lossy(b)),
            _ => None,
        }
    }

    /// Integer content, accepting decimal strings as written for dict keys.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::String(_) | Value::Bytes(_) => self.as_text()?.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a dict entry by text key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict()?
            .iter()
            .find(|(k, _)| k.as_text().is_some_and(|k| k == key))
            .map(|(_, v)| v)
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
        }
    }

    pub(crate) fn expect_dict(&self, what: &str) -> Result<&[(Value, Value)]> {
        self.as_dict().ok_or_else(|| {
            Error::Format(format!("{} must be a dict, got {}", what, self.type_name()))
        })
    }

    pub(crate) fn expect_list(&self, what: &str) -> Result<&[Value]> {
        self.as_list().ok_or_else(|| {
            Error::Format(format!("{} must be a list, got {}", what, self.type_name()))
        })
    }
}

/// Decodes an object-serialized buffer into a [`Value`].
pub trait ObjectCodec: Send + Sync {
    /// Decode the first value in `data`; bytes after it are ignored.
    fn decode(&self, data: &[u8]) -> Result<Value>;
}

/// Decompresses a DEFLATE-family buffer.
pub trait CompressionCodec: Send + Sync {
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_int_accepts_numeric_keys() {
        assert_eq!(Value::Int(20000).as_int(), Some(20000));
        assert_eq!(Value::String("4681".into()).as_int(), Some(4681));
        assert_eq!(Value::Bytes(b"12".to_vec()).as_int(), Some(12));
        assert_eq!(Value::String("chr1".into()).as_int(), None);
        assert_eq!(Value::Float(1.0).as_int(), None);
    }

    #[test]
    fn test_get_by_text_key() {
        let dict = Value::Dict(vec![
            (Value::Int(1), Value::Bool(true)),
            (Value::Bytes(b"genome".to_vec()), Value::String("hg19".into())),
        ]);
        assert_eq!(dict.get("genome"), Some(&Value::String("hg19".into())));
        assert_eq!(dict.get("magic"), None);
        assert_eq!(Value::None.get("genome"), None);
    }

    #[test]
    fn test_expect_reports_type() {
        let err = Value::Int(3).expect_list("block").unwrap_err();
        assert_eq!(err.to_string(), "format error: block must be a list, got int");
    }
}
