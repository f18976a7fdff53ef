use super::{ObjectCodec, Value};
use crate::{Error, Result};
use serde_pickle::{DeOptions, Deserializer, HashableValue};

/// Python pickle decoder.
///
/// Header regions are zero padded past the pickle STOP opcode, so decoding
/// stops after the first value instead of rejecting trailing bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickleCodec;

impl ObjectCodec for PickleCodec {
    fn decode(&self, data: &[u8]) -> Result<Value> {
        let mut de = Deserializer::new(data, DeOptions::new().decode_strings());
        let value = de
            .deserialize_value()
            .map_err(|e| Error::Format(format!("failed to decode pickle: {}", e)))?;
        Ok(convert(value))
    }
}

fn convert(value: serde_pickle::Value) -> Value {
    use serde_pickle::Value as P;

    match value {
        P::None => Value::None,
        P::Bool(b) => Value::Bool(b),
        P::I64(i) => Value::Int(i),
        // only produced for integers outside i64 range
        P::Int(big) => Value::String(big.to_string()),
        P::F64(f) => Value::Float(f),
        P::Bytes(b) => Value::Bytes(b),
        P::String(s) => Value::String(s),
        P::List(items) | P::Tuple(items) => Value::List(items.into_iter().map(convert).collect()),
        P::Set(items) | P::FrozenSet(items) => Value::List(
            items
                .into_iter()
                .map(|item| convert(HashableValue::into_value(item)))
                .collect(),
        ),
        P::Dict(entries) => Value::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (convert(k.into_value()), convert(v)))
                .collect(),
        ),
    }
}
