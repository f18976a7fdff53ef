use super::{ObjectCodec, Value};
use crate::{Error, Result};

/// JSON decoder. Only the first JSON value in the buffer is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ObjectCodec for JsonCodec {
    fn decode(&self, data: &[u8]) -> Result<Value> {
        let value = serde_json::Deserializer::from_slice(data)
            .into_iter::<serde_json::Value>()
            .next()
            .ok_or_else(|| Error::Format("empty JSON payload".to_string()))?
            .map_err(|e| Error::Format(format!("failed to decode JSON: {}", e)))?;
        Ok(convert(value))
    }
}

fn convert(value: serde_json::Value) -> Value {
    use serde_json::Value as J;

    match value {
        J::Null => Value::None,
        J::Bool(b) => Value::Bool(b),
        J::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        J::String(s) => Value::String(s),
        J::Array(items) => Value::List(items.into_iter().map(convert).collect()),
        J::Object(map) => Value::Dict(
            map.into_iter()
                .map(|(k, v)| (Value::String(k), convert(v)))
                .collect(),
        ),
    }
}
