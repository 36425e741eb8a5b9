use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::GatewayError;

/// Key/value company record as returned by the market-data provider.
///
/// Every accessor is strict: an absent or `null` key is a
/// [`GatewayError::MissingField`], a value of the wrong JSON type is a
/// [`GatewayError::SchemaMismatch`]. Nothing is defaulted.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct InfoRecord(Map<String, Value>);

impl InfoRecord {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inserts `value` under `key` unless the key is already present.
    pub fn insert_if_absent(&mut self, key: &str, value: Value) {
        if !self.0.contains_key(key) {
            self.0.insert(key.to_string(), value);
        }
    }

    fn require(&self, field: &'static str) -> Result<&Value, GatewayError> {
        match self.0.get(field) {
            None | Some(Value::Null) => Err(GatewayError::MissingField(field)),
            Some(value) => Ok(value),
        }
    }

    pub fn require_str(&self, field: &'static str) -> Result<&str, GatewayError> {
        self.require(field)?
            .as_str()
            .ok_or(GatewayError::SchemaMismatch {
                field,
                expected: "string",
            })
    }

    pub fn require_f64(&self, field: &'static str) -> Result<f64, GatewayError> {
        self.require(field)?
            .as_f64()
            .ok_or(GatewayError::SchemaMismatch {
                field,
                expected: "number",
            })
    }

    pub fn require_u64(&self, field: &'static str) -> Result<u64, GatewayError> {
        self.require(field)?
            .as_u64()
            .ok_or(GatewayError::SchemaMismatch {
                field,
                expected: "non-negative integer",
            })
    }
}

impl From<Map<String, Value>> for InfoRecord {
    fn from(fields: Map<String, Value>) -> Self {
        InfoRecord(fields)
    }
}
