//! Shallow Wisp metadata.
//!
//! Metadata describes a Wisp (title, tags, display hints, ...). Values are
//! scalars or arrays of scalars; nested maps, nested arrays and nulls are
//! not allowed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single metadata scalar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

/// A metadata value: a scalar or a flat array of scalars.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

/// Metadata map keyed by field name, ordered for stable serialization.
pub type Metadata = BTreeMap<String, MetadataValue>;

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Scalar> for MetadataValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<Scalar>> for MetadataValue {
    fn from(values: Vec<Scalar>) -> Self {
        Self::List(values)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Scalar(value.into())
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

/// Returns `true` if `metadata` is absent, or is a map whose values are all
/// scalars or arrays of scalars.
pub fn is_valid_metadata(metadata: Option<&Value>) -> bool {
    let Some(metadata) = metadata else {
        return true;
    };
    let Value::Object(fields) = metadata else {
        return false;
    };
    fields.values().all(|value| match value {
        Value::Array(items) => items.iter().all(is_scalar),
        other => is_scalar(other),
    })
}
