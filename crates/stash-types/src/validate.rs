//! Validation of untyped Wisp candidates.
//!
//! Candidates arrive as JSON values (from plugins, files, callers that
//! build Wisps dynamically). [`assert_valid`] decides whether such a value
//! can be accepted as a Wisp and reports which rule it broke.

use serde_json::Value;

use crate::error::{Result, WispError};
use crate::metadata::is_valid_metadata;
use crate::path::{is_valid_local_id, is_valid_path};

/// Returns `true` for any string, or for an array whose elements are all
/// valid local ids.
pub fn is_valid_content(content: &Value) -> bool {
    match content {
        Value::String(_) => true,
        Value::Array(items) => items
            .iter()
            .all(|item| item.as_str().is_some_and(is_valid_local_id)),
        _ => false,
    }
}

fn type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "missing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

/// Check that `candidate` is a valid Wisp.
///
/// The path is checked first (`MalformedPath`), then the content, then the
/// metadata if present (`MalformedWisp`).
pub fn assert_valid(candidate: &Value) -> Result<()> {
    let Value::Object(fields) = candidate else {
        return Err(WispError::MalformedWisp(format!(
            "{} value is not compatible with the Wisp shape",
            type_name(Some(candidate))
        )));
    };

    let path = match fields.get("path") {
        Some(Value::String(path)) if is_valid_path(path) => path,
        Some(Value::String(path)) => return Err(WispError::MalformedPath { path: path.clone() }),
        other => {
            return Err(WispError::MalformedPath {
                path: other.map(Value::to_string).unwrap_or_default(),
            })
        }
    };

    let content = fields.get("content");
    if !content.is_some_and(is_valid_content) {
        return Err(WispError::MalformedWisp(format!(
            "Wisp<{path}> has invalid content of type {}",
            type_name(content)
        )));
    }

    if let Some(metadata) = fields.get("metadata") {
        if !is_valid_metadata(Some(metadata)) {
            return Err(WispError::MalformedWisp(format!(
                "Wisp<{path}> has invalid metadata of type {}",
                type_name(Some(metadata))
            )));
        }
    }

    Ok(())
}
