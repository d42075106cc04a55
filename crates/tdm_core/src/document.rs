//! Document and value types shared by every tier.

use crate::error::{Result, TdmError};
use std::fs;
use std::path::Path;

/// A loosely-structured data value.
///
/// One of null, boolean, number, string, ordered sequence, or nested
/// [`Document`]. Documents read from disk never contain cycles.
pub type Value = serde_json::Value;

/// An ordered mapping from string keys to [`Value`]s.
///
/// Insertion order is preserved so documents round-trip through disk
/// without reordering keys.
pub type Document = serde_json::Map<String, Value>;

/// Parses a JSON document from text.
///
/// The root must be an object; any other root is reported as malformed.
pub(crate) fn parse_document(path: &Path, content: &str) -> Result<Document> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| TdmError::MalformedDocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    match value {
        Value::Object(doc) => Ok(doc),
        other => Err(TdmError::MalformedDocument {
            path: path.to_path_buf(),
            reason: format!("expected an object at the root, found {}", kind_name(&other)),
        }),
    }
}

/// Reads a JSON document from disk.
///
/// Returns `Ok(None)` when the file does not exist.
pub(crate) fn read_document(path: &Path) -> Result<Option<Document>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(TdmError::Io(e)),
    };
    parse_document(path, &content).map(Some)
}

/// Short human-readable name of a value's variant.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "document",
    }
}
