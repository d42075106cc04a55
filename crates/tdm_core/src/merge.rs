//! Right-biased deep merge of data documents.
//!
//! Rules, applied recursively:
//! - a sequence on either side is replaced wholesale by the override;
//! - a scalar (or null) on either side is replaced by the override;
//! - two documents merge key by key, keys only in the override are added.
//!
//! A `null` override counts as "not defined" and keeps the base value.
//! Inputs are never mutated.

use crate::document::{Document, Value};

/// Merges `override_value` onto `base`.
///
/// `None` means the override does not define this value at all.
pub fn merge_values(base: &Value, override_value: Option<&Value>) -> Value {
    let override_value = match override_value {
        Some(Value::Null) | None => return base.clone(),
        Some(v) => v,
    };

    match (base, override_value) {
        (Value::Object(base_doc), Value::Object(override_doc)) => {
            Value::Object(merge_documents(base_doc, override_doc))
        }
        // Sequences and scalars: override wins wholesale.
        _ => override_value.clone(),
    }
}

/// Merges two documents, with `override_doc` taking precedence.
///
/// Every key of `base` is kept, in base order, merged with the override's
/// value when present. Keys only in `override_doc` follow, as-is.
pub fn merge_documents(base: &Document, override_doc: &Document) -> Document {
    let mut result = Document::new();

    for (key, base_value) in base {
        result.insert(key.clone(), merge_values(base_value, override_doc.get(key)));
    }

    for (key, value) in override_doc {
        if !base.contains_key(key) {
            result.insert(key.clone(), value.clone());
        }
    }

    result
}

/// Folds documents left to right, later documents overriding earlier ones.
pub fn merge_all<'a, I>(docs: I) -> Document
where
    I: IntoIterator<Item = &'a Document>,
{
    docs.into_iter()
        .fold(Document::new(), |acc, doc| merge_documents(&acc, doc))
}
