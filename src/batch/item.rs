//! Batch items and the stock validity predicates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One unit of work: an opaque, user-chosen label plus a task-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem<P> {
    pub identifier: String,
    pub payload: P,
}

impl<P> BatchItem<P> {
    pub fn new(identifier: impl Into<String>, payload: P) -> Self {
        Self {
            identifier: identifier.into(),
            payload,
        }
    }
}

/// Trimmed character count of the text in a JSON payload.
///
/// With a `field`, only that top-level string field counts. Without one, every
/// top-level string field is summed; a bare string payload counts as itself.
pub fn payload_text_len(payload: &Value, field: Option<&str>) -> usize {
    fn trimmed_len(value: &Value) -> usize {
        value
            .as_str()
            .map(|s| s.trim().chars().count())
            .unwrap_or(0)
    }

    match (payload, field) {
        (Value::Object(map), Some(field)) => map.get(field).map(trimmed_len).unwrap_or(0),
        (Value::Object(map), None) => map.values().map(trimmed_len).sum(),
        (Value::String(_), _) => trimmed_len(payload),
        _ => 0,
    }
}

/// Validity predicate for JSON payloads: at least `min_len` characters of text.
pub fn json_text_at_least(
    min_len: usize,
    field: Option<String>,
) -> impl Fn(&BatchItem<Value>) -> bool {
    move |item| payload_text_len(&item.payload, field.as_deref()) >= min_len
}
