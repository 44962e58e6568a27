//! Filter builders for location-scoped and full-text Qdrant queries.

use serde_json::{Value, json};

/// Payload field holding the document's folder path.
pub const LOCATION_FIELD: &str = "location";
/// Payload field holding the extracted document text.
pub const CONTENT_FIELD: &str = "content";

/// Full-text match condition on a payload field.
pub fn text_condition(field: &str, text: &str) -> Value {
    json!({
        "key": field,
        "match": { "text": text }
    })
}

/// Filter restricting a similarity query to documents whose location contains `location`.
pub fn location_filter(location: Option<&str>) -> Option<Value> {
    location.map(|value| json!({ "must": [text_condition(LOCATION_FIELD, value)] }))
}

/// Filter matching `query` against the content field, optionally scoped by location.
pub fn content_filter(query: &str, location: Option<&str>) -> Value {
    let mut must = vec![text_condition(CONTENT_FIELD, query)];
    if let Some(value) = location {
        must.push(text_condition(LOCATION_FIELD, value));
    }
    json!({ "must": must })
}
