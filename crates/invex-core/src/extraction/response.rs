//! Decoding of the model's answer into JSON.

use serde_json::Value;

use crate::error::{summarize_payload, ExtractionError};

use super::Result;

/// Pull the JSON document out of a model answer.
///
/// Accepts, in order of preference: a ```json fenced block, any fenced
/// block, the whole answer, or the first JSON value embedded in prose.
pub fn parse_model_json(schema_id: &str, content: &str) -> Result<Value> {
    let malformed = |reason: String| ExtractionError::MalformedResponse {
        schema_id: schema_id.to_string(),
        reason,
        payload: summarize_payload(content),
    };

    if content.trim().is_empty() {
        return Err(malformed("empty answer".to_string()));
    }

    let candidate = fenced_block(content).unwrap_or_else(|| content.trim());
    if let Ok(value) = serde_json::from_str(candidate) {
        return Ok(value);
    }

    embedded_value(candidate).map_err(malformed)
}

fn fenced_block(content: &str) -> Option<&str> {
    let (start, skip) = match content.find("```json") {
        Some(pos) => (pos, "```json".len()),
        None => (content.find("```")?, "```".len()),
    };
    let body_start = start + skip;
    let body_len = content[body_start..].find("```")?;
    Some(content[body_start..body_start + body_len].trim())
}

/// Scan every opening bracket for a value that parses from there on.
///
/// Record-shaped values (an object, or a list of objects) win over other
/// values, so bracketed prose such as "Found [1] record:" is skipped.
fn embedded_value(content: &str) -> std::result::Result<Value, String> {
    let mut fallback = None;
    let mut first_error = None;

    for (pos, _) in content.match_indices(['{', '[']) {
        let mut stream = serde_json::Deserializer::from_str(&content[pos..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) if is_record_shaped(&value) => return Ok(value),
            Some(Ok(value)) => {
                fallback.get_or_insert(value);
            }
            Some(Err(e)) => {
                first_error.get_or_insert(e);
            }
            None => {}
        }
    }

    match (fallback, first_error) {
        (Some(value), _) => Ok(value),
        (None, Some(e)) => Err(format!("invalid JSON: {}", e)),
        (None, None) => Err("no JSON document found".to_string()),
    }
}

fn is_record_shaped(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().all(|v| v.is_object() || v.is_null()),
        _ => false,
    }
}
