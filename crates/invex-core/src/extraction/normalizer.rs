//! Reshape raw model output into records of the declared cardinality.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{summarize_payload, ExtractionError};
use crate::models::{ExtractedRecord, SchemaResult};
use crate::schema::{Cardinality, RecordSchema};

use super::Result;

/// Normalize a raw provider result for `schema`.
///
/// - A top-level `{"<schema id>": ...}` envelope is unwrapped, unless the id
///   is also a declared field name.
/// - `one` schemas accept an object, `null`, or a list whose first element is
///   taken (the rest are discarded).
/// - `many` schemas accept a list (possibly empty), a single object, or `null`.
/// - Every declared field is present in each record; missing, `null` and
///   blank values become the absent marker.
/// - Strings are kept as extracted; numbers and booleans keep their textual
///   form. No numeric coercion happens here.
pub fn normalize(schema: &RecordSchema, raw: &Value) -> Result<SchemaResult> {
    let body = unwrap_envelope(schema, raw);

    match schema.cardinality() {
        Cardinality::One => normalize_one(schema, body).map(SchemaResult::One),
        Cardinality::Many => normalize_many(schema, body).map(SchemaResult::Many),
    }
}

fn unwrap_envelope<'a>(schema: &RecordSchema, raw: &'a Value) -> &'a Value {
    if schema.has_field(schema.id()) {
        return raw;
    }
    match raw.as_object().and_then(|obj| obj.get(schema.id()).map(|inner| (obj, inner))) {
        Some((obj, inner)) => {
            if obj.len() > 1 {
                debug!(
                    "Ignoring {} keys next to the {} envelope",
                    obj.len() - 1,
                    schema.id()
                );
            }
            inner
        }
        None => raw,
    }
}

fn normalize_one(schema: &RecordSchema, body: &Value) -> Result<ExtractedRecord> {
    match body {
        Value::Object(obj) => record_from_object(schema, obj),
        Value::Null => Ok(ExtractedRecord::absent(schema)),
        Value::Array(items) => {
            if items.len() > 1 {
                debug!(
                    "Schema {} expects one record, discarding {} extra candidates",
                    schema.id(),
                    items.len() - 1
                );
            }
            match items.first() {
                None | Some(Value::Null) => Ok(ExtractedRecord::absent(schema)),
                Some(Value::Object(obj)) => record_from_object(schema, obj),
                Some(other) => Err(malformed(
                    schema,
                    format!("expected a record object, found a list of {}", kind(other)),
                    body,
                )),
            }
        }
        other => Err(malformed(
            schema,
            format!("expected a record object, found {}", kind(other)),
            body,
        )),
    }
}

fn normalize_many(schema: &RecordSchema, body: &Value) -> Result<Vec<ExtractedRecord>> {
    match body {
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Object(obj) => records.push(record_from_object(schema, obj)?),
                    Value::Null => debug!("Skipping null candidate {} for {}", i, schema.id()),
                    other => {
                        return Err(malformed(
                            schema,
                            format!("candidate {} is {}, expected a record object", i, kind(other)),
                            body,
                        ));
                    }
                }
            }
            Ok(records)
        }
        Value::Object(obj) => {
            debug!("Schema {} expects a list, wrapping single record", schema.id());
            Ok(vec![record_from_object(schema, obj)?])
        }
        Value::Null => Ok(Vec::new()),
        other => Err(malformed(
            schema,
            format!("expected a list of records, found {}", kind(other)),
            body,
        )),
    }
}

fn record_from_object(schema: &RecordSchema, obj: &Map<String, Value>) -> Result<ExtractedRecord> {
    let mut record = ExtractedRecord::absent(schema);

    for field in schema.fields() {
        let value = match obj.get(field.name()) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            Some(nested) => {
                return Err(malformed(
                    schema,
                    format!("field {} holds {}, expected a text value", field.name(), kind(nested)),
                    &Value::Object(obj.clone()),
                ));
            }
        };
        record.set(field.name(), value);
    }

    let extraneous: Vec<&str> = obj
        .keys()
        .map(String::as_str)
        .filter(|k| !schema.has_field(k))
        .collect();
    if !extraneous.is_empty() {
        debug!("Ignoring undeclared keys for {}: {:?}", schema.id(), extraneous);
    }

    Ok(record)
}

fn malformed(schema: &RecordSchema, reason: String, payload: &Value) -> ExtractionError {
    ExtractionError::MalformedExtraction {
        schema_id: schema.id().to_string(),
        reason,
        payload: summarize_payload(&payload.to_string()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn invoice_schema() -> RecordSchema {
        RecordSchema::new("invoice", "invoice header", Cardinality::One)
            .with_field(FieldSchema::new("invoice_number", "number"))
            .with_field(FieldSchema::new("invoice_date", "date"))
            .with_field(FieldSchema::new("terms", "payment terms"))
    }

    fn items_schema() -> RecordSchema {
        RecordSchema::new("line_items", "products", Cardinality::Many)
            .with_field(FieldSchema::new("product_description", "description"))
            .with_field(FieldSchema::new("count", "units"))
    }

    #[test]
    fn test_one_fills_missing_fields() {
        let result = normalize(&invoice_schema(), &json!({"invoice_number": "1019273"})).unwrap();
        let record = result.as_one().unwrap();

        assert_eq!(record.get("invoice_number"), Some("1019273"));
        assert!(record.is_absent("invoice_date"));
        assert!(record.is_absent("terms"));
        assert_eq!(
            record.field_names().collect::<Vec<_>>(),
            vec!["invoice_number", "invoice_date", "terms"]
        );
    }

    #[test]
    fn test_one_takes_first_candidate() {
        let raw = json!([
            {"invoice_number": "291870.4-1"},
            {"invoice_number": "291870.5-1"}
        ]);
        let result = normalize(&invoice_schema(), &raw).unwrap();
        assert_eq!(result.as_one().unwrap().get("invoice_number"), Some("291870.4-1"));
    }

    #[test]
    fn test_one_unwraps_envelope() {
        let raw = json!({"invoice": [{"terms": "Net 30"}]});
        let result = normalize(&invoice_schema(), &raw).unwrap();
        assert_eq!(result.as_one().unwrap().get("terms"), Some("Net 30"));
    }

    #[test]
    fn test_one_null_and_empty_list_are_absent() {
        for raw in [json!(null), json!([]), json!({"invoice": null})] {
            let result = normalize(&invoice_schema(), &raw).unwrap();
            assert_eq!(result.as_one().unwrap().found_count(), 0);
        }
    }

    #[test]
    fn test_one_scalar_is_malformed() {
        let err = normalize(&invoice_schema(), &json!("1019273")).unwrap_err();
        match err {
            ExtractionError::MalformedExtraction { schema_id, reason, payload } => {
                assert_eq!(schema_id, "invoice");
                assert!(reason.contains("found a string"));
                assert_eq!(payload, "\"1019273\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_many_empty_list_is_valid() {
        let result = normalize(&items_schema(), &json!([])).unwrap();
        assert_eq!(result, SchemaResult::Many(vec![]));

        let result = normalize(&items_schema(), &json!({"line_items": []})).unwrap();
        assert!(result.as_many().unwrap().is_empty());
    }

    #[test]
    fn test_many_normalizes_each_candidate() {
        let raw = json!([{"product_description": "CABLE", "count": "40"}, {}]);
        let result = normalize(&items_schema(), &raw).unwrap();
        let records = result.as_many().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("product_description"), Some("CABLE"));
        assert_eq!(records[0].get("count"), Some("40"));
        assert_eq!(records[1].found_count(), 0);
        assert!(records[1].has_field("count"));
    }

    #[test]
    fn test_many_single_object_is_wrapped() {
        let result = normalize(&items_schema(), &json!({"count": "10"})).unwrap();
        assert_eq!(result.as_many().unwrap().len(), 1);
    }

    #[test]
    fn test_many_scalar_candidate_is_malformed() {
        let err = normalize(&items_schema(), &json!([{"count": "1"}, 7])).unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedExtraction { .. }));
        assert!(err.to_string().contains("candidate 1 is a number"));
    }

    #[test]
    fn test_values_keep_textual_form() {
        let raw: Value =
            serde_json::from_str(r#"[{"product_description": "  ", "count": 100}, {"count": 0.90000}]"#)
                .unwrap();
        let result = normalize(&items_schema(), &raw).unwrap();
        let records = result.as_many().unwrap();

        assert!(records[0].is_absent("product_description"));
        assert_eq!(records[0].get("count"), Some("100"));
        assert_eq!(records[1].get("count"), Some("0.90000"));
    }

    #[test]
    fn test_unquoted_numbers_keep_digits() {
        let registry = crate::schema::invoice_registry().unwrap();

        let raw: Value = serde_json::from_str(
            r#"{"line_items":[{"count":100,"unit_item_price":0.90000,"product_total_price":7903.20}]}"#,
        )
        .unwrap();
        let result = normalize(registry.get("line_items").unwrap(), &raw).unwrap();
        let item = &result.as_many().unwrap()[0];
        assert_eq!(item.get("count"), Some("100"));
        assert_eq!(item.get("unit_item_price"), Some("0.90000"));
        assert_eq!(item.get("product_total_price"), Some("7903.20"));

        let raw: Value =
            serde_json::from_str(r#"{"invoice_number":123456789012345678901234}"#).unwrap();
        let result = normalize(registry.get("invoice").unwrap(), &raw).unwrap();
        assert_eq!(
            result.as_one().unwrap().get("invoice_number"),
            Some("123456789012345678901234")
        );
    }

    #[test]
    fn test_nested_field_value_is_malformed() {
        let raw = json!({"invoice_number": {"value": "1"}});
        let err = normalize(&invoice_schema(), &raw).unwrap_err();
        assert!(err.to_string().contains("field invoice_number holds an object"));
    }

    #[test]
    fn test_extraneous_keys_are_ignored() {
        let raw = json!({"invoice_number": "1", "vendor": "ACME"});
        let record = normalize(&invoice_schema(), &raw).unwrap();
        let record = record.as_one().unwrap();
        assert!(!record.has_field("vendor"));
        assert_eq!(record.field_names().count(), 3);
    }

    #[test]
    fn test_envelope_not_unwrapped_when_id_is_a_field() {
        let schema = RecordSchema::new("terms", "payment terms", Cardinality::One)
            .with_field(FieldSchema::new("terms", "payment terms"));
        let result = normalize(&schema, &json!({"terms": "NET 45"})).unwrap();
        assert_eq!(result.as_one().unwrap().get("terms"), Some("NET 45"));
    }
}
