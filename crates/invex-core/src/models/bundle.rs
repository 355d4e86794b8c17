//! Aggregated results of one extraction run.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::record::ExtractedRecord;

/// Result for one schema, shaped by its cardinality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaResult {
    /// Result of a `one` schema.
    One(ExtractedRecord),
    /// Result of a `many` schema; may be empty.
    Many(Vec<ExtractedRecord>),
    /// The schema failed and the run was configured to continue.
    Failed { error: String },
}

impl SchemaResult {
    /// Records held by this result (none for failures).
    pub fn records(&self) -> &[ExtractedRecord] {
        match self {
            SchemaResult::One(record) => std::slice::from_ref(record),
            SchemaResult::Many(records) => records,
            SchemaResult::Failed { .. } => &[],
        }
    }

    pub fn as_one(&self) -> Option<&ExtractedRecord> {
        match self {
            SchemaResult::One(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_many(&self) -> Option<&[ExtractedRecord]> {
        match self {
            SchemaResult::Many(records) => Some(records),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SchemaResult::Failed { error } => Some(error),
            _ => None,
        }
    }
}

impl Serialize for SchemaResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SchemaResult::One(record) => record.serialize(serializer),
            SchemaResult::Many(records) => records.serialize(serializer),
            SchemaResult::Failed { error } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

/// Results of every schema for one document, in registry order.
///
/// Serializes as a plain nested mapping:
/// `schema_id -> record | [record] -> field -> value | null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionBundle {
    results: Vec<(String, SchemaResult)>,
}

impl ExtractionBundle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, schema_id: &str, result: SchemaResult) {
        self.results.push((schema_id.to_string(), result));
    }

    /// Result for a schema id.
    pub fn get(&self, schema_id: &str) -> Option<&SchemaResult> {
        self.results
            .iter()
            .find(|(id, _)| id == schema_id)
            .map(|(_, result)| result)
    }

    /// `(schema_id, result)` pairs in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaResult)> {
        self.results.iter().map(|(id, result)| (id.as_str(), result))
    }

    pub fn schema_ids(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// `(schema_id, error)` for schemas that failed under the continue policy.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results
            .iter()
            .filter_map(|(id, result)| result.error().map(|e| (id.as_str(), e)))
    }

    /// The bundle as a JSON value, for presentation layers.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for ExtractionBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for (id, result) in &self.results {
            map.serialize_entry(id, result)?;
        }
        map.end()
    }
}
