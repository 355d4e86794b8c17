//! Extracted record representation.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::schema::RecordSchema;

/// One record extracted for a schema.
///
/// Every field declared by the schema has an entry, in declaration order.
/// A field the model did not find is held as `None` (the absent marker) and
/// serialized as `null`; it is never dropped from the mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    schema_id: String,
    values: Vec<(String, Option<String>)>,
}

impl ExtractedRecord {
    /// A record for `schema` with every field absent.
    pub fn absent(schema: &RecordSchema) -> Self {
        Self {
            schema_id: schema.id().to_string(),
            values: schema.field_names().map(|name| (name.to_string(), None)).collect(),
        }
    }

    pub fn schema_id(&self) -> &str {
        &self.schema_id
    }

    /// Value of a field, or `None` when it is absent or not declared.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Whether the schema declares `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.values.iter().any(|(name, _)| name == field)
    }

    /// Whether `field` is declared and holds the absent marker.
    pub fn is_absent(&self, field: &str) -> bool {
        self.values
            .iter()
            .any(|(name, value)| name == field && value.is_none())
    }

    /// Field names, in schema order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    /// `(field, value)` pairs, in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Number of fields holding a value.
    pub fn found_count(&self) -> usize {
        self.values.iter().filter(|(_, value)| value.is_some()).count()
    }

    /// Set a declared field. Undeclared names are ignored.
    pub(crate) fn set(&mut self, field: &str, value: Option<String>) {
        if let Some(slot) = self.values.iter_mut().find(|(name, _)| name == field) {
            slot.1 = value;
        }
    }
}

impl Serialize for ExtractedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
