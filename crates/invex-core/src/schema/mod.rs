//! Declarative extraction schemas.
//!
//! A [`RecordSchema`] describes one kind of record to pull out of a document
//! (an invoice header, an address, a line item): its fields, how many records
//! a document yields, and few-shot examples handed to the model.

mod builtin;
mod registry;

pub use builtin::{invoice_registry, INVOICE_SCHEMAS_JSON};
pub use registry::{SchemaFile, SchemaRegistry};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RegistryError;

/// Whether a schema yields a single record or a list of records per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Exactly one record (possibly with every field absent).
    #[default]
    One,
    /// Zero or more records.
    Many,
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::One => write!(f, "one"),
            Cardinality::Many => write!(f, "many"),
        }
    }
}

/// Example input fragment and the value the model should pull from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldExample {
    pub input: String,
    pub output: String,
}

/// A single field to extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    name: String,
    description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    examples: Vec<FieldExample>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            examples: Vec::new(),
        }
    }

    /// Add an (input text, expected value) example.
    pub fn with_example(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.examples.push(FieldExample {
            input: input.into(),
            output: output.into(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn examples(&self) -> &[FieldExample] {
        &self.examples
    }
}

/// Example input fragment and the whole record expected from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordExample {
    pub input: String,
    /// JSON object keyed by field name.
    pub output: Value,
}

/// Description of one record type to extract from a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    id: String,
    /// Human readable section title, used only when rendering results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    description: String,
    #[serde(default)]
    cardinality: Cardinality,
    fields: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    examples: Vec<RecordExample>,
}

impl RecordSchema {
    /// Start a schema with no fields; add them with [`RecordSchema::with_field`].
    pub fn new(id: impl Into<String>, description: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: description.into(),
            cardinality,
            fields: Vec::new(),
            examples: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a whole-record example. `output` should be a JSON object keyed by field name.
    pub fn with_example(mut self, input: impl Into<String>, output: Value) -> Self {
        self.examples.push(RecordExample {
            input: input.into(),
            output,
        });
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display title, falling back to the id.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn examples(&self) -> &[RecordExample] {
        &self.examples
    }

    /// Declared field names, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Check the structural rules a schema must satisfy before it is registered.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidSchema {
            id: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty".to_string()));
        }
        if self.fields.is_empty() {
            return Err(invalid("at least one field is required".to_string()));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(invalid("field names must not be empty".to_string()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(invalid(format!("field {} declared twice", field.name)));
            }
        }

        for (i, example) in self.examples.iter().enumerate() {
            let object = example
                .output
                .as_object()
                .ok_or_else(|| invalid(format!("example {} output is not an object", i + 1)))?;
            if let Some(unknown) = object.keys().find(|k| !seen.contains(k.as_str())) {
                return Err(invalid(format!(
                    "example {} references undeclared field {}",
                    i + 1,
                    unknown
                )));
            }
        }

        Ok(())
    }
}
