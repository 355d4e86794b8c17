//! Ordered, id-unique collection of record schemas.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::RecordSchema;
use crate::error::{InvexError, RegistryError};

/// On-disk layout of a schema file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    pub schemas: Vec<RecordSchema>,
}

/// Registry of record schemas, iterated in registration order.
///
/// The registry is built once at startup and only read while documents are
/// processed.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<RecordSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema after validating it.
    pub fn register(&mut self, schema: RecordSchema) -> Result<(), RegistryError> {
        schema.validate()?;
        if self.contains(schema.id()) {
            return Err(RegistryError::DuplicateSchema(schema.id().to_string()));
        }
        self.schemas.push(schema);
        Ok(())
    }

    /// Look up a schema by id.
    pub fn get(&self, id: &str) -> Result<&RecordSchema, RegistryError> {
        self.schemas
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| RegistryError::UnknownSchema(id.to_string()))
    }

    /// All schemas in registration order.
    pub fn all(&self) -> &[RecordSchema] {
        &self.schemas
    }

    pub fn contains(&self, id: &str) -> bool {
        self.schemas.iter().any(|s| s.id() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(|s| s.id())
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Build a registry from schemas, keeping their order.
    pub fn from_schemas<I>(schemas: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = RecordSchema>,
    {
        let mut registry = Self::new();
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Parse a registry from the JSON schema file format.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let file: SchemaFile = serde_json::from_str(json)
            .map_err(|e| InvexError::Config(format!("invalid schema file: {}", e)))?;
        Ok(Self::from_schemas(file.schemas)?)
    }

    /// Load a registry from a JSON schema file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to the JSON schema file format.
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        let file = SchemaFile {
            schemas: self.schemas.clone(),
        };
        serde_json::to_string_pretty(&file)
            .map_err(|e| InvexError::Config(format!("cannot serialize schemas: {}", e)))
    }
}
