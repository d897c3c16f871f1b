//! Schema snapshots of a single collection.

use serde::{Deserialize, Serialize};

use crate::field::SchemaField;

/// The field layout of one entity's collection at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Stable logical name of the owning entity.
    #[serde(rename = "name")]
    pub entity_name: String,
    /// Remote collection name.
    pub collection_name: String,
    /// Fields in declaration order.
    pub fields: Vec<SchemaField>,
    /// Whether this is the bookkeeping collection for applied migrations.
    #[serde(default)]
    pub is_migration_table: bool,
    /// Number of times this snapshot has been persisted.
    #[serde(default)]
    pub version: u64,
}

impl Schema {
    /// Create an unsaved snapshot (version 0).
    pub fn new(
        entity_name: impl Into<String>,
        collection_name: impl Into<String>,
        fields: Vec<SchemaField>,
    ) -> Self {
        Self {
            entity_name: entity_name.into(),
            collection_name: collection_name.into(),
            fields,
            is_migration_table: false,
            version: 0,
        }
    }

    /// An empty snapshot carrying only this schema's identity.
    pub fn empty_like(&self) -> Self {
        Self {
            entity_name: self.entity_name.clone(),
            collection_name: self.collection_name.clone(),
            fields: Vec::new(),
            is_migration_table: self.is_migration_table,
            version: 0,
        }
    }

    /// Mark this snapshot as the bookkeeping collection.
    pub fn with_migration_table(mut self, is_migration_table: bool) -> Self {
        self.is_migration_table = is_migration_table;
        self
    }

    /// Return a copy with a different version.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// The primary-key fields.
    pub fn primary_fields(&self) -> Vec<&SchemaField> {
        self.fields.iter().filter(|f| f.is_primary).collect()
    }

    /// Vector fields that need an index.
    pub fn vector_fields(&self) -> Vec<&SchemaField> {
        self.fields
            .iter()
            .filter(|f| f.data_type.is_vector())
            .collect()
    }
}
