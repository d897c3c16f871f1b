//! A local stand-in for the remote store's schema catalog.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use vorm_schema::SchemaField;

use crate::client::SchemaClient;
use crate::error::{MigrateResult, MigrationError};
use crate::operation::IndexParams;

/// An index built on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Indexed field.
    pub field: String,
    /// Index parameters.
    pub params: IndexParams,
}

/// The layout of one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionState {
    /// Fields in creation order.
    pub fields: Vec<SchemaField>,
    /// Indexes.
    #[serde(default)]
    pub indexes: Vec<IndexRecord>,
}

impl CollectionState {
    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogState {
    collections: BTreeMap<String, CollectionState>,
}

/// A [`SchemaClient`] that keeps collection layouts in memory, optionally
/// persisted to a JSON file after every mutation.
///
/// Calls are validated the way the remote store validates them.
#[derive(Debug, Default)]
pub struct LocalCatalog {
    path: Option<PathBuf>,
    state: CatalogState,
}

impl LocalCatalog {
    /// Create an empty catalog that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed catalog, starting empty when the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> MigrateResult<Self> {
        let path = path.into();
        let state = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| {
                MigrationError::config(format!("invalid catalog {}: {}", path.display(), e))
            })?
        } else {
            CatalogState::default()
        };
        Ok(Self {
            path: Some(path),
            state,
        })
    }

    /// Get the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get a collection's layout.
    pub fn collection(&self, name: &str) -> Option<&CollectionState> {
        self.state.collections.get(name)
    }

    /// Names of all collections, sorted.
    pub fn collection_names(&self) -> Vec<&str> {
        self.state.collections.keys().map(String::as_str).collect()
    }

    fn existing_mut(&mut self, name: &str) -> MigrateResult<&mut CollectionState> {
        self.state
            .collections
            .get_mut(name)
            .ok_or_else(|| MigrationError::client(format!("collection `{}` does not exist", name)))
    }

    fn persist(&self) -> MigrateResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.state)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn check_unique(collection: &str, fields: &[SchemaField]) -> MigrateResult<()> {
    for (i, field) in fields.iter().enumerate() {
        if fields[..i].iter().any(|f| f.name == field.name) {
            return Err(MigrationError::client(format!(
                "duplicate field `{}` in collection `{}`",
                field.name, collection
            )));
        }
    }
    Ok(())
}

impl SchemaClient for LocalCatalog {
    fn collection_exists(&self, collection: &str) -> MigrateResult<bool> {
        Ok(self.state.collections.contains_key(collection))
    }

    fn create_collection(&mut self, collection: &str, fields: &[SchemaField]) -> MigrateResult<()> {
        if self.state.collections.contains_key(collection) {
            return Err(MigrationError::client(format!(
                "collection `{}` already exists",
                collection
            )));
        }
        check_unique(collection, fields)?;

        self.state.collections.insert(
            collection.to_string(),
            CollectionState {
                fields: fields.iter().map(SchemaField::normalized).collect(),
                indexes: Vec::new(),
            },
        );
        debug!(collection, fields = fields.len(), "created collection");
        self.persist()
    }

    fn alter_collection_add_fields(
        &mut self,
        collection: &str,
        fields: &[SchemaField],
    ) -> MigrateResult<()> {
        check_unique(collection, fields)?;
        let state = self.existing_mut(collection)?;
        if let Some(field) = fields.iter().find(|f| state.get_field(&f.name).is_some()) {
            return Err(MigrationError::client(format!(
                "field `{}` already exists in collection `{}`",
                field.name, collection
            )));
        }
        if fields.iter().any(|f| f.is_primary) {
            return Err(MigrationError::client(format!(
                "cannot add a primary key to existing collection `{}`",
                collection
            )));
        }

        state.fields.extend(fields.iter().map(SchemaField::normalized));
        debug!(collection, added = fields.len(), "added fields");
        self.persist()
    }

    fn alter_collection_drop_fields(
        &mut self,
        collection: &str,
        fields: &[String],
    ) -> MigrateResult<()> {
        let state = self.existing_mut(collection)?;
        for name in fields {
            match state.get_field(name) {
                None => {
                    return Err(MigrationError::client(format!(
                        "field `{}` does not exist in collection `{}`",
                        name, collection
                    )));
                }
                Some(field) if field.is_primary => {
                    return Err(MigrationError::client(format!(
                        "cannot drop primary key `{}` of collection `{}`",
                        name, collection
                    )));
                }
                Some(_) => {}
            }
        }

        state.fields.retain(|f| !fields.contains(&f.name));
        state.indexes.retain(|i| !fields.contains(&i.field));
        debug!(collection, dropped = fields.len(), "dropped fields");
        self.persist()
    }

    fn create_default_index(
        &mut self,
        collection: &str,
        field: &str,
        params: &IndexParams,
    ) -> MigrateResult<()> {
        let state = self.existing_mut(collection)?;
        let target = state.get_field(field).ok_or_else(|| {
            MigrationError::client(format!(
                "field `{}` does not exist in collection `{}`",
                field, collection
            ))
        })?;
        if !target.data_type.is_vector() {
            return Err(MigrationError::client(format!(
                "field `{}.{}` is not a vector field",
                collection, field
            )));
        }

        state.indexes.retain(|i| i.field != field);
        state.indexes.push(IndexRecord {
            field: field.to_string(),
            params: params.clone(),
        });
        debug!(collection, field, "created index");
        self.persist()
    }

    fn drop_collection(&mut self, collection: &str) -> MigrateResult<()> {
        if self.state.collections.remove(collection).is_none() {
            return Err(MigrationError::client(format!(
                "collection `{}` does not exist",
                collection
            )));
        }
        debug!(collection, "dropped collection");
        self.persist()
    }
}
