//! Schema history: the last known schema of every entity.
//!
//! Each entity has one JSON snapshot under the history directory, keyed by
//! its stable name. Snapshots can always be rebuilt by replaying artifacts.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use vorm_schema::{Schema, SchemaField, stable_name};

use crate::error::MigrateResult;
use crate::file::{MigrationArtifact, MigrationFileManager};
use crate::operation::Operation;

/// On-disk form of a schema snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryRecord {
    name: String,
    collection_name: String,
    #[serde(default)]
    is_migration_table: bool,
    #[serde(default)]
    version: u64,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    fields: Vec<SchemaField>,
}

impl HistoryRecord {
    fn from_schema(schema: &Schema, updated_at: DateTime<Utc>) -> Self {
        Self {
            name: schema.entity_name.clone(),
            collection_name: schema.collection_name.clone(),
            is_migration_table: schema.is_migration_table,
            version: schema.version,
            updated_at: Some(updated_at),
            fields: schema.fields.clone(),
        }
    }

    fn into_schema(self) -> Schema {
        Schema::new(self.name, self.collection_name, self.fields)
            .with_migration_table(self.is_migration_table)
            .with_version(self.version)
    }
}

/// Reads and writes schema snapshots.
pub struct SchemaHistory {
    history_dir: PathBuf,
}

impl SchemaHistory {
    /// Create a history store rooted at `history_dir`.
    pub fn new(history_dir: impl Into<PathBuf>) -> Self {
        Self {
            history_dir: history_dir.into(),
        }
    }

    /// Get the history directory.
    pub fn history_dir(&self) -> &Path {
        &self.history_dir
    }

    /// Path of an entity's snapshot.
    pub fn path_for(&self, entity_name: &str) -> PathBuf {
        self.history_dir
            .join(format!("{}.json", stable_name(entity_name)))
    }

    /// The last persisted schema of an entity.
    ///
    /// Returns `None` when no snapshot exists. A corrupt snapshot is logged
    /// and also treated as absent.
    pub fn get_last_known_schema(&self, entity_name: &str) -> MigrateResult<Option<Schema>> {
        let path = self.path_for(entity_name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<HistoryRecord>(&content) {
            Ok(record) => Ok(Some(record.into_schema())),
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "schema history is corrupt; treating entity as having no prior schema"
                );
                Ok(None)
            }
        }
    }

    /// Persist a schema as the next version of its entity.
    ///
    /// Returns the snapshot as written.
    pub fn save_schema(&self, schema: &Schema) -> MigrateResult<Schema> {
        let previous = self
            .get_last_known_schema(&schema.entity_name)?
            .map(|s| s.version)
            .unwrap_or(0);

        let saved = schema.clone().with_version(previous + 1);
        self.write(&saved)?;
        debug!(entity = %saved.entity_name, version = saved.version, "saved schema");
        Ok(saved)
    }

    /// Write a snapshot verbatim, keeping its version.
    pub fn restore_schema(&self, schema: &Schema) -> MigrateResult<()> {
        self.write(schema)?;
        info!(entity = %schema.entity_name, version = schema.version, "restored schema");
        Ok(())
    }

    /// Delete an entity's snapshot if it exists.
    pub fn remove_schema(&self, entity_name: &str) -> MigrateResult<()> {
        match fs::remove_file(self.path_for(entity_name)) {
            Ok(()) => {
                info!(entity = entity_name, "removed schema history");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Rebuild an entity's schema by replaying every artifact.
    pub fn rebuild_schema_from_migrations(
        &self,
        identity: &Schema,
        files: &MigrationFileManager,
    ) -> MigrateResult<Schema> {
        let artifacts = files.list_migrations()?;
        Ok(replay(identity, &artifacts))
    }

    fn write(&self, schema: &Schema) -> MigrateResult<()> {
        fs::create_dir_all(&self.history_dir)?;

        let path = self.path_for(&schema.entity_name);
        let tmp = path.with_extension("json.tmp");
        let record = HistoryRecord::from_schema(schema, Utc::now());
        let mut json = serde_json::to_string_pretty(&record)?;
        json.push('\n');

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Reconstruct a schema from artifacts in ascending ID order.
///
/// Only the upgrade operations that target `identity`'s collection are
/// applied. The result's version is the number of artifacts that touched
/// the collection.
pub fn replay(identity: &Schema, artifacts: &[MigrationArtifact]) -> Schema {
    let collection = identity.collection_name.as_str();
    let mut schema = identity.empty_like();

    let mut ordered: Vec<&MigrationArtifact> = artifacts.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    for artifact in ordered {
        if !artifact.touches(collection) {
            continue;
        }
        for op in artifact.upgrade_for(collection) {
            apply_to_schema(&mut schema, op);
        }
        schema.version += 1;
    }

    schema
}

fn apply_to_schema(schema: &mut Schema, op: &Operation) {
    match op {
        Operation::CreateCollection { fields, .. } => {
            schema.fields = fields.iter().map(SchemaField::normalized).collect();
        }
        Operation::AddFields { fields, .. } => {
            for field in fields {
                let field = field.normalized();
                match schema.fields.iter_mut().find(|f| f.name == field.name) {
                    Some(existing) => *existing = field,
                    None => schema.fields.push(field),
                }
            }
        }
        Operation::DropFields { fields, .. } => {
            schema.fields.retain(|f| !fields.contains(&f.name));
        }
        Operation::DropCollection { .. } => schema.fields.clear(),
        Operation::CreateIndex { .. } => {}
    }
}
