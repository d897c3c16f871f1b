//! Bookkeeping of applied migrations.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vorm_schema::{DataType, EntityDef, FieldDecl};

use crate::error::{MigrateResult, MigrationError};

/// Collection that records applied migrations.
pub const MIGRATION_HISTORY_COLLECTION: &str = "migration_history";

/// A record of an applied migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Migration ID.
    pub id: String,
    /// Migration name.
    pub name: String,
    /// Checksum of the artifact when it was applied.
    pub checksum: String,
    /// When the migration was applied.
    pub applied_at: DateTime<Utc>,
    /// Duration of the migration in milliseconds.
    pub duration_ms: i64,
}

/// Storage for applied-migration records.
pub trait MigrationLedger {
    /// Prepare the ledger for use.
    fn initialize(&mut self) -> MigrateResult<()>;

    /// Get all applied migrations, ordered by ID.
    fn applied(&self) -> MigrateResult<Vec<MigrationRecord>>;

    /// Check if a migration has been applied.
    fn is_applied(&self, id: &str) -> MigrateResult<bool> {
        Ok(self.applied()?.iter().any(|r| r.id == id))
    }

    /// Get the last applied migration.
    fn last_applied(&self) -> MigrateResult<Option<MigrationRecord>> {
        Ok(self.applied()?.pop())
    }

    /// Record a migration as applied.
    fn record_applied(&mut self, record: MigrationRecord) -> MigrateResult<()>;

    /// Remove the record of a rolled-back migration.
    fn record_rollback(&mut self, id: &str) -> MigrateResult<()>;
}

/// The built-in entity describing the bookkeeping collection.
pub fn migration_history_entity() -> EntityDef {
    EntityDef::new("MigrationHistory")
        .collection(MIGRATION_HISTORY_COLLECTION)
        .migration_table()
        .field(FieldDecl::new("id", DataType::String).max_length(100).primary())
        .field(FieldDecl::new("name", DataType::String).max_length(100))
        .field(FieldDecl::new("version", DataType::String).max_length(50))
        .field(FieldDecl::new("applied_at", DataType::String).max_length(50))
        .field(FieldDecl::new("metadata", DataType::Json))
}

fn insert_sorted(records: &mut Vec<MigrationRecord>, record: MigrationRecord) -> MigrateResult<()> {
    if records.iter().any(|r| r.id == record.id) {
        return Err(MigrationError::other(format!(
            "Migration '{}' is already recorded as applied",
            record.id
        )));
    }
    records.push(record);
    records.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(())
}

fn remove_record(records: &mut Vec<MigrationRecord>, id: &str) -> MigrateResult<()> {
    let before = records.len();
    records.retain(|r| r.id != id);
    if records.len() == before {
        return Err(MigrationError::NotFound(id.to_string()));
    }
    Ok(())
}

/// A ledger kept in memory.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: Vec<MigrationRecord>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MigrationLedger for MemoryLedger {
    fn initialize(&mut self) -> MigrateResult<()> {
        Ok(())
    }

    fn applied(&self) -> MigrateResult<Vec<MigrationRecord>> {
        Ok(self.records.clone())
    }

    fn record_applied(&mut self, record: MigrationRecord) -> MigrateResult<()> {
        insert_sorted(&mut self.records, record)
    }

    fn record_rollback(&mut self, id: &str) -> MigrateResult<()> {
        remove_record(&mut self.records, id)
    }
}

/// A ledger stored as a JSON array in one file.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    /// Create a ledger backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the ledger file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> MigrateResult<Vec<MigrationRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records: Vec<MigrationRecord> = serde_json::from_str(&content)?;
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    fn store(&self, records: &[MigrationRecord]) -> MigrateResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(records)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl MigrationLedger for FileLedger {
    fn initialize(&mut self) -> MigrateResult<()> {
        if !self.path.exists() {
            self.store(&[])?;
        }
        Ok(())
    }

    fn applied(&self) -> MigrateResult<Vec<MigrationRecord>> {
        self.load()
    }

    fn record_applied(&mut self, record: MigrationRecord) -> MigrateResult<()> {
        let mut records = self.load()?;
        insert_sorted(&mut records, record)?;
        self.store(&records)
    }

    fn record_rollback(&mut self, id: &str) -> MigrateResult<()> {
        let mut records = self.load()?;
        remove_record(&mut records, id)?;
        self.store(&records)
    }
}
