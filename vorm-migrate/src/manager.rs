//! The migration manager: discovery, change detection, generation and application.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};
use vorm_schema::{EntityDef, EntityRegistry, Introspector, Schema};

use crate::apply::apply_operations;
use crate::client::SchemaClient;
use crate::diff::{ChangeSet, diff};
use crate::discovery;
use crate::error::{MigrateResult, MigrationError};
use crate::file::{MigrationArtifact, MigrationFileManager};
use crate::generator::generate_all;
use crate::history::{SchemaHistory, replay};
use crate::ledger::{MIGRATION_HISTORY_COLLECTION, MigrationLedger, MigrationRecord, migration_history_entity};

/// Configuration for the migration manager.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Root of the durable schema state.
    pub schema_dir: PathBuf,
    /// Directory searched for `.vorm` declaration files.
    pub models_dir: PathBuf,
    /// Directory of schema snapshots.
    pub history_dir: PathBuf,
    /// Directory of migration artifacts.
    pub migrations_dir: PathBuf,
    /// Whether an applied artifact whose content changed stops a run.
    pub fail_on_checksum_mismatch: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("./schema"),
            models_dir: PathBuf::from("./models"),
            history_dir: PathBuf::from("./schema/history"),
            migrations_dir: PathBuf::from("./schema/migrations"),
            fail_on_checksum_mismatch: true,
        }
    }
}

impl MigrationConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the schema directory. History and migrations move under it.
    pub fn schema_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schema_dir = dir.into();
        self.history_dir = self.schema_dir.join("history");
        self.migrations_dir = self.schema_dir.join("migrations");
        self
    }

    /// Set the declaration search path.
    pub fn models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }

    /// Set the history directory.
    pub fn history_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.history_dir = dir.into();
        self
    }

    /// Set the migrations directory.
    pub fn migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    /// Set whether to fail on checksum mismatches.
    pub fn fail_on_checksum_mismatch(mut self, fail: bool) -> Self {
        self.fail_on_checksum_mismatch = fail;
        self
    }
}

/// Result of a migration run.
#[derive(Debug, Default)]
pub struct MigrationResult {
    /// IDs of applied migrations, in order.
    pub applied_migrations: Vec<String>,
    /// Total duration in milliseconds.
    pub duration_ms: i64,
    /// Warnings generated during the run.
    pub warnings: Vec<String>,
}

impl MigrationResult {
    /// Number of migrations applied.
    pub fn applied_count(&self) -> usize {
        self.applied_migrations.len()
    }

    /// Check if any migrations were applied.
    pub fn has_changes(&self) -> bool {
        !self.applied_migrations.is_empty()
    }

    /// Get a summary of the result.
    pub fn summary(&self) -> String {
        if self.applied_migrations.is_empty() {
            "No migrations applied".to_string()
        } else {
            format!("{} applied in {}ms", self.applied_count(), self.duration_ms)
        }
    }
}

/// Applied and pending migrations.
#[derive(Debug)]
pub struct MigrationStatus {
    /// Ledger records, in ID order.
    pub applied: Vec<MigrationRecord>,
    /// Artifacts not yet applied, in ID order.
    pub pending: Vec<MigrationArtifact>,
    /// Applied IDs whose artifact file is missing.
    pub missing: Vec<String>,
}

impl MigrationStatus {
    /// Get a summary of the status.
    pub fn summary(&self) -> String {
        format!(
            "{} applied, {} pending",
            self.applied.len(),
            self.pending.len()
        )
    }
}

/// Drives change detection and migration against one schema directory.
pub struct MigrationManager {
    config: MigrationConfig,
    history: SchemaHistory,
    files: MigrationFileManager,
    entities: EntityRegistry,
}

impl MigrationManager {
    /// Create a new manager.
    pub fn new(config: MigrationConfig) -> Self {
        let history = SchemaHistory::new(&config.history_dir);
        let files = MigrationFileManager::new(&config.migrations_dir);
        Self {
            config,
            history,
            files,
            entities: EntityRegistry::new(),
        }
    }

    /// Register an entity declared in code. Code entities take precedence
    /// over declaration files with the same name.
    pub fn register(&mut self, entity: EntityDef) -> MigrateResult<()> {
        self.entities.register(entity)?;
        Ok(())
    }

    /// Get the configuration.
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Get the schema history store.
    pub fn history(&self) -> &SchemaHistory {
        &self.history
    }

    /// Get the artifact file manager.
    pub fn files(&self) -> &MigrationFileManager {
        &self.files
    }

    /// Collect every entity for this run: code entities plus the search path.
    pub fn discover_entities(&self) -> MigrateResult<EntityRegistry> {
        let mut registry = self.entities.clone();

        if !self.config.models_dir.exists() && !registry.is_empty() {
            debug!(
                path = %self.config.models_dir.display(),
                "search path missing, using code entities only"
            );
            return Ok(registry);
        }

        let discovered = discovery::discover_entities(&self.config.models_dir)?;
        for name in registry.merge(discovered.iter().cloned()) {
            warn!(entity = %name, "declaration file entity shadowed by code entity");
        }
        info!(entities = registry.len(), "discovered entities");
        Ok(registry)
    }

    /// Candidate schemas of every concrete entity.
    pub fn candidate_schemas(&self) -> MigrateResult<Vec<Schema>> {
        let registry = self.discover_entities()?;
        Ok(Introspector::new(&registry).schemas()?)
    }

    /// Diff every entity against its last known schema.
    ///
    /// Only entities with changes are returned, keyed by entity name. When
    /// `save` is true the candidate schemas of changed entities are persisted.
    pub fn detect_changes(&self, save: bool) -> MigrateResult<BTreeMap<String, ChangeSet>> {
        let mut changes = BTreeMap::new();
        for (schema, change) in self.changed_schemas()? {
            if save {
                self.history.save_schema(&schema)?;
            }
            changes.insert(schema.entity_name.clone(), change);
        }
        Ok(changes)
    }

    /// Write one artifact covering every changed entity and update history.
    ///
    /// Returns [`MigrationError::NoChanges`] when nothing changed; no file is
    /// written in that case.
    pub fn generate_migration(&self, name: &str) -> MigrateResult<MigrationArtifact> {
        let changed = self.changed_schemas()?;
        if changed.is_empty() {
            return Err(MigrationError::NoChanges);
        }

        for (_, change) in &changed {
            if change.modifies_primary() {
                warn!(
                    entity = %change.entity_name,
                    collection = %change.collection_name,
                    "migration drops and re-adds the primary field; stores that reject primary key changes will fail to apply it"
                );
            }
        }

        let ops = generate_all(changed.iter().map(|(_, change)| change));
        let entities = changed
            .iter()
            .map(|(schema, _)| schema.entity_name.clone())
            .collect();
        let artifact = self.files.write_migration(name, entities, ops, Utc::now())?;

        for (schema, change) in &changed {
            let saved = self.history.save_schema(schema)?;
            debug!(
                entity = %saved.entity_name,
                version = saved.version,
                changes = %change.summary(),
                "updated schema history"
            );
        }

        info!(id = %artifact.id, entities = changed.len(), "generated migration");
        Ok(artifact)
    }

    /// Artifacts not recorded in the ledger, in ID order.
    pub fn pending_migrations(
        &self,
        ledger: &dyn MigrationLedger,
    ) -> MigrateResult<Vec<MigrationArtifact>> {
        Ok(self.status(ledger)?.pending)
    }

    /// Applied and pending migrations.
    pub fn status(&self, ledger: &dyn MigrationLedger) -> MigrateResult<MigrationStatus> {
        let artifacts = self.files.list_migrations()?;
        let applied = ledger.applied()?;

        let applied_ids: HashSet<&str> = applied.iter().map(|r| r.id.as_str()).collect();
        let artifact_ids: HashSet<&str> = artifacts.iter().map(|a| a.id.as_str()).collect();

        let missing = applied
            .iter()
            .filter(|r| !artifact_ids.contains(r.id.as_str()))
            .map(|r| r.id.clone())
            .collect();
        let pending = artifacts
            .iter()
            .filter(|a| !applied_ids.contains(a.id.as_str()))
            .cloned()
            .collect();

        Ok(MigrationStatus {
            applied,
            pending,
            missing,
        })
    }

    /// Apply every pending artifact in ascending ID order.
    ///
    /// Stops at the first failure without rolling back; the error carries the
    /// failing ID and the IDs applied before it.
    pub fn run_pending_migrations(
        &self,
        client: &mut dyn SchemaClient,
        ledger: &mut dyn MigrationLedger,
    ) -> MigrateResult<MigrationResult> {
        if !client.collection_exists(MIGRATION_HISTORY_COLLECTION)? {
            return Err(MigrationError::NotInitialized(
                MIGRATION_HISTORY_COLLECTION.to_string(),
            ));
        }

        let start = Instant::now();
        let mut result = MigrationResult::default();

        let artifacts = self.files.list_migrations()?;
        let applied = ledger.applied()?;
        result.warnings = self.check_applied(&artifacts, &applied)?;

        let applied_ids: HashSet<&str> = applied.iter().map(|r| r.id.as_str()).collect();
        let pending: Vec<&MigrationArtifact> = artifacts
            .iter()
            .filter(|a| !applied_ids.contains(a.id.as_str()))
            .collect();

        if let Some(last) = applied.last() {
            if let Some(early) = pending.iter().find(|a| a.id < last.id) {
                return Err(MigrationError::OutOfOrder {
                    id: early.id.clone(),
                    last_applied: last.id.clone(),
                });
            }
        }

        for artifact in pending {
            let started = Instant::now();
            info!(id = %artifact.id, "applying migration");

            let outcome = apply_operations(client, &artifact.upgrade).and_then(|()| {
                ledger.record_applied(MigrationRecord {
                    id: artifact.id.clone(),
                    name: artifact.name.clone(),
                    checksum: artifact.checksum(),
                    applied_at: Utc::now(),
                    duration_ms: started.elapsed().as_millis() as i64,
                })
            });
            if let Err(e) = outcome {
                return Err(MigrationError::apply_failed(
                    artifact.id.clone(),
                    result.applied_migrations,
                    e,
                ));
            }

            result.applied_migrations.push(artifact.id.clone());
        }

        result.duration_ms = start.elapsed().as_millis() as i64;
        info!(summary = %result.summary(), "migration run finished");
        Ok(result)
    }

    /// Execute the downgrade of the most recently applied artifact and remove
    /// its ledger record. Schema history is not touched.
    pub fn rollback_last(
        &self,
        client: &mut dyn SchemaClient,
        ledger: &mut dyn MigrationLedger,
    ) -> MigrateResult<MigrationArtifact> {
        let last = ledger
            .last_applied()?
            .ok_or_else(|| MigrationError::RollbackFailed("no applied migrations".to_string()))?;

        let artifact = self
            .files
            .list_migrations()?
            .into_iter()
            .find(|a| a.id == last.id)
            .ok_or_else(|| {
                MigrationError::RollbackFailed(format!("artifact for '{}' not found", last.id))
            })?;

        let actual = artifact.checksum();
        if actual != last.checksum && self.config.fail_on_checksum_mismatch {
            return Err(MigrationError::ChecksumMismatch {
                id: last.id,
                expected: last.checksum,
                actual,
            });
        }

        info!(id = %artifact.id, "rolling back migration");
        apply_operations(client, &artifact.downgrade)
            .map_err(|e| MigrationError::RollbackFailed(format!("{}: {}", artifact.id, e)))?;
        ledger.record_rollback(&artifact.id)?;

        Ok(artifact)
    }

    /// Create the bookkeeping collection if needed and prepare the ledger.
    ///
    /// Returns true when the collection was created.
    pub fn initialize_bookkeeping(
        &self,
        client: &mut dyn SchemaClient,
        ledger: &mut dyn MigrationLedger,
    ) -> MigrateResult<bool> {
        let mut registry = EntityRegistry::new();
        registry.register(migration_history_entity())?;
        let schema = Introspector::new(&registry).schema_for("MigrationHistory")?;

        let created = if client.collection_exists(&schema.collection_name)? {
            debug!(collection = %schema.collection_name, "bookkeeping collection exists");
            false
        } else {
            client.create_collection(&schema.collection_name, &schema.fields)?;
            info!(collection = %schema.collection_name, "created bookkeeping collection");
            true
        };

        ledger.initialize()?;
        Ok(created)
    }

    /// Rebuild every entity's snapshot by replaying all artifacts.
    ///
    /// Entities no artifact has touched lose their snapshot, so the next
    /// generation treats them as new.
    pub fn rebuild_history(&self) -> MigrateResult<Vec<Schema>> {
        let artifacts = self.files.list_migrations()?;
        let mut rebuilt = Vec::new();

        for candidate in self.candidate_schemas()? {
            if let Some(last) = self.history.get_last_known_schema(&candidate.entity_name)? {
                check_collection(&last, &candidate)?;
            }
            let schema = replay(&candidate, &artifacts);
            if schema.version == 0 {
                self.history.remove_schema(&candidate.entity_name)?;
                continue;
            }
            self.history.restore_schema(&schema)?;
            rebuilt.push(schema);
        }

        Ok(rebuilt)
    }

    fn changed_schemas(&self) -> MigrateResult<Vec<(Schema, ChangeSet)>> {
        let mut schemas = self.candidate_schemas()?;
        schemas.sort_by(|a, b| a.entity_name.cmp(&b.entity_name));

        let mut changed = Vec::new();
        for schema in schemas {
            let last = self.history.get_last_known_schema(&schema.entity_name)?;
            if let Some(last) = &last {
                check_collection(last, &schema)?;
            }
            let change = diff(last.as_ref(), &schema);
            if change.is_empty() {
                debug!(entity = %schema.entity_name, "no changes");
                continue;
            }
            changed.push((schema, change));
        }
        Ok(changed)
    }

    fn check_applied(
        &self,
        artifacts: &[MigrationArtifact],
        applied: &[MigrationRecord],
    ) -> MigrateResult<Vec<String>> {
        let mut warnings = Vec::new();
        for record in applied {
            let Some(artifact) = artifacts.iter().find(|a| a.id == record.id) else {
                warn!(id = %record.id, "applied migration has no artifact");
                warnings.push(format!("Applied migration '{}' has no artifact", record.id));
                continue;
            };

            let actual = artifact.checksum();
            if actual == record.checksum {
                continue;
            }
            if self.config.fail_on_checksum_mismatch {
                return Err(MigrationError::ChecksumMismatch {
                    id: record.id.clone(),
                    expected: record.checksum.clone(),
                    actual,
                });
            }
            warn!(id = %record.id, "applied migration was modified");
            warnings.push(format!(
                "Migration '{}' has been modified since it was applied",
                record.id
            ));
        }
        Ok(warnings)
    }
}

/// Refuse a candidate whose collection differs from its last known schema.
fn check_collection(last: &Schema, candidate: &Schema) -> MigrateResult<()> {
    if last.collection_name == candidate.collection_name {
        return Ok(());
    }
    Err(MigrationError::CollectionChanged {
        entity: candidate.entity_name.clone(),
        from: last.collection_name.clone(),
        to: candidate.collection_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::catalog::LocalCatalog;
    use crate::ledger::MemoryLedger;
    use crate::operation::Operation;

    const RULE_V1: &str = r#"
        entity Rule {
            @@collection("rules")
            id          String @primary
            type        String(50)
            description String(1000)
        }
    "#;

    const RULE_V2: &str = r#"
        entity Rule {
            @@collection("rules")
            id          String @primary
            type        String(50)
            description String(1000)
            priority    Int64
        }
    "#;

    fn setup(dir: &Path, models: &str) -> MigrationManager {
        let models_dir = dir.join("models");
        std::fs::create_dir_all(&models_dir).unwrap();
        std::fs::write(models_dir.join("rule.vorm"), models).unwrap();
        MigrationManager::new(
            MigrationConfig::new()
                .schema_dir(dir.join("schema"))
                .models_dir(models_dir),
        )
    }

    fn write_models(manager: &MigrationManager, models: &str) {
        std::fs::write(manager.config().models_dir.join("rule.vorm"), models).unwrap();
    }

    fn initialized() -> (LocalCatalog, MemoryLedger) {
        (LocalCatalog::in_memory(), MemoryLedger::new())
    }

    #[test]
    fn test_config_builder() {
        let config = MigrationConfig::new()
            .schema_dir("state")
            .migrations_dir("elsewhere")
            .fail_on_checksum_mismatch(false);
        assert_eq!(config.history_dir, PathBuf::from("state/history"));
        assert_eq!(config.migrations_dir, PathBuf::from("elsewhere"));
        assert!(!config.fail_on_checksum_mismatch);
    }

    #[test]
    fn test_nothing_to_generate() {
        let dir = tempfile::tempdir().unwrap();
        let manager = setup(dir.path(), RULE_V1);

        manager.generate_migration("initial").unwrap();
        let err = manager.generate_migration("again").unwrap_err();
        assert!(matches!(err, MigrationError::NoChanges));
        assert!(err.is_recoverable());
        assert_eq!(manager.files().list_migrations().unwrap().len(), 1);
    }

    #[test]
    fn test_detect_changes_without_save_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let manager = setup(dir.path(), RULE_V1);

        assert_eq!(manager.detect_changes(false).unwrap().len(), 1);
        assert_eq!(manager.detect_changes(false).unwrap().len(), 1);
        assert_eq!(manager.detect_changes(true).unwrap().len(), 1);
        assert!(manager.detect_changes(false).unwrap().is_empty());
    }

    #[test]
    fn test_run_requires_bookkeeping() {
        let dir = tempfile::tempdir().unwrap();
        let manager = setup(dir.path(), RULE_V1);
        let (mut catalog, mut ledger) = initialized();

        let err = manager
            .run_pending_migrations(&mut catalog, &mut ledger)
            .unwrap_err();
        assert!(matches!(err, MigrationError::NotInitialized(_)));

        assert!(manager.initialize_bookkeeping(&mut catalog, &mut ledger).unwrap());
        assert!(!manager.initialize_bookkeeping(&mut catalog, &mut ledger).unwrap());
        assert!(catalog.collection_exists(MIGRATION_HISTORY_COLLECTION).unwrap());
    }

    #[test]
    fn test_run_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let manager = setup(dir.path(), RULE_V1);
        let (mut catalog, mut ledger) = initialized();
        manager.initialize_bookkeeping(&mut catalog, &mut ledger).unwrap();

        manager.generate_migration("initial").unwrap();
        write_models(&manager, RULE_V2);
        manager.generate_migration("add priority").unwrap();

        let first = manager.run_pending_migrations(&mut catalog, &mut ledger).unwrap();
        assert_eq!(first.applied_count(), 2);
        let second = manager.run_pending_migrations(&mut catalog, &mut ledger).unwrap();
        assert!(!second.has_changes());

        let rules = catalog.collection("rules").unwrap();
        assert!(rules.get_field("priority").is_some());
        assert!(manager.status(&ledger).unwrap().pending.is_empty());
    }

    #[test]
    fn test_out_of_order_artifact_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let manager = setup(dir.path(), RULE_V1);
        let (mut catalog, mut ledger) = initialized();
        manager.initialize_bookkeeping(&mut catalog, &mut ledger).unwrap();

        manager.generate_migration("initial").unwrap();
        manager.run_pending_migrations(&mut catalog, &mut ledger).unwrap();

        let late = MigrationArtifact {
            id: "20000101_000000_late".to_string(),
            name: "late".to_string(),
            created_at: Utc::now(),
            entities: vec![],
            upgrade: vec![Operation::DropCollection {
                collection: "rules".to_string(),
            }],
            downgrade: vec![],
            path: PathBuf::new(),
        };
        std::fs::write(
            manager.files().migrations_dir().join("20000101_000000_late.json"),
            serde_json::to_string(&late).unwrap(),
        )
        .unwrap();

        let err = manager
            .run_pending_migrations(&mut catalog, &mut ledger)
            .unwrap_err();
        assert!(matches!(err, MigrationError::OutOfOrder { ref id, .. } if id == "20000101_000000_late"));
        assert!(catalog.collection_exists("rules").unwrap());
    }

    #[test]
    fn test_checksum_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let manager = setup(dir.path(), RULE_V1);
        let (mut catalog, mut ledger) = initialized();
        manager.initialize_bookkeeping(&mut catalog, &mut ledger).unwrap();

        let mut artifact = manager.generate_migration("initial").unwrap();
        manager.run_pending_migrations(&mut catalog, &mut ledger).unwrap();

        artifact.downgrade.clear();
        std::fs::write(&artifact.path, serde_json::to_string(&artifact).unwrap()).unwrap();

        let err = manager
            .run_pending_migrations(&mut catalog, &mut ledger)
            .unwrap_err();
        assert!(matches!(err, MigrationError::ChecksumMismatch { .. }));

        let lenient = MigrationManager::new(manager.config().clone().fail_on_checksum_mismatch(false));
        let result = lenient.run_pending_migrations(&mut catalog, &mut ledger).unwrap();
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_rollback_last() {
        let dir = tempfile::tempdir().unwrap();
        let manager = setup(dir.path(), RULE_V1);
        let (mut catalog, mut ledger) = initialized();
        manager.initialize_bookkeeping(&mut catalog, &mut ledger).unwrap();

        manager.generate_migration("initial").unwrap();
        write_models(&manager, RULE_V2);
        let second = manager.generate_migration("add priority").unwrap();
        manager.run_pending_migrations(&mut catalog, &mut ledger).unwrap();

        let rolled_back = manager.rollback_last(&mut catalog, &mut ledger).unwrap();
        assert_eq!(rolled_back.id, second.id);
        assert!(catalog.collection("rules").unwrap().get_field("priority").is_none());
        assert_eq!(manager.status(&ledger).unwrap().pending.len(), 1);

        manager.rollback_last(&mut catalog, &mut ledger).unwrap();
        assert!(!catalog.collection_exists("rules").unwrap());
        assert!(matches!(
            manager.rollback_last(&mut catalog, &mut ledger),
            Err(MigrationError::RollbackFailed(_))
        ));
    }

    #[test]
    fn test_rebuild_history() {
        let dir = tempfile::tempdir().unwrap();
        let manager = setup(dir.path(), RULE_V1);
        manager.generate_migration("initial").unwrap();
        write_models(&manager, RULE_V2);
        manager.generate_migration("add priority").unwrap();

        let snapshot = manager.history().get_last_known_schema("Rule").unwrap().unwrap();
        std::fs::remove_dir_all(manager.history().history_dir()).unwrap();

        let rebuilt = manager.rebuild_history().unwrap();
        assert_eq!(rebuilt.len(), 1);
        assert_eq!(rebuilt[0].version, snapshot.version);
        assert!(diff(Some(&rebuilt[0]), &snapshot).is_empty());
        assert!(manager.detect_changes(false).unwrap().is_empty());
    }

    #[test]
    fn test_collection_change_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let manager = setup(dir.path(), RULE_V1);
        manager.generate_migration("initial").unwrap();
        write_models(&manager, &RULE_V1.replace("\"rules\"", "\"rules_v2\""));

        let err = manager.detect_changes(false).unwrap_err();
        match err {
            MigrationError::CollectionChanged { entity, from, to } => {
                assert_eq!(entity, "Rule");
                assert_eq!(from, "rules");
                assert_eq!(to, "rules_v2");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            manager.generate_migration("rename"),
            Err(MigrationError::CollectionChanged { .. })
        ));
        assert_eq!(manager.files().list_migrations().unwrap().len(), 1);

        assert!(matches!(
            manager.rebuild_history(),
            Err(MigrationError::CollectionChanged { .. })
        ));
        let snapshot = manager.history().get_last_known_schema("Rule").unwrap().unwrap();
        assert_eq!(snapshot.collection_name, "rules");
        assert_eq!(snapshot.version, 1);
    }

    #[test]
    fn test_primary_modification_still_generates() {
        let dir = tempfile::tempdir().unwrap();
        let manager = setup(dir.path(), RULE_V1);
        manager.generate_migration("initial").unwrap();
        write_models(
            &manager,
            &RULE_V1.replace("id          String @primary", "id          String(200) @primary"),
        );

        let changes = manager.detect_changes(false).unwrap();
        assert!(changes["Rule"].modifies_primary());

        let artifact = manager.generate_migration("widen id").unwrap();
        assert_eq!(
            artifact.upgrade[0],
            Operation::DropFields {
                collection: "rules".to_string(),
                fields: vec!["id".to_string()],
            }
        );
    }

    #[test]
    fn test_code_entities() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = MigrationManager::new(
            MigrationConfig::new()
                .schema_dir(dir.path().join("schema"))
                .models_dir(dir.path().join("absent")),
        );
        assert!(matches!(
            manager.discover_entities(),
            Err(MigrationError::Config(_))
        ));

        manager.register(migration_history_entity()).unwrap();
        let registry = manager.discover_entities().unwrap();
        assert!(registry.contains("MigrationHistory"));
    }
}
