//! # vorm-migrate
//!
//! Migration engine for the vorm vector ORM.
//!
//! This crate provides:
//! - Schema diffing between entity declarations and the last known schema
//! - Generation of structured upgrade/downgrade procedures
//! - Timestamped, checksummed migration artifacts
//! - Schema history snapshots that can be rebuilt by replaying artifacts
//! - A bookkeeping ledger of applied migrations
//! - Ordered application through a [`SchemaClient`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use vorm_migrate::{FileLedger, LocalCatalog, MigrationConfig, MigrationManager};
//!
//! let manager = MigrationManager::new(
//!     MigrationConfig::new()
//!         .schema_dir("./schema")
//!         .models_dir("./models"),
//! );
//!
//! // Write an artifact for everything that changed
//! let artifact = manager.generate_migration("add_rule_priority")?;
//!
//! // Apply pending artifacts
//! let mut catalog = LocalCatalog::open("./schema/catalog.json")?;
//! let mut ledger = FileLedger::new("./schema/applied.json");
//! manager.initialize_bookkeeping(&mut catalog, &mut ledger)?;
//! let result = manager.run_pending_migrations(&mut catalog, &mut ledger)?;
//! println!("{}", result.summary());
//! ```

pub mod apply;
pub mod catalog;
pub mod client;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod file;
pub mod generator;
pub mod history;
pub mod ledger;
pub mod manager;
pub mod operation;

pub use apply::{apply_operation, apply_operations};
pub use catalog::{CollectionState, IndexRecord, LocalCatalog};
pub use client::SchemaClient;
pub use diff::{ChangeSet, FieldChange, diff};
pub use discovery::discover_entities;
pub use error::{MigrateResult, MigrationError};
pub use file::{MigrationArtifact, MigrationFileManager, compute_checksum, sanitize_name};
pub use generator::{MigrationOps, generate, generate_all};
pub use history::{SchemaHistory, replay};
pub use ledger::{
    FileLedger, MIGRATION_HISTORY_COLLECTION, MemoryLedger, MigrationLedger, MigrationRecord,
    migration_history_entity,
};
pub use manager::{MigrationConfig, MigrationManager, MigrationResult, MigrationStatus};
pub use operation::{IndexParams, Operation};
