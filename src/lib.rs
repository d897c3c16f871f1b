//! # vorm
//!
//! Entity-driven schema migrations for vector database collections.
//!
//! vorm provides:
//! - A declaration language and builder API for entities
//! - Change detection against a persisted history of collection schemas
//! - Timestamped upgrade/downgrade artifacts applied in order through a
//!   schema client
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vorm::prelude::*;
//!
//! let mut manager = MigrationManager::new(MigrationConfig::new().schema_dir("./schema"));
//! manager.register(
//!     EntityDef::new("Rule")
//!         .collection("rules")
//!         .field(FieldDecl::new("id", DataType::String).max_length(100).primary())
//!         .field(FieldDecl::new("embedding", DataType::FloatVector).dim(1536)),
//! )?;
//!
//! let artifact = manager.generate_migration("initial")?;
//!
//! let mut catalog = LocalCatalog::open("./schema/catalog.json")?;
//! let mut ledger = FileLedger::new("./schema/applied.json");
//! manager.initialize_bookkeeping(&mut catalog, &mut ledger)?;
//! manager.run_pending_migrations(&mut catalog, &mut ledger)?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Entity declarations, introspection and schema snapshots.
pub mod schema {
    pub use vorm_schema::*;
}

/// Diffing, artifacts, history and migration application.
pub mod migrate {
    pub use vorm_migrate::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::migrate::{
        FileLedger, LocalCatalog, MemoryLedger, MigrationConfig, MigrationError, MigrationLedger,
        MigrationManager, SchemaClient,
    };
    pub use crate::schema::{
        DataType, Entity, EntityDef, EntityRegistry, FieldDecl, Introspector, Schema, SchemaField,
    };
}

// Re-export key types at the crate root
pub use migrate::{MigrationError, MigrationManager};
pub use schema::{Schema, SchemaError};
