//! Error types for the migration engine.

use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur during migration operations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Entity declaration or introspection error.
    #[error("Schema error: {0}")]
    Schema(#[from] vorm_schema::SchemaError),

    /// Invalid configuration (missing search path, bad directory).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote store rejected a schema call.
    #[error("Schema client error: {0}")]
    Client(String),

    /// Invalid migration file or format.
    #[error("Invalid migration: {0}")]
    InvalidMigration(String),

    /// Migration checksum mismatch.
    #[error("Checksum mismatch for migration '{id}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Migration ID.
        id: String,
        /// Checksum recorded when the migration was applied.
        expected: String,
        /// Checksum of the artifact on disk.
        actual: String,
    },

    /// A pending migration sorts before one that is already applied.
    #[error("Migration '{id}' is older than the last applied migration '{last_applied}'")]
    OutOfOrder {
        /// Pending migration ID.
        id: String,
        /// Most recent applied migration ID.
        last_applied: String,
    },

    /// An entity's collection name differs from its last known schema.
    #[error(
        "Entity '{entity}' moved from collection '{from}' to '{to}'; restore the old collection name or rename the entity"
    )]
    CollectionChanged {
        /// Stable entity name.
        entity: String,
        /// Collection in the last known schema.
        from: String,
        /// Collection the entity now declares.
        to: String,
    },

    /// Migration not found.
    #[error("Migration '{0}' not found")]
    NotFound(String),

    /// The bookkeeping collection has not been created.
    #[error("Migration history collection '{0}' not found; run `vorm migrate init` first")]
    NotInitialized(String),

    /// No changes to migrate.
    #[error("No schema changes detected")]
    NoChanges,

    /// Rollback not possible.
    #[error("Cannot rollback: {0}")]
    RollbackFailed(String),

    /// Applying a migration failed. Earlier migrations stay applied.
    #[error("Migration '{id}' failed after {} applied: {source}", .applied.len())]
    ApplyFailed {
        /// The failing migration ID.
        id: String,
        /// Migrations applied in this run before the failure.
        applied: Vec<String>,
        /// The underlying failure.
        #[source]
        source: Box<MigrationError>,
    },

    /// General migration error.
    #[error("Migration error: {0}")]
    Other(String),
}

impl MigrationError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a schema client error.
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    /// Create a migration file error.
    pub fn migration_file(msg: impl Into<String>) -> Self {
        Self::InvalidMigration(msg.into())
    }

    /// Create an other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Wrap a failure while applying `id`.
    pub fn apply_failed(id: impl Into<String>, applied: Vec<String>, source: MigrationError) -> Self {
        Self::ApplyFailed {
            id: id.into(),
            applied,
            source: Box::new(source),
        }
    }

    /// Check if this is a recoverable error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoChanges)
    }
}
