//! The remote schema mutation API.

use vorm_schema::SchemaField;

use crate::error::MigrateResult;
use crate::operation::IndexParams;

/// Schema calls a vector store must support for migrations to run.
///
/// Calls are blocking and are not retried.
pub trait SchemaClient {
    /// Check whether a collection exists.
    fn collection_exists(&self, collection: &str) -> MigrateResult<bool>;

    /// Create a collection with exactly these fields.
    fn create_collection(&mut self, collection: &str, fields: &[SchemaField]) -> MigrateResult<()>;

    /// Add fields to an existing collection.
    fn alter_collection_add_fields(
        &mut self,
        collection: &str,
        fields: &[SchemaField],
    ) -> MigrateResult<()>;

    /// Drop fields from an existing collection.
    fn alter_collection_drop_fields(
        &mut self,
        collection: &str,
        fields: &[String],
    ) -> MigrateResult<()>;

    /// Build the default index on a vector field.
    fn create_default_index(
        &mut self,
        collection: &str,
        field: &str,
        params: &IndexParams,
    ) -> MigrateResult<()>;

    /// Drop a collection.
    fn drop_collection(&mut self, collection: &str) -> MigrateResult<()>;
}
