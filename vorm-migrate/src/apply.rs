//! Executing migration procedures against a schema client.

use tracing::{debug, info};

use crate::client::SchemaClient;
use crate::error::MigrateResult;
use crate::operation::Operation;

/// Execute one operation.
///
/// Collection creation is skipped when the collection already exists.
pub fn apply_operation(client: &mut dyn SchemaClient, op: &Operation) -> MigrateResult<()> {
    debug!(op = op.kind(), collection = op.collection(), "applying operation");
    match op {
        Operation::CreateCollection { collection, fields } => {
            if client.collection_exists(collection)? {
                info!(collection = %collection, "collection already exists, skipping creation");
                return Ok(());
            }
            client.create_collection(collection, fields)
        }
        Operation::CreateIndex {
            collection,
            field,
            params,
        } => client.create_default_index(collection, field, params),
        Operation::DropCollection { collection } => client.drop_collection(collection),
        Operation::AddFields { collection, fields } => {
            client.alter_collection_add_fields(collection, fields)
        }
        Operation::DropFields { collection, fields } => {
            client.alter_collection_drop_fields(collection, fields)
        }
    }
}

/// Execute a procedure in order, stopping at the first failure.
pub fn apply_operations(client: &mut dyn SchemaClient, ops: &[Operation]) -> MigrateResult<()> {
    for op in ops {
        apply_operation(client, op)?;
    }
    Ok(())
}
