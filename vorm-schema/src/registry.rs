//! Per-run registry of entity definitions.

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::ast::EntityDef;
use crate::entity::{Entity, entity_name};
use crate::error::{SchemaError, SchemaResult};

/// Entity definitions collected during one discovery run.
///
/// Definitions keep their registration order.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: IndexMap<SmolStr, EntityDef>,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. Names must be unique.
    pub fn register(&mut self, entity: EntityDef) -> SchemaResult<()> {
        if entity.name().is_empty() {
            return Err(SchemaError::invalid_entity("", "entity name is empty"));
        }
        if self.entities.contains_key(entity.name()) {
            return Err(SchemaError::duplicate("entity", entity.name()));
        }
        debug!(entity = entity.name(), "registered entity");
        self.entities.insert(entity.name.name.clone(), entity);
        Ok(())
    }

    /// Register a Rust type's definition.
    pub fn register_type<T: Entity>(&mut self) -> SchemaResult<()> {
        let mut entity = T::definition();
        if entity.name().is_empty() {
            entity.name.name = entity_name::<T>().into();
        }
        self.register(entity)
    }

    /// Add every definition from `other` whose name is not registered yet.
    ///
    /// Returns the names that were already present.
    pub fn merge(&mut self, other: impl IntoIterator<Item = EntityDef>) -> Vec<String> {
        let mut skipped = Vec::new();
        for entity in other {
            if self.entities.contains_key(entity.name()) {
                skipped.push(entity.name().to_string());
            } else {
                self.entities.insert(entity.name.name.clone(), entity);
            }
        }
        skipped
    }

    /// Get a definition by name.
    pub fn get(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    /// Check whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityDef> {
        self.entities.values()
    }

    /// Concrete (non-abstract) definitions in registration order.
    pub fn concrete(&self) -> impl Iterator<Item = &EntityDef> {
        self.entities.values().filter(|e| !e.is_abstract)
    }
}
