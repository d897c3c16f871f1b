//! The `Entity` trait for Rust types that map to a collection.

use crate::ast::EntityDef;

/// A Rust type whose persisted layout is described by an [`EntityDef`].
///
/// ```rust,ignore
/// use vorm_schema::{DataType, Entity, EntityDef, FieldDecl, entity_name};
///
/// struct Rule;
///
/// impl Entity for Rule {
///     fn definition() -> EntityDef {
///         EntityDef::new(entity_name::<Self>())
///             .collection("rules")
///             .field(FieldDecl::new("id", DataType::String).max_length(100).primary())
///     }
/// }
/// ```
pub trait Entity {
    /// The entity's declaration.
    fn definition() -> EntityDef;
}

/// The stable logical name of a Rust type.
pub fn entity_name<T: ?Sized>() -> &'static str {
    stable_name(std::any::type_name::<T>())
}

/// Strip module paths and generic arguments from a type name.
///
/// `app::models::Rule` and `Rule` both become `Rule`.
pub fn stable_name(raw: &str) -> &str {
    let base = raw.split('<').next().unwrap_or(raw);
    base.rsplit("::").next().unwrap_or(base).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rule;

    #[test]
    fn test_entity_name_strips_module_path() {
        assert_eq!(entity_name::<Rule>(), "Rule");
    }

    #[test]
    fn test_stable_name() {
        assert_eq!(stable_name("app::models::Rule"), "Rule");
        assert_eq!(stable_name("Rule"), "Rule");
        assert_eq!(stable_name("app::Versioned<app::Rule>"), "Versioned");
    }
}
