//! # vorm-schema
//!
//! Entity declarations and schema snapshots for the vorm vector ORM.
//!
//! This crate provides:
//! - A declaration language parser for `.vorm` files
//! - A builder API and the [`Entity`] trait for declaring entities in Rust
//! - [`SchemaField`] and [`Schema`], the normalized collection layout
//! - [`EntityRegistry`] and [`Introspector`], which resolve inheritance and
//!   build candidate schemas
//!
//! ## Example
//!
//! ```rust,ignore
//! use vorm_schema::{EntityRegistry, Introspector, parse_entities};
//!
//! let mut registry = EntityRegistry::new();
//! for entity in parse_entities(r#"
//!     entity Rule {
//!         @@collection("rules")
//!         id   String(100) @primary
//!         type String(50)
//!     }
//! "#)? {
//!     registry.register(entity)?;
//! }
//!
//! let schema = Introspector::new(&registry).schema_for("Rule")?;
//! assert_eq!(schema.collection_name, "rules");
//! ```

pub mod ast;
pub mod entity;
pub mod error;
pub mod field;
pub mod introspect;
pub mod parser;
pub mod registry;
pub mod schema;

pub use ast::*;
pub use entity::{Entity, entity_name, stable_name};
pub use error::{SchemaError, SchemaResult};
pub use field::{DEFAULT_DIM, DEFAULT_MAX_LENGTH, DataType, SchemaField, parse_size};
pub use introspect::Introspector;
pub use parser::{parse_entities, parse_entity_file};
pub use registry::EntityRegistry;
pub use schema::Schema;
