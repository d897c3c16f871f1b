//! Abstract Syntax Tree (AST) types for entity declarations.
//!
//! The parser and the builder API both produce these types.

mod attribute;
mod entity;
mod field;
mod types;

pub use attribute::*;
pub use entity::*;
pub use field::*;
pub use types::*;
