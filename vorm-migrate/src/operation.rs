//! Remote schema mutation operations carried by migration artifacts.

use std::fmt;

use serde::{Deserialize, Serialize};
use vorm_schema::SchemaField;

/// Index type used for vector fields.
pub const DEFAULT_INDEX_TYPE: &str = "IVF_FLAT";

/// Distance metric used for vector fields.
pub const DEFAULT_METRIC_TYPE: &str = "L2";

/// Number of clusters used for vector fields.
pub const DEFAULT_NLIST: u32 = 1024;

/// Parameters of a vector index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexParams {
    /// Index type.
    pub index_type: String,
    /// Distance metric.
    pub metric_type: String,
    /// Number of clusters.
    pub nlist: u32,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            index_type: DEFAULT_INDEX_TYPE.to_string(),
            metric_type: DEFAULT_METRIC_TYPE.to_string(),
            nlist: DEFAULT_NLIST,
        }
    }
}

/// One remote schema call, scoped to a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Create a collection with exactly these fields, unless it exists.
    CreateCollection {
        collection: String,
        fields: Vec<SchemaField>,
    },
    /// Build an index on a vector field.
    CreateIndex {
        collection: String,
        field: String,
        #[serde(default)]
        params: IndexParams,
    },
    /// Drop a collection.
    DropCollection { collection: String },
    /// Add fields to an existing collection.
    AddFields {
        collection: String,
        fields: Vec<SchemaField>,
    },
    /// Drop fields from an existing collection.
    DropFields {
        collection: String,
        fields: Vec<String>,
    },
}

impl Operation {
    /// The collection this operation targets.
    pub fn collection(&self) -> &str {
        match self {
            Self::CreateCollection { collection, .. }
            | Self::CreateIndex { collection, .. }
            | Self::DropCollection { collection }
            | Self::AddFields { collection, .. }
            | Self::DropFields { collection, .. } => collection,
        }
    }

    /// The operation tag as stored in artifacts.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateCollection { .. } => "create_collection",
            Self::CreateIndex { .. } => "create_index",
            Self::DropCollection { .. } => "drop_collection",
            Self::AddFields { .. } => "add_fields",
            Self::DropFields { .. } => "drop_fields",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateCollection { collection, fields } => {
                write!(f, "create collection {}", collection)?;
                for field in fields {
                    write!(f, "\n    {}", field)?;
                }
                Ok(())
            }
            Self::CreateIndex {
                collection,
                field,
                params,
            } => write!(
                f,
                "create index on {}.{} ({}, metric={}, nlist={})",
                collection, field, params.index_type, params.metric_type, params.nlist
            ),
            Self::DropCollection { collection } => write!(f, "drop collection {}", collection),
            Self::AddFields { collection, fields } => {
                let rendered: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
                write!(f, "add to {}: {}", collection, rendered.join(", "))
            }
            Self::DropFields { collection, fields } => {
                write!(f, "drop from {}: {}", collection, fields.join(", "))
            }
        }
    }
}
