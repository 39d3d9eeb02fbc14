use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::openapi::schema::Schema;

use super::types::TypeExpr;

/// What kind of data a catalog type describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// A structure with named fields.
    #[default]
    Record,
    /// A closed set of string values.
    Enum,
    /// A type whose schema is spelled out explicitly.
    Custom,
}

/// A named type in the declaration catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDef {
    pub kind: TypeKind,

    /// Free-text documentation; `:param field:` entries describe record fields.
    pub doc: Option<String>,

    /// Overrides the component name the type is published under.
    pub schema_id: Option<String>,

    pub fields: IndexMap<String, TypeExpr>,

    pub values: Vec<String>,

    pub schema: Option<Schema>,
}

impl TypeDef {
    pub fn record(fields: impl IntoIterator<Item = (&'static str, TypeExpr)>) -> Self {
        Self {
            kind: TypeKind::Record,
            fields: fields
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect(),
            ..Self::default()
        }
    }

    pub fn enumeration(values: &[&str]) -> Self {
        Self {
            kind: TypeKind::Enum,
            values: values.iter().map(|v| v.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }
}

/// Named types keyed by their declared name.
pub type TypeCatalog = IndexMap<String, TypeDef>;
