use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::response::ResponseOrRef;
use super::schema::{Schema, SchemaOrRef};
use super::security::SecurityScheme;

/// Reusable definitions shared across operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(
        rename = "securitySchemes",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

impl Components {
    /// Components holding the given named schemas, inlined in order.
    pub fn from_schemas(schemas: IndexMap<String, Schema>) -> Self {
        Self {
            schemas: schemas
                .into_iter()
                .map(|(name, schema)| (name, SchemaOrRef::from(schema)))
                .collect(),
            ..Self::default()
        }
    }
}
