use serde::{Deserialize, Serialize};

use super::schema::SchemaOrRef;

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
}

impl Parameter {
    /// A path parameter. Path parameters are always required.
    pub fn path(name: &str, schema: SchemaOrRef, description: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            location: ParameterLocation::Path,
            description,
            required: true,
            schema: Some(schema),
        }
    }

    pub fn query(
        name: &str,
        schema: SchemaOrRef,
        required: bool,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            location: ParameterLocation::Query,
            description,
            required,
            schema: Some(schema),
        }
    }
}
