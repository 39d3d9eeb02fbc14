use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::SchemaOrRef;

/// Content type of a whole JSON document.
pub const JSON: &str = "application/json";

/// Content type of newline-delimited JSON, one item per line.
pub const JSON_LINES: &str = "application/jsonl";

/// A named example attached to a media type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    pub value: serde_json::Value,
}

/// A media type object: the schema of a payload plus optional examples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, Example>,
}
