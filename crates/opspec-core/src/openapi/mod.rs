pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod spec;

use crate::error::RenderError;
use spec::Document;

/// Render a document as JSON, either compact or indented.
pub fn to_json(document: &Document, pretty: bool) -> Result<String, RenderError> {
    let json = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    Ok(json)
}

/// Render a document as YAML.
pub fn to_yaml(document: &Document) -> Result<String, RenderError> {
    Ok(serde_yaml_ng::to_string(document)?)
}

/// Read back a previously rendered JSON document.
pub fn from_json(input: &str) -> Result<Document, RenderError> {
    Ok(serde_json::from_str(input)?)
}
