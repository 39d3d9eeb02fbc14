pub mod catalog;
pub mod endpoint;
pub mod metadata;
pub mod types;

pub use catalog::{TypeCatalog, TypeDef, TypeKind};
pub use endpoint::{ApiDeclaration, GroupDecl, OperationDecl, ParamDecl, ParamKind};
pub use metadata::{MetadataTable, Sample, WebMethod, WebMethodDecl};
pub use types::{Primitive, TypeExpr};

use crate::error::ParseError;

/// Load a declaration table from YAML.
pub fn from_yaml(input: &str) -> Result<ApiDeclaration, ParseError> {
    Ok(serde_yaml_ng::from_str(input)?)
}

/// Load a declaration table from JSON.
pub fn from_json(input: &str) -> Result<ApiDeclaration, ParseError> {
    Ok(serde_json::from_str(input)?)
}
