use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ExtractError};

use super::catalog::{TypeCatalog, TypeDef, TypeKind};
use super::metadata::{MetadataTable, WebMethod, WebMethodDecl};
use super::types::TypeExpr;

/// How an argument is passed to an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Positional-only; simple types travel in the path.
    Positional,
    #[default]
    Named,
    /// The implicit receiver; never exposed.
    Receiver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub kind: ParamKind,
}

impl ParamDecl {
    pub fn new(name: &str, ty: TypeExpr, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            ty,
            kind,
        }
    }
}

/// One callable declared by an endpoint group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub returns: TypeExpr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// A named set of related operations, optionally composed from other groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupDecl {
    pub doc: Option<String>,
    pub extends: Vec<String>,
    pub operations: Vec<OperationDecl>,
    /// Out-of-band notifications the group may emit, keyed by event name.
    pub events: IndexMap<String, TypeExpr>,
    /// Metadata side table keyed by function name.
    pub metadata: IndexMap<String, WebMethodDecl>,
}

impl GroupDecl {
    pub fn operation(&self, name: &str) -> Option<&OperationDecl> {
        self.operations.iter().find(|op| op.name == name)
    }
}

/// The operation declaration table: endpoint groups plus the type catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiDeclaration {
    pub groups: IndexMap<String, GroupDecl>,
    pub types: TypeCatalog,
}

impl ApiDeclaration {
    pub fn group(&self, name: &str) -> Result<&GroupDecl, ExtractError> {
        self.groups
            .get(name)
            .ok_or_else(|| ExtractError::UnknownGroup(name.to_string()))
    }

    pub fn type_def(&self, name: &str) -> Result<&TypeDef, ExtractError> {
        self.types
            .get(name)
            .ok_or_else(|| ExtractError::UnknownType(name.to_string()))
    }

    /// The group followed by everything it composes, depth-first, each group once.
    pub fn linearize(&self, name: &str) -> Result<Vec<&str>, ExtractError> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        self.visit(name, &mut order, &mut seen)?;
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &str,
        order: &mut Vec<&'a str>,
        seen: &mut HashSet<&'a str>,
    ) -> Result<(), ExtractError> {
        let (key, group) = self
            .groups
            .get_key_value(name)
            .ok_or_else(|| ExtractError::UnknownGroup(name.to_string()))?;
        if !seen.insert(key.as_str()) {
            return Ok(());
        }
        order.push(key.as_str());
        for base in &group.extends {
            self.visit(base, order, seen)?;
        }
        Ok(())
    }

    /// Whether a value of this type can travel in a path segment or query string.
    pub fn is_simple(&self, ty: &TypeExpr) -> bool {
        match ty {
            TypeExpr::Primitive(p) => p.is_simple(),
            TypeExpr::Named(name) => self
                .types
                .get(name)
                .is_some_and(|def| def.kind == TypeKind::Enum),
            _ => false,
        }
    }

    /// Component name a named type is published under.
    pub fn schema_name(&self, ty: &TypeExpr) -> Option<String> {
        let name = ty.name()?;
        let def = self.types.get(name)?;
        Some(def.schema_id.clone().unwrap_or_else(|| name.to_string()))
    }

    /// Resolve every group's metadata into a side table keyed by (group, function).
    pub fn metadata_table(&self) -> Result<MetadataTable, ConfigError> {
        let mut table = MetadataTable::default();
        for (group_name, group) in &self.groups {
            for (function, decl) in &group.metadata {
                if group.operation(function).is_none() {
                    return Err(ConfigError::UnknownMetadataTarget {
                        group: group_name.clone(),
                        operation: function.clone(),
                    });
                }
                table.insert(group_name, function, WebMethod::resolve(function, decl)?);
            }
        }
        Ok(table)
    }
}
