use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A sample payload attached to an operation's request or response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Catalog type the sample is an instance of; used to pick the matching response.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    pub value: serde_json::Value,
}

impl Sample {
    pub fn new(value: serde_json::Value) -> Self {
        Self {
            type_name: None,
            summary: None,
            value,
        }
    }

    pub fn typed(type_name: &str, value: serde_json::Value) -> Self {
        Self {
            type_name: Some(type_name.to_string()),
            ..Self::new(value)
        }
    }

    /// Key under which the sample is listed in a media type's `examples`.
    pub fn key(&self) -> String {
        match &self.summary {
            Some(summary) => summary.clone(),
            None => self.value.to_string(),
        }
    }
}

/// Per-operation metadata as written in a declaration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebMethodDecl {
    pub route: Option<String>,
    pub public: bool,
    pub deprecated: bool,
    pub request_example: Option<Sample>,
    pub response_example: Option<Sample>,
    pub request_examples: Option<Vec<Sample>>,
    pub response_examples: Option<Vec<Sample>>,
}

/// Resolved per-operation metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebMethod {
    /// URL path pattern that path parameters are substituted into.
    pub route: Option<String>,
    /// The operation can be invoked without prior authentication.
    pub public: bool,
    pub deprecated: bool,
    pub request_examples: Vec<Sample>,
    pub response_examples: Vec<Sample>,
}

impl WebMethod {
    /// Resolve a declaration, rejecting a single example given alongside a list.
    pub fn resolve(operation: &str, decl: &WebMethodDecl) -> Result<Self, ConfigError> {
        let request_examples = merge_examples(
            operation,
            "request",
            &decl.request_example,
            &decl.request_examples,
        )?;
        let response_examples = merge_examples(
            operation,
            "response",
            &decl.response_example,
            &decl.response_examples,
        )?;

        Ok(Self {
            route: decl.route.clone(),
            public: decl.public,
            deprecated: decl.deprecated,
            request_examples,
            response_examples,
        })
    }
}

fn merge_examples(
    operation: &str,
    slot: &str,
    single: &Option<Sample>,
    many: &Option<Vec<Sample>>,
) -> Result<Vec<Sample>, ConfigError> {
    match (single, many) {
        (Some(_), Some(_)) => Err(ConfigError::ExclusiveExamples {
            operation: operation.to_string(),
            slot: slot.to_string(),
        }),
        (Some(one), None) => Ok(vec![one.clone()]),
        (None, Some(list)) => Ok(list.clone()),
        (None, None) => Ok(Vec::new()),
    }
}

/// Side table from (group, function name) to resolved metadata.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    entries: IndexMap<(String, String), WebMethod>,
}

impl MetadataTable {
    pub fn insert(&mut self, group: &str, function: &str, method: WebMethod) {
        self.entries
            .insert((group.to_string(), function.to_string()), method);
    }

    pub fn get(&self, group: &str, function: &str) -> Option<&WebMethod> {
        self.entries.get(&(group.to_string(), function.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_example_becomes_list() {
        let decl = WebMethodDecl {
            response_example: Some(Sample::new(json!({"a": 1}))),
            ..WebMethodDecl::default()
        };
        let method = WebMethod::resolve("get_a", &decl).unwrap();
        assert_eq!(method.response_examples.len(), 1);
        assert!(method.request_examples.is_empty());
    }

    #[test]
    fn single_and_list_are_exclusive() {
        let decl = WebMethodDecl {
            request_example: Some(Sample::new(json!(1))),
            request_examples: Some(vec![Sample::new(json!(2))]),
            ..WebMethodDecl::default()
        };
        let err = WebMethod::resolve("create_a", &decl).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ExclusiveExamples { ref operation, ref slot }
                if operation == "create_a" && slot == "request"
        ));
    }

    #[test]
    fn sample_key_prefers_summary() {
        assert_eq!(Sample::new(json!({"x": 1})).key(), r#"{"x":1}"#);
        let mut sample = Sample::new(json!(1));
        sample.summary = Some("one".to_string());
        assert_eq!(sample.key(), "one");
    }
}
