use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::decl::{ApiDeclaration, TypeExpr};
use crate::error::ConfigError;
use crate::openapi::security::SecurityScheme;
use crate::openapi::server::Server;
use crate::openapi::spec::Info;
use crate::transform::verb::VerbConventions;

/// Caption of the tag group listing operation groups.
pub const OPERATIONS: &str = "Operations";
/// Caption of the tag group listing schemas referenced by operations.
pub const TYPES: &str = "Types";
/// Caption of the tag group listing event types.
pub const EVENTS: &str = "Events";
/// Caption of the tag group listing extra types given as a flat list.
pub const ADDITIONAL_TYPES: &str = "AdditionalTypes";

/// An HTTP status code, written either as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "StatusRepr")]
pub struct StatusCode(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusRepr {
    Number(u16),
    Text(String),
}

impl From<StatusRepr> for StatusCode {
    fn from(repr: StatusRepr) -> Self {
        match repr {
            StatusRepr::Number(n) => StatusCode(n.to_string()),
            StatusRepr::Text(s) => StatusCode(s),
        }
    }
}

impl StatusCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Types documented in addition to those reachable from operations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExtraTypes {
    /// Listed under a single `AdditionalTypes` group.
    List(Vec<String>),
    /// One tag group per category; each category must have a caption.
    Grouped(IndexMap<String, Vec<String>>),
}

impl ExtraTypes {
    /// Categories paired with their member type names.
    pub fn categories(&self) -> Vec<(&str, &[String])> {
        match self {
            ExtraTypes::List(names) => vec![(ADDITIONAL_TYPES, names.as_slice())],
            ExtraTypes::Grouped(groups) => groups
                .iter()
                .map(|(category, names)| (category.as_str(), names.as_slice()))
                .collect(),
        }
    }
}

/// Options that shape the generated document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    pub server: Server,
    pub info: Info,
    pub openapi_version: String,
    /// Authentication required by every operation that is not public.
    pub default_security_scheme: Option<SecurityScheme>,
    pub extra_types: Option<ExtraTypes>,
    /// Attach request and response examples from operation metadata.
    pub use_examples: bool,
    /// Status code per success type; unlisted types use `200`.
    pub success_responses: IndexMap<TypeExpr, StatusCode>,
    /// Status code per error type; unlisted types use `500`.
    pub error_responses: IndexMap<TypeExpr, StatusCode>,
    /// Enclose error payloads in an `{"error": ...}` envelope.
    pub error_wrapper: bool,
    /// Overrides for the tag group captions, keyed by caption ID.
    pub captions: IndexMap<String, String>,
    pub verbs: VerbConventions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            server: Server::default(),
            info: Info::default(),
            openapi_version: "3.1.0".to_string(),
            default_security_scheme: None,
            extra_types: None,
            use_examples: true,
            success_responses: IndexMap::new(),
            error_responses: IndexMap::new(),
            error_wrapper: false,
            captions: IndexMap::new(),
            verbs: VerbConventions::default(),
        }
    }
}

impl Options {
    /// Human-readable caption for a section ID.
    pub fn caption(&self, id: &str) -> Result<String, ConfigError> {
        if let Some(caption) = self.captions.get(id) {
            return Ok(caption.clone());
        }
        let builtin = match id {
            OPERATIONS => "Operations",
            TYPES => "Types",
            EVENTS => "Events",
            ADDITIONAL_TYPES => "Additional types",
            _ => return Err(ConfigError::UnknownCaption(id.to_string())),
        };
        Ok(builtin.to_string())
    }

    /// Check the options against a declaration before any extraction runs.
    pub fn validate(&self, api: &ApiDeclaration) -> Result<(), ConfigError> {
        for id in [OPERATIONS, TYPES, EVENTS] {
            self.caption(id)?;
        }
        let Some(extra) = &self.extra_types else {
            return Ok(());
        };
        for (category, names) in extra.categories() {
            self.caption(category)?;
            if let Some(missing) = names.iter().find(|name| !api.types.contains_key(*name)) {
                return Err(ConfigError::UnknownExtraType(missing.clone()));
            }
        }
        Ok(())
    }

    pub(crate) fn success_status(&self, ty: &TypeExpr) -> String {
        status_for(&self.success_responses, ty, "200")
    }

    pub(crate) fn error_status(&self, ty: &TypeExpr) -> String {
        status_for(&self.error_responses, ty, "500")
    }
}

fn status_for(catalog: &IndexMap<TypeExpr, StatusCode>, ty: &TypeExpr, default: &str) -> String {
    catalog
        .get(ty)
        .map(|status| status.as_str().to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Rendering format of the generated document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Top-level project configuration loaded from `.opspec.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Declaration table, YAML or JSON.
    pub input: String,
    /// Endpoint group to document; defaults to the first declared group.
    pub endpoint: Option<String>,
    pub output: String,
    pub format: OutputFormat,
    pub pretty: bool,
    pub options: Options,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            input: "api.yaml".to_string(),
            endpoint: None,
            output: "openapi.json".to_string(),
            format: OutputFormat::Json,
            pretty: true,
            options: Options::default(),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".opspec.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ProjectConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ProjectConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# opspec configuration
input: api.yaml
# endpoint: JobManagement   # group to document (default: first group)
output: openapi.json
format: json          # json | yaml
pretty: true

options:
  server:
    url: http://localhost:8080/api
  info:
    title: My API
    version: 1.0.0
  openapi_version: 3.1.0
  use_examples: true
  error_wrapper: false
  # default_security_scheme:
  #   type: http
  #   scheme: bearer
  #   description: Bearer token authentication.
  # extra_types: [AuditRecord]   # or a mapping of caption ID -> type names
  success_responses: {}
    # Student: 201
  error_responses: {}
    # NotFoundError: 404
  captions: {}
    # Operations: Endpoints
  verbs:
    prefixes: [create, delete, get, post, put, remove, replace, set, update]
    delete: [delete, remove]
    replace: [replace, set]
    update: [update]
"#
}
