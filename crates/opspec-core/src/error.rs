use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid type expression `{input}`: {reason}")]
    InvalidType { input: String, reason: String },
}

/// Problems detected at the configuration boundary, before any operation is extracted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{slot}_example` and `{slot}_examples` are exclusive (operation `{operation}`)")]
    ExclusiveExamples { operation: String, slot: String },

    #[error("no caption found for ID: {0}")]
    UnknownCaption(String),

    #[error("extra type `{0}` is not declared in the type catalog")]
    UnknownExtraType(String),

    #[error("metadata in group `{group}` targets undeclared operation `{operation}`")]
    UnknownMetadataTarget { group: String, operation: String },

    #[error("endpoint group `{0}` is not declared")]
    UnknownEndpoint(String),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(
        "only a single composite type is permitted in a signature but multiple composite types found in `{operation}`: `{first}` and `{second}`"
    )]
    AmbiguousBody {
        operation: String,
        first: String,
        second: String,
    },

    #[error("path parameter `{param}` of `{operation}` must not be optional")]
    OptionalPathParameter { operation: String, param: String },

    #[error(
        "positional parameter `{param}` absent from user-defined route `{route}` for `{operation}`"
    )]
    PathParameterNotInRoute {
        operation: String,
        route: String,
        param: String,
    },

    #[error(
        "placeholder `{placeholder}` in user-defined route `{route}` has no positional parameter in `{operation}`"
    )]
    RoutePlaceholderUnbound {
        operation: String,
        route: String,
        placeholder: String,
    },

    #[error("query parameter `{param}` found in user-defined route `{route}` for `{operation}`")]
    QueryParameterInRoute {
        operation: String,
        route: String,
        param: String,
    },

    #[error(
        "user-defined route `{route}` for `{operation}` has parameter `{param}` of composite type `{ty}`"
    )]
    CompositeRouteParameter {
        operation: String,
        route: String,
        param: String,
        ty: String,
    },

    #[error("malformed route `{route}`: {reason}")]
    MalformedRoute { route: String, reason: String },

    #[error("no eligible endpoint operations in group `{0}`")]
    NoOperations(String),

    #[error("unsupported return type `{ty}` in `{operation}`: {reason}")]
    UnsupportedReturnType {
        operation: String,
        ty: String,
        reason: String,
    },

    #[error("endpoint group `{0}` is not declared")]
    UnknownGroup(String),

    #[error("type `{0}` is not declared in the type catalog")]
    UnknownType(String),

    #[error("cannot derive a schema from `{0}`")]
    UnsupportedType(String),

    #[error("event `{event}` has type `{ty}` which has no schema name")]
    UnnamedEvent { event: String, ty: String },

    #[error("parameter name `{param}` is reserved in `{operation}`")]
    ReservedParameter { operation: String, param: String },

    #[error("parameter `{param}` is declared more than once in `{operation}`")]
    DuplicateParameter { operation: String, param: String },
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}
