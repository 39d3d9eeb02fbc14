use std::collections::BTreeSet;

use heck::{ToLowerCamelCase, ToTitleCase};
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::config::{self, Options};
use crate::decl::{ApiDeclaration, MetadataTable, Sample, TypeExpr};
use crate::docs;
use crate::error::{ConfigError, ExtractError, GenerateError};
use crate::openapi::components::Components;
use crate::openapi::media_type::{self, MediaType};
use crate::openapi::operation::{Callback, HttpMethod, Operation, PathItem};
use crate::openapi::parameter::Parameter;
use crate::openapi::request_body::RequestBody;
use crate::openapi::response::{Response, ResponseOrRef};
use crate::openapi::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};
use crate::openapi::security::SecurityRequirement;
use crate::openapi::spec::Document;

use super::content::{ContentBuilder, ErrorEnvelope, PayloadTransform};
use super::extract::{
    CALLBACK_PARAMETER, EndpointOperation, endpoint_events, endpoint_operations, error_cases,
    success_cases,
};
use super::registry::SchemaRegistry;
use super::responses::build_responses;
use super::schema_gen::CatalogSchemaGenerator;
use super::tags::{TagSection, TagTaxonomy, group_tag, schema_tag};

/// Name of the security scheme every non-public operation requires.
pub const DEFAULT_SECURITY_SCHEME: &str = "Default";
/// Built-in schema of the shared error responses.
pub const ERROR_RESPONSE_SCHEMA: &str = "ErrorResponse";

/// Shared responses filled in for status codes an operation leaves open.
const SHARED_RESPONSES: [(&str, &str, &str); 2] = [
    ("400", "BadRequest", "The request was malformed or failed validation."),
    (
        "500",
        "InternalServerError",
        "The server encountered an unexpected condition.",
    ),
];

type Registry<'a> = SchemaRegistry<CatalogSchemaGenerator<'a>>;

/// Builds the OpenAPI document of one endpoint group.
#[derive(Debug)]
pub struct Generator<'a> {
    api: &'a ApiDeclaration,
    endpoint: String,
    options: Options,
    metadata: MetadataTable,
}

impl<'a> Generator<'a> {
    /// Validate the configuration against the declaration table.
    pub fn new(
        api: &'a ApiDeclaration,
        endpoint: &str,
        options: Options,
    ) -> Result<Self, ConfigError> {
        if !api.groups.contains_key(endpoint) {
            return Err(ConfigError::UnknownEndpoint(endpoint.to_string()));
        }
        options.validate(api)?;
        let metadata = api.metadata_table()?;
        Ok(Self {
            api,
            endpoint: endpoint.to_string(),
            options,
            metadata,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Operations of the endpoint group, as the document will list them.
    pub fn operations(&self) -> Result<Vec<EndpointOperation>, ExtractError> {
        endpoint_operations(
            self.api,
            &self.endpoint,
            &self.metadata,
            &self.options.verbs,
        )
    }

    pub fn generate(&self) -> Result<Document, GenerateError> {
        let operations = self.operations()?;
        let mut registry = SchemaRegistry::new(CatalogSchemaGenerator::new(self.api));

        let envelope = ErrorEnvelope;
        let error_transform: Option<&dyn PayloadTransform> =
            self.options.error_wrapper.then_some(&envelope as &dyn PayloadTransform);

        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut defining_groups = BTreeSet::new();
        for op in &operations {
            defining_groups.insert(op.defining_group.as_str());
            let operation = self.build_operation(&mut registry, op, error_transform)?;
            let item = PathItem::with_operation(op.http_method, operation);
            match paths.entry(op.route()) {
                Entry::Occupied(mut existing) => existing.get_mut().merge(item),
                Entry::Vacant(slot) => {
                    slot.insert(item);
                }
            }
        }

        registry.define(ERROR_RESPONSE_SCHEMA, error_response_schema);
        let taxonomy = self.build_taxonomy(&mut registry, &defining_groups)?;

        let mut components = Components::from_schemas(registry.into_schemas());
        for (_, name, description) in SHARED_RESPONSES {
            let mut schema = SchemaOrRef::component(ERROR_RESPONSE_SCHEMA);
            if let Some(transform) = error_transform {
                schema = transform.schema(schema);
            }
            components.responses.insert(
                name.to_string(),
                ResponseOrRef::Response(Response {
                    description: description.to_string(),
                    content: json_content(schema),
                }),
            );
        }

        let mut security = None;
        if let Some(scheme) = &self.options.default_security_scheme {
            components
                .security_schemes
                .insert(DEFAULT_SECURITY_SCHEME.to_string(), scheme.clone());
            security = Some(vec![default_requirement()]);
        }

        Ok(Document {
            openapi: self.options.openapi_version.clone(),
            info: self.options.info.clone(),
            servers: vec![self.options.server.clone()],
            paths,
            components: Some(components),
            security,
            tags: taxonomy.tags,
            tag_groups: taxonomy.groups,
        })
    }

    fn build_operation(
        &self,
        registry: &mut Registry<'a>,
        op: &EndpointOperation,
        error_transform: Option<&dyn PayloadTransform>,
    ) -> Result<Operation, ExtractError> {
        let doc = docs::parse(op.doc.as_deref());
        let use_examples = self.options.use_examples;
        let examples = |samples: &[Sample]| -> Vec<Sample> {
            if use_examples {
                samples.to_vec()
            } else {
                Vec::new()
            }
        };
        let content = ContentBuilder::new();

        let mut parameters = Vec::new();
        for param in &op.path_params {
            parameters.push(Parameter::path(
                &param.name,
                registry.to_reference(&param.ty)?,
                doc.params.get(&param.name).cloned(),
            ));
        }
        for param in &op.query_params {
            let (inner, optional) = param.ty.unwrap_optional();
            parameters.push(Parameter::query(
                &param.name,
                registry.to_reference(inner)?,
                !optional,
                doc.params.get(&param.name).cloned(),
            ));
        }
        if op.event_type.is_some() {
            parameters.push(Parameter::query(
                CALLBACK_PARAMETER,
                Schema::with_format(SchemaType::String, "uri").into(),
                true,
                Some("URL that receives events while the operation runs.".into()),
            ));
        }

        let request_body = match &op.request_param {
            Some(param) => {
                let (inner, optional) = param.ty.unwrap_optional();
                let body = content.build(
                    registry,
                    inner,
                    &examples(&op.metadata.request_examples),
                )?;
                Some(
                    RequestBody::new(body, !optional)
                        .with_description(doc.params.get(&param.name).cloned()),
                )
            }
            None => None,
        };

        let success = build_responses(
            registry,
            &content,
            &success_cases(self.api, op, &doc),
            &examples(&op.metadata.response_examples),
            |ty| self.options.success_status(ty),
        )?;
        let error_builder = match error_transform {
            Some(transform) => ContentBuilder::with_transform(transform),
            None => ContentBuilder::new(),
        };
        let errors = build_responses(
            registry,
            &error_builder,
            &error_cases(&doc)?,
            &[],
            |ty| self.options.error_status(ty),
        )?;

        let mut responses: IndexMap<String, ResponseOrRef> = IndexMap::new();
        for (status, response) in success.into_iter().chain(errors) {
            responses
                .entry(status)
                .or_insert(ResponseOrRef::Response(response));
        }
        for (status, name, _) in SHARED_RESPONSES {
            responses
                .entry(status.to_string())
                .or_insert_with(|| ResponseOrRef::component(name));
        }

        let mut callbacks = IndexMap::new();
        if let Some(event) = &op.event_type {
            let post = Operation {
                request_body: Some(RequestBody::new(content.build(registry, event, &[])?, true)),
                responses: IndexMap::from([(
                    "200".to_string(),
                    ResponseOrRef::Response(Response::empty("OK")),
                )]),
                ..Operation::default()
            };
            let mut callback = Callback::new();
            callback.insert(
                format!("{{$request.query.{CALLBACK_PARAMETER}}}"),
                PathItem::with_operation(HttpMethod::Post, post),
            );
            callbacks.insert(format!("{}_callback", op.func_name), callback);
        }

        let security = (op.metadata.public && self.options.default_security_scheme.is_some())
            .then(Vec::new);

        Ok(Operation {
            operation_id: Some(op.func_name.to_lower_camel_case()),
            summary: doc.short.or_else(|| Some(op.name.to_title_case())),
            description: doc.long,
            tags: vec![op.defining_group.clone()],
            parameters,
            request_body,
            responses,
            callbacks,
            deprecated: op.metadata.deprecated.then_some(true),
            security,
        })
    }

    fn build_taxonomy(
        &self,
        registry: &mut Registry<'a>,
        defining_groups: &BTreeSet<&str>,
    ) -> Result<TagTaxonomy, GenerateError> {
        let caption = |id: &str| self.options.caption(id);

        let mut operation_tags = Vec::new();
        for name in defining_groups {
            let group = self.api.group(name)?;
            operation_tags.push(group_tag(name, group.doc.as_deref()));
        }

        let mut event_names = BTreeSet::new();
        for (event, ty) in endpoint_events(self.api, &self.endpoint)? {
            if registry.schema_name(&ty).is_none() {
                return Err(ExtractError::UnnamedEvent {
                    event,
                    ty: ty.to_string(),
                }
                .into());
            }
            event_names.insert(registry.register(&ty)?);
        }

        let mut extra_sections = Vec::new();
        if let Some(extra) = &self.options.extra_types {
            for (category, names) in extra.categories() {
                let mut members = BTreeSet::new();
                for name in names {
                    members.insert(registry.register(&TypeExpr::named(name))?);
                }
                let tags = members
                    .iter()
                    .map(|name| schema_tag(name, registry.get(name)))
                    .collect();
                extra_sections.push(TagSection::new(caption(category)?, tags));
            }
        }

        let event_tags = event_names
            .iter()
            .map(|name| schema_tag(name, registry.get(name)))
            .collect();
        let type_tags = registry
            .schemas()
            .iter()
            .map(|(name, schema)| schema_tag(name, Some(schema)))
            .collect();

        Ok(TagTaxonomy::build(
            TagSection::new(caption(config::OPERATIONS)?, operation_tags),
            TagSection::new(caption(config::EVENTS)?, event_tags),
            TagSection::new(caption(config::TYPES)?, type_tags),
            extra_sections,
        ))
    }
}

fn default_requirement() -> SecurityRequirement {
    IndexMap::from([(DEFAULT_SECURITY_SCHEME.to_string(), Vec::new())])
}

fn json_content(schema: SchemaOrRef) -> IndexMap<String, MediaType> {
    IndexMap::from([(
        media_type::JSON.to_string(),
        MediaType {
            schema: Some(schema),
            examples: IndexMap::new(),
        },
    )])
}

/// Problem details returned by the shared error responses.
fn error_response_schema() -> Schema {
    let mut schema = Schema::of_type(SchemaType::Object);
    schema.title = Some("Error response.".to_string());
    schema.description =
        Some("Describes an error that occurred while serving a request.".to_string());
    for (name, property, description) in [
        ("type", SchemaType::String, "Identifies the problem type."),
        ("title", SchemaType::String, "Short summary of the problem type."),
        ("status", SchemaType::Integer, "HTTP status code of this occurrence."),
        ("detail", SchemaType::String, "Explanation specific to this occurrence."),
        ("instance", SchemaType::String, "Identifies this occurrence."),
    ] {
        let mut field = Schema::of_type(property);
        field.description = Some(description.to_string());
        schema.properties.insert(name.to_string(), field.into());
    }
    schema.required = vec!["type".to_string(), "title".to_string(), "status".to_string()];
    schema.additional_properties = Some(AdditionalProperties::Bool(false));
    schema
}
