use indexmap::IndexMap;
use serde_json::{Value, json};

use crate::decl::{Sample, TypeExpr};
use crate::error::ExtractError;
use crate::openapi::media_type::{self, Example, MediaType};
use crate::openapi::schema::{Schema, SchemaOrRef, SchemaType};

use super::registry::SchemaRegistry;
use super::schema_gen::SchemaGenerator;

/// Rewrites a payload schema and its samples in lockstep.
pub trait PayloadTransform {
    fn schema(&self, schema: SchemaOrRef) -> SchemaOrRef;
    fn sample(&self, value: Value) -> Value;
}

/// Encloses a payload in an `{"error": ...}` object.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorEnvelope;

impl PayloadTransform for ErrorEnvelope {
    fn schema(&self, schema: SchemaOrRef) -> SchemaOrRef {
        let mut envelope = Schema::of_type(SchemaType::Object);
        envelope.properties.insert("error".to_string(), schema);
        envelope.required.push("error".to_string());
        envelope.into()
    }

    fn sample(&self, value: Value) -> Value {
        json!({ "error": value })
    }
}

/// Builds the `content` map of request bodies and responses.
#[derive(Default, Clone, Copy)]
pub struct ContentBuilder<'t> {
    transform: Option<&'t dyn PayloadTransform>,
}

impl<'t> ContentBuilder<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(transform: &'t dyn PayloadTransform) -> Self {
        Self {
            transform: Some(transform),
        }
    }

    /// A list payload is sent as JSON lines of its items; anything else as one JSON document.
    pub fn build<G: SchemaGenerator>(
        &self,
        registry: &mut SchemaRegistry<G>,
        payload: &TypeExpr,
        samples: &[Sample],
    ) -> Result<IndexMap<String, MediaType>, ExtractError> {
        let (content_type, item) = match payload {
            TypeExpr::List(item) => (media_type::JSON_LINES, item.as_ref()),
            other => (media_type::JSON, other),
        };

        let mut schema = registry.to_reference(item)?;
        if let Some(transform) = self.transform {
            schema = transform.schema(schema);
        }

        let mut examples = IndexMap::new();
        for sample in samples {
            let value = match self.transform {
                Some(transform) => transform.sample(sample.value.clone()),
                None => sample.value.clone(),
            };
            examples.insert(
                sample.key(),
                Example {
                    summary: sample.summary.clone(),
                    value,
                },
            );
        }

        let mut content = IndexMap::new();
        content.insert(
            content_type.to_string(),
            MediaType {
                schema: Some(schema),
                examples,
            },
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{ApiDeclaration, TypeDef};
    use crate::transform::schema_gen::CatalogSchemaGenerator;

    fn api() -> ApiDeclaration {
        let mut api = ApiDeclaration::default();
        api.types.insert(
            "URL".into(),
            TypeDef::record([("href", "string".parse().unwrap())]),
        );
        api.types.insert(
            "Failure".into(),
            TypeDef::record([("message", "string".parse().unwrap())]),
        );
        api
    }

    #[test]
    fn list_payload_is_json_lines_of_items() {
        let api = api();
        let mut registry = SchemaRegistry::new(CatalogSchemaGenerator::new(&api));
        let content = ContentBuilder::new()
            .build(&mut registry, &"[URL]".parse().unwrap(), &[])
            .unwrap();

        assert_eq!(content.len(), 1);
        let media = &content[media_type::JSON_LINES];
        assert_eq!(media.schema.as_ref().and_then(|s| s.ref_name()), Some("URL"));
        assert!(media.examples.is_empty());
    }

    #[test]
    fn examples_are_keyed_by_summary_or_value() {
        let api = api();
        let mut registry = SchemaRegistry::new(CatalogSchemaGenerator::new(&api));
        let mut labelled = Sample::new(json!({"href": "b"}));
        labelled.summary = Some("second".into());
        let samples = [Sample::new(json!({"href": "a"})), labelled];

        let content = ContentBuilder::new()
            .build(&mut registry, &TypeExpr::named("URL"), &samples)
            .unwrap();
        let keys: Vec<&str> = content[media_type::JSON]
            .examples
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec![r#"{"href":"a"}"#, "second"]);
    }

    #[test]
    fn envelope_wraps_schema_and_every_example() {
        let api = api();
        let mut registry = SchemaRegistry::new(CatalogSchemaGenerator::new(&api));
        let samples = [Sample::new(json!({"message": "boom"}))];
        let content = ContentBuilder::with_transform(&ErrorEnvelope)
            .build(&mut registry, &TypeExpr::named("Failure"), &samples)
            .unwrap();

        let media = &content[media_type::JSON];
        match media.schema.as_ref() {
            Some(SchemaOrRef::Schema(schema)) => {
                assert_eq!(schema.required, vec!["error"]);
                assert_eq!(schema.properties["error"].ref_name(), Some("Failure"));
            }
            other => panic!("expected envelope schema, got {other:?}"),
        }
        let example = media.examples.values().next().unwrap();
        assert_eq!(example.value, json!({"error": {"message": "boom"}}));
    }
}
