use indexmap::IndexMap;

use crate::decl::{Primitive, TypeExpr};
use crate::error::ExtractError;
use crate::openapi::schema::{Schema, SchemaOrRef};

use super::schema_gen::SchemaGenerator;

/// Named schemas collected during one generation pass.
///
/// Names are unique and the first schema registered under a name is kept,
/// so every reference to a type resolves to the same definition.
pub struct SchemaRegistry<G: SchemaGenerator> {
    generator: G,
    schemas: IndexMap<String, Schema>,
}

impl<G: SchemaGenerator> SchemaRegistry<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            schemas: IndexMap::new(),
        }
    }

    /// Full schema of `ty`; named types it contains are registered as a side effect.
    pub fn to_schema(&mut self, ty: &TypeExpr) -> Result<Schema, ExtractError> {
        let (schema, definitions) = self.generator.schema_for(ty)?;
        for (name, definition) in definitions {
            self.schemas.entry(name).or_insert(definition);
        }
        Ok(schema)
    }

    /// Inline schema for scalars and unnamed types, a `$ref` for everything else.
    pub fn to_reference(&mut self, ty: &TypeExpr) -> Result<SchemaOrRef, ExtractError> {
        if let TypeExpr::Primitive(Primitive::String | Primitive::Integer | Primitive::Number) =
            ty
        {
            return Ok(self.to_schema(ty)?.into());
        }

        let Some(name) = self.generator.schema_name(ty) else {
            return Ok(self.to_schema(ty)?.into());
        };
        if !self.schemas.contains_key(&name) {
            let schema = self.to_schema(ty)?;
            self.schemas.entry(name.clone()).or_insert(schema);
        }
        Ok(SchemaOrRef::component(&name))
    }

    /// Register a named type without producing a reference; returns its component name.
    pub fn register(&mut self, ty: &TypeExpr) -> Result<String, ExtractError> {
        self.to_reference(ty)?
            .ref_name()
            .map(str::to_string)
            .ok_or_else(|| ExtractError::UnknownType(ty.to_string()))
    }

    /// Add a schema that has no declared type behind it, unless the name is taken.
    pub fn define(&mut self, name: &str, schema: impl FnOnce() -> Schema) {
        self.schemas
            .entry(name.to_string())
            .or_insert_with(schema);
    }

    pub fn schema_name(&self, ty: &TypeExpr) -> Option<String> {
        self.generator.schema_name(ty)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn schemas(&self) -> &IndexMap<String, Schema> {
        &self.schemas
    }

    pub fn into_schemas(self) -> IndexMap<String, Schema> {
        self.schemas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{ApiDeclaration, TypeDef};
    use crate::openapi::schema::SchemaType;
    use crate::transform::schema_gen::CatalogSchemaGenerator;

    fn api() -> ApiDeclaration {
        let mut api = ApiDeclaration::default();
        api.types.insert(
            "Job".into(),
            TypeDef::record([("urls", "[URL]".parse().unwrap())]),
        );
        api.types.insert(
            "URL".into(),
            TypeDef::record([("href", "string".parse().unwrap())]),
        );
        let mut renamed = TypeDef::default();
        renamed.schema_id = Some("PersonRecord".into());
        api.types.insert("Person".into(), renamed);
        api
    }

    #[test]
    fn scalars_are_inlined() {
        let api = api();
        let mut registry = SchemaRegistry::new(CatalogSchemaGenerator::new(&api));
        for text in ["string", "integer", "number"] {
            let schema = registry.to_reference(&text.parse().unwrap()).unwrap();
            assert!(matches!(schema, SchemaOrRef::Schema(_)), "{text}");
        }
        assert!(registry.schemas().is_empty());
    }

    #[test]
    fn named_types_are_referenced_once() {
        let api = api();
        let mut registry = SchemaRegistry::new(CatalogSchemaGenerator::new(&api));
        let first = registry.to_reference(&TypeExpr::named("Job")).unwrap();
        let second = registry.to_reference(&TypeExpr::named("Job")).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.ref_name(), Some("Job"));
        let names: Vec<&str> = registry.schemas().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["URL", "Job"]);
    }

    #[test]
    fn explicit_schema_id_names_the_component() {
        let api = api();
        let mut registry = SchemaRegistry::new(CatalogSchemaGenerator::new(&api));
        let reference = registry.to_reference(&TypeExpr::named("Person")).unwrap();
        assert_eq!(reference.ref_name(), Some("PersonRecord"));
        assert_eq!(
            registry.register(&TypeExpr::named("Person")).unwrap(),
            "PersonRecord"
        );
    }

    #[test]
    fn unnamed_composites_fall_back_to_inline() {
        let api = api();
        let mut registry = SchemaRegistry::new(CatalogSchemaGenerator::new(&api));
        let reference = registry.to_reference(&"[URL]".parse().unwrap()).unwrap();
        match reference {
            SchemaOrRef::Schema(schema) => {
                assert_eq!(schema.schema_type, Some(SchemaType::Array));
                let items = schema.items.expect("array should have items");
                assert_eq!(items.ref_name(), Some("URL"));
            }
            other => panic!("expected inline schema, got {other:?}"),
        }
        assert!(registry.get("URL").is_some());
    }

    #[test]
    fn first_writer_wins() {
        let api = api();
        let mut registry = SchemaRegistry::new(CatalogSchemaGenerator::new(&api));
        registry.to_reference(&TypeExpr::named("URL")).unwrap();
        let before = registry.get("URL").cloned();
        registry.to_schema(&TypeExpr::named("Job")).unwrap();
        assert_eq!(registry.get("URL").cloned(), before);
        assert_eq!(registry.schemas().len(), 1);
    }

    #[test]
    fn defined_schema_yields_to_declared_type() {
        let api = api();
        let mut registry = SchemaRegistry::new(CatalogSchemaGenerator::new(&api));
        registry.register(&TypeExpr::named("URL")).unwrap();
        let declared = registry.get("URL").cloned();

        registry.define("URL", Schema::default);
        registry.define("Problem", || Schema::of_type(SchemaType::Object));

        assert_eq!(registry.get("URL").cloned(), declared);
        assert_eq!(
            registry.get("Problem").and_then(|s| s.schema_type),
            Some(SchemaType::Object)
        );
    }
}
