use std::collections::HashSet;

use indexmap::IndexMap;

use crate::decl::{ApiDeclaration, Primitive, TypeExpr, TypeKind};
use crate::docs;
use crate::error::ExtractError;
use crate::openapi::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};

/// Turns type descriptors into schemas.
pub trait SchemaGenerator {
    /// Schema of `ty` plus the definitions of every named type it references.
    fn schema_for(
        &self,
        ty: &TypeExpr,
    ) -> Result<(Schema, IndexMap<String, Schema>), ExtractError>;

    /// Stable component name for `ty`, if it has one.
    fn schema_name(&self, ty: &TypeExpr) -> Option<String>;
}

/// Derives schemas from the type catalog of a declaration table.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSchemaGenerator<'a> {
    api: &'a ApiDeclaration,
}

impl<'a> CatalogSchemaGenerator<'a> {
    pub fn new(api: &'a ApiDeclaration) -> Self {
        Self { api }
    }
}

impl SchemaGenerator for CatalogSchemaGenerator<'_> {
    fn schema_for(
        &self,
        ty: &TypeExpr,
    ) -> Result<(Schema, IndexMap<String, Schema>), ExtractError> {
        let mut walker = Walker {
            api: self.api,
            definitions: IndexMap::new(),
            in_progress: HashSet::new(),
            pending: HashSet::new(),
        };

        let root = match ty {
            TypeExpr::Named(_) => Some(self.component_name(ty)?),
            _ => None,
        };
        if let Some(name) = &root {
            walker.in_progress.insert(name.clone());
        }

        let schema = walker.inline(ty)?;

        // a type that refers to itself needs its own definition
        if let Some(name) = root {
            if walker.pending.contains(&name) {
                walker.definitions.insert(name, schema.clone());
            }
        }
        Ok((schema, walker.definitions))
    }

    fn schema_name(&self, ty: &TypeExpr) -> Option<String> {
        self.api.schema_name(ty)
    }
}

impl CatalogSchemaGenerator<'_> {
    fn component_name(&self, ty: &TypeExpr) -> Result<String, ExtractError> {
        self.api
            .schema_name(ty)
            .ok_or_else(|| ExtractError::UnknownType(ty.to_string()))
    }
}

struct Walker<'a> {
    api: &'a ApiDeclaration,
    definitions: IndexMap<String, Schema>,
    in_progress: HashSet<String>,
    /// References emitted while their target was still being built.
    pending: HashSet<String>,
}

impl Walker<'_> {
    fn inline(&mut self, ty: &TypeExpr) -> Result<Schema, ExtractError> {
        let schema = match ty {
            TypeExpr::None => Schema::of_type(SchemaType::Null),
            TypeExpr::Primitive(p) => primitive_schema(*p),
            TypeExpr::Named(name) => self.definition(name)?,
            TypeExpr::Optional(inner) => Schema::one_of(vec![
                self.reference(inner)?,
                Schema::of_type(SchemaType::Null).into(),
            ]),
            TypeExpr::List(item) => Schema::array(self.reference(item)?),
            TypeExpr::Map(value) => Schema {
                schema_type: Some(SchemaType::Object),
                additional_properties: Some(AdditionalProperties::Schema(Box::new(
                    self.reference(value)?,
                ))),
                ..Schema::default()
            },
            TypeExpr::Union(members) => Schema::one_of(
                members
                    .iter()
                    .map(|member| self.reference(member))
                    .collect::<Result<_, _>>()?,
            ),
            TypeExpr::Stream { .. } => return Err(ExtractError::UnsupportedType(ty.to_string())),
        };
        Ok(schema)
    }

    fn reference(&mut self, ty: &TypeExpr) -> Result<SchemaOrRef, ExtractError> {
        let TypeExpr::Named(name) = ty else {
            return Ok(self.inline(ty)?.into());
        };
        let component = self
            .api
            .schema_name(ty)
            .ok_or_else(|| ExtractError::UnknownType(name.clone()))?;

        if self.in_progress.contains(&component) {
            self.pending.insert(component.clone());
        } else if !self.definitions.contains_key(&component) {
            self.in_progress.insert(component.clone());
            let schema = self.definition(name)?;
            self.in_progress.remove(&component);
            self.definitions.insert(component.clone(), schema);
        }
        Ok(SchemaOrRef::component(&component))
    }

    fn definition(&mut self, name: &str) -> Result<Schema, ExtractError> {
        let def = self.api.type_def(name)?;
        let doc = docs::parse(def.doc.as_deref());

        let mut schema = match def.kind {
            TypeKind::Record => {
                let mut schema = Schema::of_type(SchemaType::Object);
                for (field, ty) in &def.fields {
                    let (inner, optional) = ty.unwrap_optional();
                    let mut property = self.reference(inner)?;
                    if let (SchemaOrRef::Schema(inline), Some(text)) =
                        (&mut property, doc.params.get(field))
                    {
                        inline.description = Some(text.clone());
                    }
                    schema.properties.insert(field.clone(), property);
                    if !optional {
                        schema.required.push(field.clone());
                    }
                }
                schema.additional_properties = Some(AdditionalProperties::Bool(false));
                schema
            }
            TypeKind::Enum => Schema {
                schema_type: Some(SchemaType::String),
                enum_values: def
                    .values
                    .iter()
                    .map(|v| serde_json::Value::String(v.clone()))
                    .collect(),
                ..Schema::default()
            },
            TypeKind::Custom => def
                .schema
                .clone()
                .ok_or_else(|| ExtractError::UnsupportedType(name.to_string()))?,
        };

        if schema.title.is_none() {
            schema.title = doc.short;
        }
        if schema.description.is_none() {
            schema.description = doc.long;
        }
        Ok(schema)
    }
}

fn primitive_schema(primitive: Primitive) -> Schema {
    match primitive {
        Primitive::Boolean => Schema::of_type(SchemaType::Boolean),
        Primitive::Integer => Schema::of_type(SchemaType::Integer),
        Primitive::Number => Schema::of_type(SchemaType::Number),
        Primitive::String => Schema::of_type(SchemaType::String),
        Primitive::Uuid => Schema::with_format(SchemaType::String, "uuid"),
        Primitive::Date => Schema::with_format(SchemaType::String, "date"),
        Primitive::DateTime => Schema::with_format(SchemaType::String, "date-time"),
        Primitive::Bytes => Schema::with_format(SchemaType::String, "byte"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::TypeDef;

    fn catalog() -> ApiDeclaration {
        let mut api = ApiDeclaration::default();
        api.types.insert(
            "Person".into(),
            TypeDef::record([
                ("name", TypeExpr::named("Name")),
                ("age", "integer?".parse().unwrap()),
                ("friends", "[Person]".parse().unwrap()),
            ])
            .with_doc("A person.\n\nSomeone we know.\n\n:param age: Age in years."),
        );
        api.types.insert(
            "Name".into(),
            TypeDef::record([("first", "string".parse().unwrap())]),
        );
        api.types
            .insert("Format".into(), TypeDef::enumeration(&["json", "xml"]));
        api
    }

    #[test]
    fn record_schema_with_nested_definitions() {
        let api = catalog();
        let generator = CatalogSchemaGenerator::new(&api);
        let (schema, defs) = generator.schema_for(&TypeExpr::named("Person")).unwrap();

        assert_eq!(schema.schema_type, Some(SchemaType::Object));
        assert_eq!(schema.title.as_deref(), Some("A person."));
        assert_eq!(schema.description.as_deref(), Some("Someone we know."));
        assert_eq!(schema.required, vec!["name", "friends"]);
        assert_eq!(schema.properties["name"].ref_name(), Some("Name"));
        match &schema.properties["age"] {
            SchemaOrRef::Schema(age) => {
                assert_eq!(age.schema_type, Some(SchemaType::Integer));
                assert_eq!(age.description.as_deref(), Some("Age in years."));
            }
            other => panic!("expected inline schema, got {other:?}"),
        }
        assert!(defs.contains_key("Name"));
        // self-reference through `friends`
        assert!(defs.contains_key("Person"));
    }

    #[test]
    fn enum_and_union_schemas() {
        let api = catalog();
        let generator = CatalogSchemaGenerator::new(&api);

        let (format, _) = generator.schema_for(&TypeExpr::named("Format")).unwrap();
        assert_eq!(format.schema_type, Some(SchemaType::String));
        assert_eq!(format.enum_values.len(), 2);

        let (union, defs) = generator
            .schema_for(&"Name | Format".parse().unwrap())
            .unwrap();
        assert_eq!(union.one_of.len(), 2);
        assert_eq!(union.one_of[1].ref_name(), Some("Format"));
        assert_eq!(defs.len(), 2);
    }

    #[test]
    fn unknown_and_stream_types_fail() {
        let api = catalog();
        let generator = CatalogSchemaGenerator::new(&api);
        assert!(matches!(
            generator.schema_for(&TypeExpr::named("Ghost")),
            Err(ExtractError::UnknownType(name)) if name == "Ghost"
        ));
        assert!(matches!(
            generator.schema_for(&"stream<Name, Name>".parse().unwrap()),
            Err(ExtractError::UnsupportedType(_))
        ));
    }
}
