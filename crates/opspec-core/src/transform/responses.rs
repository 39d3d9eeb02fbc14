use indexmap::IndexMap;

use crate::decl::{Sample, TypeExpr};
use crate::error::ExtractError;
use crate::openapi::response::{Response, reason_phrase};

use super::content::ContentBuilder;
use super::registry::SchemaRegistry;
use super::schema_gen::SchemaGenerator;

/// Separator between the descriptions of types that share a status code.
pub const OR_SEPARATOR: &str = " **OR** ";

/// A response type together with the condition it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCase {
    pub ty: TypeExpr,
    pub description: Option<String>,
}

impl ResponseCase {
    pub fn new(ty: TypeExpr, description: Option<String>) -> Self {
        Self { ty, description }
    }
}

/// Collapse response cases into one response per status code.
///
/// Cases keep their declaration order within a status; a status with several
/// types answers with their union. Samples go to the status whose types they
/// name. When no sample names a type and none of them is typed, all samples are
/// attached to every status.
pub fn build_responses<G: SchemaGenerator>(
    registry: &mut SchemaRegistry<G>,
    builder: &ContentBuilder<'_>,
    cases: &[ResponseCase],
    samples: &[Sample],
    status_of: impl Fn(&TypeExpr) -> String,
) -> Result<IndexMap<String, Response>, ExtractError> {
    let mut buckets: IndexMap<String, Vec<&ResponseCase>> = IndexMap::new();
    for case in cases {
        buckets.entry(status_of(&case.ty)).or_default().push(case);
    }

    let mut responses = IndexMap::new();
    for (status, members) in buckets {
        let descriptions: Vec<&str> = members
            .iter()
            .filter_map(|case| case.description.as_deref())
            .filter(|text| !text.is_empty())
            .collect();
        let description = if descriptions.is_empty() {
            reason_phrase(&status).to_string()
        } else {
            descriptions.join(OR_SEPARATOR)
        };

        let payload = match members.as_slice() {
            [single] => single.ty.clone(),
            _ => TypeExpr::union_of(members.iter().map(|case| case.ty.clone()).collect()),
        };

        let response = if payload.is_none() {
            Response::empty(description)
        } else {
            let selected = select_samples(&members, samples);
            Response {
                description,
                content: builder.build(registry, &payload, &selected)?,
            }
        };
        responses.insert(status, response);
    }
    Ok(responses)
}

fn select_samples(members: &[&ResponseCase], samples: &[Sample]) -> Vec<Sample> {
    let matching: Vec<Sample> = samples
        .iter()
        .filter(|sample| {
            sample.type_name.as_deref().is_some_and(|name| {
                members
                    .iter()
                    .any(|case| case.ty.name() == Some(name) || case.ty.to_string() == name)
            })
        })
        .cloned()
        .collect();

    if matching.is_empty() && samples.iter().all(|sample| sample.type_name.is_none()) {
        return samples.to_vec();
    }
    matching
}
