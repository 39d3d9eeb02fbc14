use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::decl::{ApiDeclaration, MetadataTable, OperationDecl, ParamKind, TypeExpr, WebMethod};
use crate::docs::{self, DocString};
use crate::error::ExtractError;
use crate::openapi::operation::HttpMethod;

use super::responses::ResponseCase;
use super::route::{route_parameters, synthesize_route};
use super::verb::VerbConventions;

/// Query parameter that carries the callback URL of an event-streaming operation.
pub const CALLBACK_PARAMETER: &str = "callback";

/// A named, typed parameter of an endpoint operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

impl OperationParameter {
    fn new(name: &str, ty: &TypeExpr) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.clone(),
        }
    }
}

/// Routing and type information of one operation, ready for document assembly.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointOperation {
    /// The most basic group that declares the function.
    pub defining_group: String,
    /// Function name without its verb prefix.
    pub name: String,
    pub func_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    pub path_params: Vec<OperationParameter>,
    pub query_params: Vec<OperationParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_param: Option<OperationParameter>,
    /// Payload sent out-of-band while the operation runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<TypeExpr>,
    pub response_type: TypeExpr,
    pub http_method: HttpMethod,
    #[serde(skip)]
    pub doc: Option<String>,
    #[serde(skip)]
    pub metadata: WebMethod,
}

impl EndpointOperation {
    /// The explicit route, or one synthesized from the name and path parameters.
    pub fn route(&self) -> String {
        match &self.route {
            Some(route) => route.clone(),
            None => synthesize_route(
                &self.name,
                self.path_params.iter().map(|p| p.name.as_str()),
            ),
        }
    }
}

/// Extract every eligible operation of `endpoint` and the groups it composes.
///
/// Operations are ordered by function name.
pub fn endpoint_operations(
    api: &ApiDeclaration,
    endpoint: &str,
    metadata: &MetadataTable,
    verbs: &VerbConventions,
) -> Result<Vec<EndpointOperation>, ExtractError> {
    let groups = api.linearize(endpoint)?;

    // function name -> (winning declaration, defining group)
    let mut functions: BTreeMap<&str, (&OperationDecl, &str)> = BTreeMap::new();
    for &group_name in &groups {
        let group = api.group(group_name)?;
        for decl in &group.operations {
            functions
                .entry(decl.name.as_str())
                .and_modify(|(_, defining)| *defining = group_name)
                .or_insert((decl, group_name));
        }
    }

    let mut operations = Vec::new();
    for (func_name, (decl, defining_group)) in functions {
        let Some((prefix, name)) = verbs.split_prefix(func_name) else {
            continue;
        };
        let method = groups
            .iter()
            .find_map(|group| metadata.get(group, func_name))
            .cloned()
            .unwrap_or_default();

        let op = extract_operation(api, decl, defining_group, prefix, name, method, verbs)?;
        log::debug!(
            "extracted {} {} from {}::{}",
            op.http_method.as_str(),
            op.route(),
            op.defining_group,
            op.func_name
        );
        operations.push(op);
    }

    if operations.is_empty() {
        return Err(ExtractError::NoOperations(endpoint.to_string()));
    }
    Ok(operations)
}

fn extract_operation(
    api: &ApiDeclaration,
    decl: &OperationDecl,
    defining_group: &str,
    prefix: &str,
    name: &str,
    metadata: WebMethod,
    verbs: &VerbConventions,
) -> Result<EndpointOperation, ExtractError> {
    let func_name = decl.name.as_str();
    let route = metadata.route.clone();
    let placeholders = route.as_deref().map(route_parameters).transpose()?;
    let in_route = |param: &str| {
        placeholders
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n == param))
    };

    let mut path_params = Vec::new();
    let mut query_params = Vec::new();
    let mut request_param: Option<OperationParameter> = None;

    let mut seen = HashSet::new();
    for param in &decl.params {
        if param.kind == ParamKind::Receiver {
            continue;
        }
        if !seen.insert(param.name.as_str()) {
            return Err(ExtractError::DuplicateParameter {
                operation: func_name.to_string(),
                param: param.name.clone(),
            });
        }
        let (inner, optional) = param.ty.unwrap_optional();

        if api.is_simple(inner) {
            if param.kind == ParamKind::Positional {
                if optional {
                    return Err(ExtractError::OptionalPathParameter {
                        operation: func_name.to_string(),
                        param: param.name.clone(),
                    });
                }
                if placeholders.is_some() && !in_route(&param.name) {
                    return Err(ExtractError::PathParameterNotInRoute {
                        operation: func_name.to_string(),
                        route: route.clone().unwrap_or_default(),
                        param: param.name.clone(),
                    });
                }
                path_params.push(OperationParameter::new(&param.name, &param.ty));
            } else {
                if in_route(&param.name) {
                    return Err(ExtractError::QueryParameterInRoute {
                        operation: func_name.to_string(),
                        route: route.clone().unwrap_or_default(),
                        param: param.name.clone(),
                    });
                }
                query_params.push(OperationParameter::new(&param.name, &param.ty));
            }
        } else {
            if in_route(&param.name) {
                return Err(ExtractError::CompositeRouteParameter {
                    operation: func_name.to_string(),
                    route: route.clone().unwrap_or_default(),
                    param: param.name.clone(),
                    ty: param.ty.to_string(),
                });
            }
            if let Some(first) = &request_param {
                return Err(ExtractError::AmbiguousBody {
                    operation: func_name.to_string(),
                    first: format!("{}: {}", first.name, first.ty),
                    second: format!("{}: {}", param.name, param.ty),
                });
            }
            request_param = Some(OperationParameter::new(&param.name, &param.ty));
        }
    }

    if let (Some(route), Some(names)) = (&route, &placeholders) {
        if let Some(unbound) = names
            .iter()
            .find(|placeholder| !path_params.iter().any(|p| &p.name == *placeholder))
        {
            return Err(ExtractError::RoutePlaceholderUnbound {
                operation: func_name.to_string(),
                route: route.clone(),
                placeholder: unbound.clone(),
            });
        }
    }

    let (event_type, response_type) = match &decl.returns {
        TypeExpr::Stream { event, result } => {
            if event.contains_stream() || result.contains_stream() {
                return Err(unsupported_return(decl, "nested streams"));
            }
            (Some(event.as_ref().clone()), result.as_ref().clone())
        }
        other if other.contains_stream() => {
            return Err(unsupported_return(decl, "a stream must be the whole return type"));
        }
        other => (None, other.clone()),
    };

    if event_type.is_some() {
        if let Some(clash) = path_params
            .iter()
            .chain(&query_params)
            .find(|p| p.name == CALLBACK_PARAMETER)
        {
            return Err(ExtractError::ReservedParameter {
                operation: func_name.to_string(),
                param: clash.name.clone(),
            });
        }
    }

    let http_method = verbs.infer_method(prefix, request_param.is_some());

    Ok(EndpointOperation {
        defining_group: defining_group.to_string(),
        name: name.to_string(),
        func_name: func_name.to_string(),
        route,
        path_params,
        query_params,
        request_param,
        event_type,
        response_type,
        http_method,
        doc: decl.doc.clone(),
        metadata,
    })
}

fn unsupported_return(decl: &OperationDecl, reason: &str) -> ExtractError {
    ExtractError::UnsupportedReturnType {
        operation: decl.name.clone(),
        ty: decl.returns.to_string(),
        reason: reason.to_string(),
    }
}

/// Events declared by `endpoint` and the groups it composes, ordered by event name.
pub fn endpoint_events(
    api: &ApiDeclaration,
    endpoint: &str,
) -> Result<BTreeMap<String, TypeExpr>, ExtractError> {
    let mut events = BTreeMap::new();
    for group_name in api.linearize(endpoint)? {
        for (event, ty) in &api.group(group_name)?.events {
            events.entry(event.clone()).or_insert_with(|| ty.clone());
        }
    }
    Ok(events)
}

/// Success responses of an operation.
///
/// A union result without a documented return value is split into one case per
/// alternative, each described by the short description of its type.
pub fn success_cases(
    api: &ApiDeclaration,
    op: &EndpointOperation,
    doc: &DocString,
) -> Vec<ResponseCase> {
    if doc.returns.is_none() {
        let (inner, optional) = op.response_type.unwrap_optional();
        if let TypeExpr::Union(members) = inner {
            let mut cases: Vec<ResponseCase> = members
                .iter()
                .map(|member| ResponseCase::new(member.clone(), type_summary(api, member)))
                .collect();
            if optional {
                cases.push(ResponseCase::new(TypeExpr::None, None));
            }
            return cases;
        }
    }
    vec![ResponseCase::new(
        op.response_type.clone(),
        doc.returns.clone(),
    )]
}

/// Error responses of an operation, from its documented `:raises T:` fields.
pub fn error_cases(doc: &DocString) -> Result<Vec<ResponseCase>, ExtractError> {
    doc.raises
        .iter()
        .map(|(name, text)| -> Result<ResponseCase, ExtractError> {
            let ty = name
                .parse::<TypeExpr>()
                .map_err(|_| ExtractError::UnknownType(name.clone()))?;
            let description = (!text.is_empty()).then(|| text.clone());
            Ok(ResponseCase::new(ty, description))
        })
        .collect()
}

fn type_summary(api: &ApiDeclaration, ty: &TypeExpr) -> Option<String> {
    let def = api.types.get(ty.name()?)?;
    docs::parse(def.doc.as_deref()).short
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{GroupDecl, ParamDecl, TypeDef, WebMethodDecl};

    fn param(name: &str, ty: &str, kind: ParamKind) -> ParamDecl {
        ParamDecl::new(name, ty.parse().unwrap(), kind)
    }

    fn op(name: &str, params: Vec<ParamDecl>, returns: &str) -> OperationDecl {
        OperationDecl {
            name: name.to_string(),
            params,
            returns: returns.parse().unwrap(),
            doc: None,
        }
    }

    fn api_with(ops: Vec<OperationDecl>) -> ApiDeclaration {
        let mut api = ApiDeclaration::default();
        api.types
            .insert("Format".into(), TypeDef::enumeration(&["json", "xml"]));
        for name in ["Job", "URL", "Status", "StatusEvent"] {
            api.types.insert(name.into(), TypeDef::default());
        }
        api.groups.insert(
            "Jobs".into(),
            GroupDecl {
                operations: ops,
                ..GroupDecl::default()
            },
        );
        api
    }

    fn extract(api: &ApiDeclaration) -> Result<Vec<EndpointOperation>, ExtractError> {
        let table = api.metadata_table().expect("metadata should resolve");
        endpoint_operations(api, "Jobs", &table, &VerbConventions::default())
    }

    #[test]
    fn get_job_scenario() {
        let api = api_with(vec![op(
            "get_job",
            vec![
                param("self", "none", ParamKind::Receiver),
                param("job_id", "uuid", ParamKind::Positional),
                param("format", "Format", ParamKind::Named),
            ],
            "Job",
        )]);
        let ops = extract(&api).unwrap();
        let job = &ops[0];

        assert_eq!(job.route(), "/job/{job_id}");
        assert_eq!(job.http_method, HttpMethod::Get);
        assert_eq!(
            job.path_params,
            vec![OperationParameter::new("job_id", &"uuid".parse().unwrap())]
        );
        assert_eq!(job.query_params[0].name, "format");
        assert!(job.request_param.is_none());
    }

    #[test]
    fn composite_parameter_becomes_body() {
        let api = api_with(vec![op(
            "create_job",
            vec![param("items", "[URL]", ParamKind::Named)],
            "uuid",
        )]);
        let job = &extract(&api).unwrap()[0];
        assert_eq!(job.http_method, HttpMethod::Post);
        assert_eq!(job.route(), "/job");
        assert_eq!(
            job.request_param.as_ref().map(|p| p.ty.to_string()).as_deref(),
            Some("[URL]")
        );
    }

    #[test]
    fn two_composites_are_ambiguous() {
        let api = api_with(vec![op(
            "update_job",
            vec![
                param("job", "Job", ParamKind::Named),
                param("urls", "[URL]", ParamKind::Named),
            ],
            "none",
        )]);
        match extract(&api) {
            Err(ExtractError::AmbiguousBody { operation, first, second }) => {
                assert_eq!(operation, "update_job");
                assert_eq!(first, "job: Job");
                assert_eq!(second, "urls: [URL]");
            }
            other => panic!("expected AmbiguousBody, got {other:?}"),
        }
    }

    #[test]
    fn optional_path_parameter_is_rejected() {
        let api = api_with(vec![op(
            "get_job",
            vec![param("job_id", "uuid?", ParamKind::Positional)],
            "Job",
        )]);
        assert!(matches!(
            extract(&api),
            Err(ExtractError::OptionalPathParameter { .. })
        ));
    }

    #[test]
    fn optional_query_parameter_is_allowed() {
        let api = api_with(vec![op(
            "get_job",
            vec![param("limit", "integer?", ParamKind::Named)],
            "Job",
        )]);
        let job = &extract(&api).unwrap()[0];
        assert_eq!(job.query_params[0].ty.to_string(), "integer?");
    }

    fn with_route(mut api: ApiDeclaration, func: &str, route: &str) -> ApiDeclaration {
        let group = api.groups.get_mut("Jobs").unwrap();
        group.metadata.insert(
            func.into(),
            WebMethodDecl {
                route: Some(route.into()),
                ..WebMethodDecl::default()
            },
        );
        api
    }

    #[test]
    fn user_route_must_match_path_parameters() {
        let positional = || {
            op(
                "get_job",
                vec![param("job_id", "uuid", ParamKind::Positional)],
                "Job",
            )
        };

        let api = with_route(api_with(vec![positional()]), "get_job", "/jobs/{id}");
        assert!(matches!(
            extract(&api),
            Err(ExtractError::PathParameterNotInRoute { .. })
        ));

        let api = with_route(api_with(vec![positional()]), "get_job", "/jobs/{job_id}/{rev}");
        match extract(&api) {
            Err(ExtractError::RoutePlaceholderUnbound { placeholder, .. }) => {
                assert_eq!(placeholder, "rev")
            }
            other => panic!("expected RoutePlaceholderUnbound, got {other:?}"),
        }

        let api = with_route(api_with(vec![positional()]), "get_job", "/jobs/{job_id}");
        assert_eq!(extract(&api).unwrap()[0].route(), "/jobs/{job_id}");
    }

    #[test]
    fn user_route_rejects_query_and_composite_placeholders() {
        let api = api_with(vec![op(
            "get_job",
            vec![param("format", "Format", ParamKind::Named)],
            "Job",
        )]);
        let api = with_route(api, "get_job", "/jobs/{format}");
        assert!(matches!(
            extract(&api),
            Err(ExtractError::QueryParameterInRoute { .. })
        ));

        let api = api_with(vec![op(
            "set_job",
            vec![param("job", "Job", ParamKind::Positional)],
            "none",
        )]);
        let api = with_route(api, "set_job", "/jobs/{job}");
        assert!(matches!(
            extract(&api),
            Err(ExtractError::CompositeRouteParameter { .. })
        ));
    }

    #[test]
    fn repeated_parameter_name_is_rejected() {
        let api = api_with(vec![op(
            "get_item",
            vec![
                param("id", "string", ParamKind::Positional),
                param("id", "integer", ParamKind::Named),
            ],
            "Job",
        )]);
        match extract(&api) {
            Err(ExtractError::DuplicateParameter { operation, param }) => {
                assert_eq!(operation, "get_item");
                assert_eq!(param, "id");
            }
            other => panic!("expected DuplicateParameter, got {other:?}"),
        }

        let api = api_with(vec![op(
            "get_items",
            vec![
                param("id", "string", ParamKind::Positional),
                param("id", "string", ParamKind::Positional),
            ],
            "Job",
        )]);
        let api = with_route(api, "get_items", "/items/{id}");
        assert!(matches!(
            extract(&api),
            Err(ExtractError::DuplicateParameter { ref param, .. }) if param == "id"
        ));
    }

    #[test]
    fn stream_return_is_split() {
        let api = api_with(vec![op(
            "get_status",
            vec![param("job_id", "uuid", ParamKind::Positional)],
            "stream<StatusEvent, Status>",
        )]);
        let status = &extract(&api).unwrap()[0];
        assert_eq!(status.event_type, Some(TypeExpr::named("StatusEvent")));
        assert_eq!(status.response_type, TypeExpr::named("Status"));

        let api = api_with(vec![op("get_status", vec![], "[stream<StatusEvent, Status>]")]);
        assert!(matches!(
            extract(&api),
            Err(ExtractError::UnsupportedReturnType { .. })
        ));
    }

    #[test]
    fn callback_name_is_reserved_for_streams() {
        let api = api_with(vec![op(
            "get_status",
            vec![param("callback", "string", ParamKind::Named)],
            "stream<StatusEvent, Status>",
        )]);
        assert!(matches!(
            extract(&api),
            Err(ExtractError::ReservedParameter { .. })
        ));

        let api = api_with(vec![op(
            "get_status",
            vec![param("callback", "string", ParamKind::Positional)],
            "stream<StatusEvent, Status>",
        )]);
        match extract(&api) {
            Err(ExtractError::ReservedParameter { param, .. }) => assert_eq!(param, "callback"),
            other => panic!("expected ReservedParameter, got {other:?}"),
        }
    }

    #[test]
    fn raised_type_must_parse() {
        let doc = docs::parse(Some(":raises [Job: Never closed."));
        match error_cases(&doc) {
            Err(ExtractError::UnknownType(name)) => assert_eq!(name, "[Job"),
            other => panic!("expected UnknownType, got {other:?}"),
        }

        let doc = docs::parse(Some(":raises Gone: Removed.\n:raises Job:"));
        let cases = error_cases(&doc).unwrap();
        assert_eq!(cases[0].ty, TypeExpr::named("Gone"));
        assert_eq!(cases[0].description.as_deref(), Some("Removed."));
        assert_eq!(cases[1].description, None);
    }

    #[test]
    fn group_without_prefixed_functions_fails() {
        let api = api_with(vec![op("list_jobs", vec![], "[Job]")]);
        match extract(&api) {
            Err(ExtractError::NoOperations(group)) => assert_eq!(group, "Jobs"),
            other => panic!("expected NoOperations, got {other:?}"),
        }
    }

    #[test]
    fn operations_are_sorted_and_defined_by_base_group() {
        let mut api = api_with(vec![op("get_job", vec![], "Job")]);
        api.groups.insert(
            "Api".into(),
            GroupDecl {
                extends: vec!["Jobs".into()],
                operations: vec![
                    op("remove_job", vec![], "none"),
                    op("get_job", vec![], "Status"),
                ],
                ..GroupDecl::default()
            },
        );
        let table = api.metadata_table().unwrap();
        let ops = endpoint_operations(&api, "Api", &table, &VerbConventions::default()).unwrap();

        let names: Vec<&str> = ops.iter().map(|o| o.func_name.as_str()).collect();
        assert_eq!(names, vec!["get_job", "remove_job"]);
        // the override's signature wins, the base group defines it
        assert_eq!(ops[0].response_type, TypeExpr::named("Status"));
        assert_eq!(ops[0].defining_group, "Jobs");
        assert_eq!(ops[1].defining_group, "Api");
        assert_eq!(ops[1].http_method, HttpMethod::Delete);
    }

    #[test]
    fn union_result_splits_into_cases() {
        let mut api = api_with(vec![op("get_job", vec![], "Job | Status | none")]);
        api.types.insert("Job".into(), TypeDef::default().with_doc("A job."));
        let ops = extract(&api).unwrap();

        let cases = success_cases(&api, &ops[0], &DocString::default());
        let types: Vec<String> = cases.iter().map(|c| c.ty.to_string()).collect();
        assert_eq!(types, vec!["Job", "Status", "none"]);
        assert_eq!(cases[0].description.as_deref(), Some("A job."));

        let documented = DocString {
            returns: Some("Whatever was found.".into()),
            ..DocString::default()
        };
        assert_eq!(success_cases(&api, &ops[0], &documented).len(), 1);
    }
}
