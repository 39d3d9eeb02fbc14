use crate::error::ExtractError;

/// Placeholder names of a route template, in order of appearance.
pub fn route_parameters(route: &str) -> Result<Vec<String>, ExtractError> {
    let malformed = |reason: &str| ExtractError::MalformedRoute {
        route: route.to_string(),
        reason: reason.to_string(),
    };

    let mut names = Vec::new();
    let mut rest = route;
    while let Some(open) = rest.find(['{', '}']) {
        if rest[open..].starts_with('}') {
            return Err(malformed("unmatched `}`"));
        }
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| malformed("unclosed `{`"))?;
        let name = &after[..close];
        if name.is_empty() {
            return Err(malformed("empty placeholder"));
        }
        if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(malformed(&format!("invalid placeholder `{name}`")));
        }
        if names.iter().any(|n| n == name) {
            return Err(malformed(&format!("duplicate placeholder `{name}`")));
        }
        names.push(name.to_string());
        rest = &after[close + 1..];
    }
    Ok(names)
}

/// `/name/{p1}/.../{pN}` for an operation without an explicit route.
pub fn synthesize_route<'a>(name: &str, path_params: impl IntoIterator<Item = &'a str>) -> String {
    let mut route = format!("/{name}");
    for param in path_params {
        route.push_str("/{");
        route.push_str(param);
        route.push('}');
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_placeholders_in_order() {
        assert_eq!(
            route_parameters("/person/name/{family}/{given}").unwrap(),
            vec!["family", "given"]
        );
        assert!(route_parameters("/people").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_templates() {
        for route in ["/a/{id", "/a/id}", "/a/{}", "/a/{x-y}", "/a/{x}/{x}"] {
            assert!(
                matches!(route_parameters(route), Err(ExtractError::MalformedRoute { .. })),
                "{route}"
            );
        }
    }

    #[test]
    fn synthesized_route_lists_path_parameters() {
        assert_eq!(synthesize_route("job", ["job_id"]), "/job/{job_id}");
        assert_eq!(synthesize_route("job", []), "/job");
        assert_eq!(
            synthesize_route("person", ["family", "given"]),
            "/person/{family}/{given}"
        );
    }
}
