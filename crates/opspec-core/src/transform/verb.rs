use serde::Deserialize;

use crate::openapi::operation::HttpMethod;

/// Naming conventions that map a function-name prefix to an HTTP method.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VerbConventions {
    /// Prefixes that make a function an endpoint operation.
    pub prefixes: Vec<String>,
    /// Prefixes of body-less operations served by DELETE.
    pub delete: Vec<String>,
    /// Prefixes of operations with a body served by PUT.
    pub replace: Vec<String>,
    /// Prefixes of operations with a body served by PATCH.
    pub update: Vec<String>,
}

impl Default for VerbConventions {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            prefixes: words(&[
                "create", "delete", "get", "post", "put", "remove", "replace", "set", "update",
            ]),
            delete: words(&["delete", "remove"]),
            replace: words(&["replace", "set"]),
            update: words(&["update"]),
        }
    }
}

impl VerbConventions {
    /// Split `get_job_status` into `("get", "job_status")`; `None` when no prefix matches.
    pub fn split_prefix<'a>(&self, func_name: &'a str) -> Option<(&'a str, &'a str)> {
        self.prefixes.iter().find_map(|prefix| {
            let rest = func_name.strip_prefix(prefix.as_str())?.strip_prefix('_')?;
            Some((&func_name[..prefix.len()], rest))
        })
    }

    /// Infer the method from the prefix and whether the operation takes a body.
    pub fn infer_method(&self, prefix: &str, has_body: bool) -> HttpMethod {
        let listed = |list: &[String]| list.iter().any(|p| p == prefix);
        if !has_body {
            if listed(&self.delete) {
                HttpMethod::Delete
            } else {
                HttpMethod::Get
            }
        } else if listed(&self.replace) {
            HttpMethod::Put
        } else if listed(&self.update) {
            HttpMethod::Patch
        } else {
            HttpMethod::Post
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_prefix_requires_separator() {
        let verbs = VerbConventions::default();
        assert_eq!(verbs.split_prefix("get_job"), Some(("get", "job")));
        assert_eq!(
            verbs.split_prefix("remove_job_item"),
            Some(("remove", "job_item"))
        );
        assert_eq!(verbs.split_prefix("getter"), None);
        assert_eq!(verbs.split_prefix("get"), None);
        assert_eq!(verbs.split_prefix("list_jobs"), None);
    }

    #[test]
    fn bodyless_operations() {
        let verbs = VerbConventions::default();
        for prefix in ["get", "create", "set", "update", "post"] {
            assert_eq!(verbs.infer_method(prefix, false), HttpMethod::Get, "{prefix}");
        }
        for prefix in ["delete", "remove"] {
            assert_eq!(verbs.infer_method(prefix, false), HttpMethod::Delete, "{prefix}");
        }
    }

    #[test]
    fn operations_with_body() {
        let verbs = VerbConventions::default();
        assert_eq!(verbs.infer_method("replace", true), HttpMethod::Put);
        assert_eq!(verbs.infer_method("set", true), HttpMethod::Put);
        assert_eq!(verbs.infer_method("update", true), HttpMethod::Patch);
        for prefix in ["create", "post", "put", "get", "delete"] {
            assert_eq!(verbs.infer_method(prefix, true), HttpMethod::Post, "{prefix}");
        }
    }

    #[test]
    fn conventions_are_configurable() {
        let verbs: VerbConventions =
            serde_yaml_ng::from_str("prefixes: [fetch, drop]\ndelete: [drop]\n").unwrap();
        assert_eq!(verbs.split_prefix("fetch_job"), Some(("fetch", "job")));
        assert_eq!(verbs.split_prefix("get_job"), None);
        assert_eq!(verbs.infer_method("drop", false), HttpMethod::Delete);
        // unspecified lists keep their defaults
        assert_eq!(verbs.infer_method("update", true), HttpMethod::Patch);
    }
}
