use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A security scheme type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecuritySchemeType {
    ApiKey,
    Http,
    OpenIdConnect,
}

/// Location of an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

/// A security scheme definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiKeyLocation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,

    #[serde(rename = "openIdConnectUrl", skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,
}

impl SecurityScheme {
    fn new(scheme_type: SecuritySchemeType, description: &str) -> Self {
        Self {
            scheme_type,
            description: Some(description.to_string()),
            name: None,
            location: None,
            scheme: None,
            bearer_format: None,
            open_id_connect_url: None,
        }
    }

    /// An API key passed in a header, query parameter or cookie.
    pub fn api_key(description: &str, name: &str, location: ApiKeyLocation) -> Self {
        Self {
            name: Some(name.to_string()),
            location: Some(location),
            ..Self::new(SecuritySchemeType::ApiKey, description)
        }
    }

    /// HTTP authentication such as `basic` or `bearer`.
    pub fn http(description: &str, scheme: &str, bearer_format: Option<&str>) -> Self {
        Self {
            scheme: Some(scheme.to_string()),
            bearer_format: bearer_format.map(str::to_string),
            ..Self::new(SecuritySchemeType::Http, description)
        }
    }

    pub fn open_id_connect(description: &str, url: &str) -> Self {
        Self {
            open_id_connect_url: Some(url.to_string()),
            ..Self::new(SecuritySchemeType::OpenIdConnect, description)
        }
    }
}

/// A security requirement: map of scheme name → required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_key_names_its_location() {
        let scheme =
            SecurityScheme::api_key("Key issued per client.", "X-Api-Key", ApiKeyLocation::Header);
        assert_eq!(
            serde_json::to_value(&scheme).unwrap(),
            json!({
                "type": "apiKey",
                "description": "Key issued per client.",
                "name": "X-Api-Key",
                "in": "header",
            })
        );
    }

    #[test]
    fn open_id_connect_carries_discovery_url() {
        let url = "https://auth.example.com/.well-known/openid-configuration";
        let scheme = SecurityScheme::open_id_connect("Single sign-on.", url);
        let value = serde_json::to_value(&scheme).unwrap();
        assert_eq!(value["type"], "openIdConnect");
        assert_eq!(value["openIdConnectUrl"], url);
        assert!(value.get("scheme").is_none());

        let parsed: SecurityScheme = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, scheme);
    }
}
