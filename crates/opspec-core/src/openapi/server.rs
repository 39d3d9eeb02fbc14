use serde::{Deserialize, Serialize};

/// The base URL the API is served from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            url: "/".to_string(),
            description: None,
        }
    }
}
