use serde::{Deserialize, Serialize};

/// HTTP host configuration, read from `modules.api_ingress`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiIngressConfig {
    /// Serve `/openapi.json` and `/docs`.
    pub enable_docs: bool,
    /// Allowed CORS origin; `"*"` allows any, `None` disables CORS.
    pub cors_origin: Option<String>,
    /// Maximum request body size in MiB.
    pub body_limit_mb: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            enable_docs: false,
            cors_origin: None,
            body_limit_mb: 16,
        }
    }
}
