use serde::{Deserialize, Serialize};

/// HTTP host settings, read from `modules.api_ingress`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// Permissive CORS so a dashboard hosted elsewhere can poll the API.
    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            cors_enabled: default_cors_enabled(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

fn default_cors_enabled() -> bool {
    true
}

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}
