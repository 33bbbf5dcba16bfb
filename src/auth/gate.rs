//! Shared-secret API key gate

use std::fmt;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::error::{Result, ToolkitError};

/// Custom header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Body / arguments field carrying the API key
pub const API_KEY_FIELD: &str = "apiKey";

/// Validates presented credentials against the configured secret.
///
/// The comparison is plain byte equality.
#[derive(Clone)]
pub struct ApiKeyGate {
    secret: String,
}

impl ApiKeyGate {
    /// Create a gate for `secret`. An empty secret is a configuration error.
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ToolkitError::Config(
                "MCP_API_KEY environment variable is required".to_string(),
            ));
        }
        Ok(Self { secret })
    }

    /// True iff `candidate` equals the configured secret
    pub fn validate(&self, candidate: Option<&str>) -> bool {
        candidate.is_some_and(|c| c == self.secret)
    }
}

// Never print the secret.
impl fmt::Debug for ApiKeyGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyGate")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Extract the header-carried credential: `X-API-Key` wins over `Authorization`.
/// Empty values fall through to the next carrier.
pub fn header_credential(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    };
    header(API_KEY_HEADER)
        .or_else(|| {
            header(AUTHORIZATION.as_str())
                .map(|v| v.strip_prefix("Bearer ").unwrap_or(v))
                .filter(|v| !v.is_empty())
        })
        .map(str::to_string)
}

/// Extract a non-empty `apiKey` field from a JSON object
pub fn body_credential(body: &serde_json::Value) -> Option<String> {
    body.get(API_KEY_FIELD)
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
