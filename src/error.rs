//! Error types for the toolkit server

use thiserror::Error;

/// Result type alias for toolkit operations
pub type Result<T> = std::result::Result<T, ToolkitError>;

/// JSON-RPC error codes used on the protocol path
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    pub const UNAUTHORIZED: i64 = -32003;
}

/// Main error type for the toolkit
#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    InvalidParams(String),

    /// Handler-reported failure; the message is surfaced verbatim to callers.
    #[error("{0}")]
    Generation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolkitError {
    /// Errors a generator reports about its own input, as opposed to faults
    pub fn is_application(&self) -> bool {
        matches!(self, ToolkitError::Generation(_))
    }

    /// Get error code for MCP protocol
    pub fn code(&self) -> i64 {
        match self {
            ToolkitError::Unauthorized(_) => codes::UNAUTHORIZED,
            ToolkitError::UnknownTool(_) => codes::METHOD_NOT_FOUND,
            ToolkitError::InvalidParams(_) => codes::INVALID_PARAMS,
            _ => codes::INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            ToolkitError::Unauthorized("x".into()).code(),
            codes::UNAUTHORIZED
        );
        assert_eq!(
            ToolkitError::UnknownTool("x".into()).code(),
            codes::METHOD_NOT_FOUND
        );
        assert_eq!(ToolkitError::Internal("x".into()).code(), -32603);
        assert_eq!(
            ToolkitError::InvalidParams("x".into()).code(),
            codes::INVALID_PARAMS
        );

        // failing to serialize our own output is not the caller's parse error
        let err: ToolkitError = serde_json::from_str::<u8>("x").unwrap_err().into();
        assert_eq!(err.code(), codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_generation_message_is_verbatim() {
        let err = ToolkitError::Generation("Invalid Base64 input".into());
        assert_eq!(err.to_string(), "Invalid Base64 input");
        assert!(err.is_application());
        assert!(!ToolkitError::Internal("boom".into()).is_application());

        let err = ToolkitError::Unauthorized("Invalid or missing API key".into());
        assert_eq!(err.to_string(), "Invalid or missing API key");
    }
}
