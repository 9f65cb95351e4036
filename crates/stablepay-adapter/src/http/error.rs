/*
[INPUT]:  Error sources (HTTP, serialization, JSON-RPC, config, persistence)
[OUTPUT]: Structured error types with context
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use thiserror::Error;

/// Main error type for the StablePay adapter
#[derive(Error, Debug)]
pub enum StablepayError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Response parsed but is missing required data
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Chain RPC endpoint returned an error object
    #[error("RPC error (code {code}): {message}")]
    Rpc { code: i64, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential persistence failed
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl StablepayError {
    /// Check if the error came from the transport layer
    pub fn is_transport_error(&self) -> bool {
        matches!(self, StablepayError::Http(_))
    }

    /// Create an RPC error from a JSON-RPC error object
    pub fn rpc_error(code: i64, message: impl Into<String>) -> Self {
        StablepayError::Rpc {
            code,
            message: message.into(),
        }
    }
}

/// Result type alias for StablePay operations
pub type Result<T> = std::result::Result<T, StablepayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_detection() {
        let err = StablepayError::InvalidResponse("missing token".to_string());
        assert!(!err.is_transport_error());

        let err = StablepayError::Config("empty base url".to_string());
        assert!(!err.is_transport_error());
    }

    #[test]
    fn test_rpc_error_creation() {
        let err = StablepayError::rpc_error(-32602, "Invalid param: WrongSize");
        match err {
            StablepayError::Rpc { code, message } => {
                assert_eq!(code, -32602);
                assert_eq!(message, "Invalid param: WrongSize");
            }
            _ => panic!("Expected Rpc error variant"),
        }
    }

    #[test]
    fn test_serialization_error_converts() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: StablepayError = parse_err.into();
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
