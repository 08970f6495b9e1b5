//! Error types for NUN code lookup.

use thiserror::Error;

/// Result type alias using the lookup Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a generation backend rejected or failed a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendFailure {
    /// Credentials missing or rejected.
    Unauthorized,
    /// Too many requests; retry later.
    RateLimited,
    /// The routed model does not exist on the endpoint.
    ModelUnavailable,
    /// Description plus candidate listing exceeded the model context.
    PromptTooLong,
    /// Endpoint unreachable, timed out, or returned a server error.
    Unavailable,
    /// Any other rejected request.
    Rejected,
}

impl BackendFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendFailure::Unauthorized => "unauthorized",
            BackendFailure::RateLimited => "rate_limited",
            BackendFailure::ModelUnavailable => "model_unavailable",
            BackendFailure::PromptTooLong => "prompt_too_long",
            BackendFailure::Unavailable => "unavailable",
            BackendFailure::Rejected => "rejected",
        }
    }

    /// Whether an identical request may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendFailure::RateLimited | BackendFailure::Unavailable)
    }
}

impl std::fmt::Display for BackendFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type for lookup operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Catalog could not be built (duplicate or malformed records)
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Generation backend rejected or failed the request
    #[error("Backend {failure}: {message}")]
    Backend {
        failure: BackendFailure,
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn backend(failure: BackendFailure, message: impl Into<String>) -> Self {
        Error::Backend {
            failure,
            message: message.into(),
        }
    }

    /// Short machine-readable label, used as the `error_kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Catalog(_) => "catalog",
            Error::Inference(_) => "inference",
            Error::Backend { failure, .. } => failure.as_str(),
            Error::Serialization(_) => "serialization",
            Error::Config(_) => "config",
            Error::InvalidInput(_) => "invalid_input",
            Error::Request(_) => "request",
            Error::Internal(_) => "internal",
            Error::Io(_) => "io",
        }
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Backend { failure, .. } => failure.is_transient(),
            Error::Request(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("MS.01.01".to_string());
        assert_eq!(err.to_string(), "Not found: MS.01.01");
    }

    #[test]
    fn test_error_display_catalog() {
        let err = Error::Catalog("duplicate code PC.05.07".to_string());
        assert_eq!(err.to_string(), "Catalog error: duplicate code PC.05.07");
    }

    #[test]
    fn test_error_display_inference() {
        let err = Error::Inference("model timeout".to_string());
        assert_eq!(err.to_string(), "Inference error: model timeout");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty description".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty description");
    }

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_display_backend() {
        let err = Error::backend(BackendFailure::RateLimited, "slow down");
        assert_eq!(err.to_string(), "Backend rate_limited: slow down");
    }

    #[test]
    fn test_error_kind_labels() {
        assert_eq!(
            Error::backend(BackendFailure::Unauthorized, "bad key").kind(),
            "unauthorized"
        );
        assert_eq!(Error::Inference("empty".to_string()).kind(), "inference");
        assert_eq!(Error::Request("timeout".to_string()).kind(), "request");
        assert_eq!(Error::Config("x".to_string()).kind(), "config");
    }

    #[test]
    fn test_error_is_transient() {
        assert!(Error::backend(BackendFailure::RateLimited, "").is_transient());
        assert!(Error::backend(BackendFailure::Unavailable, "").is_transient());
        assert!(Error::Request("connection reset".to_string()).is_transient());
        assert!(!Error::backend(BackendFailure::Unauthorized, "").is_transient());
        assert!(!Error::backend(BackendFailure::PromptTooLong, "").is_transient());
        assert!(!Error::Inference("no content".to_string()).is_transient());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
