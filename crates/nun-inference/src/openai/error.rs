//! Mapping of chat-completion failures onto [`BackendFailure`].

use nun_core::{BackendFailure, Error};

use super::types::OpenAIError;

/// Classify a non-success response by status, then by the body's error
/// `type` and `code` where the status alone is ambiguous.
pub fn failure_from_status(status: u16, body: Option<&OpenAIError>) -> BackendFailure {
    let mentions = |needle: &str| {
        body.map(|e| {
            e.error_type.contains(needle) || e.code.as_deref().is_some_and(|c| c.contains(needle))
        })
        .unwrap_or(false)
    };

    match status {
        401 | 403 => BackendFailure::Unauthorized,
        429 => BackendFailure::RateLimited,
        404 => BackendFailure::ModelUnavailable,
        408 | 500..=599 => BackendFailure::Unavailable,
        _ if mentions("model_not_found") => BackendFailure::ModelUnavailable,
        _ if mentions("context_length") => BackendFailure::PromptTooLong,
        413 => BackendFailure::PromptTooLong,
        _ => BackendFailure::Rejected,
    }
}

/// Error for a rejected chat completion.
pub fn status_error(status: u16, body: Option<&OpenAIError>) -> Error {
    let failure = failure_from_status(status, body);
    let detail = body.map(|e| e.message.as_str()).unwrap_or("no error body");
    Error::backend(failure, format!("HTTP {}: {}", status, detail))
}

/// Error for a request that never produced a response.
pub fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() || e.is_connect() {
        Error::backend(BackendFailure::Unavailable, e.to_string())
    } else {
        Error::Request(e.to_string())
    }
}
