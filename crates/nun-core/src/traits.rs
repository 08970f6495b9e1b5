//! Core traits for the external language-understanding capability.
//!
//! The lookup pipeline never talks to a model provider directly. It builds a
//! [`CompletionRequest`] and hands it to a [`GenerationBackend`].

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which pipeline stage a completion request serves.
///
/// Used for per-stage model routing, cache partitioning and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceOperation {
    /// Free text to anatomical region.
    Classification,
    /// Free text plus candidates to ordered suggestions.
    Ranking,
}

impl InferenceOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::Ranking => "ranking",
        }
    }
}

impl fmt::Display for InferenceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structured completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub operation: InferenceOperation,
    /// Model override; the backend default is used when `None`.
    pub model: Option<String>,
    pub system: String,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Constrain the response to a single JSON object.
    pub json_response: bool,
}

impl CompletionRequest {
    /// A JSON-object request with no model, temperature or token overrides.
    pub fn json(
        operation: InferenceOperation,
        system: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            model: None,
            system: system.into(),
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
            json_response: true,
        }
    }
}

/// Backend capable of answering structured completion requests.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run a completion and return the raw response text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Model used when a request carries no override.
    fn model_name(&self) -> &str;
}
