//! OpenAI-compatible inference backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use nun_core::{CompletionRequest, Error, GenerationBackend, Result};

use super::error::{status_error, transport_error};
use super::types::*;
use crate::config::OpenAIConfig;

/// OpenAI-compatible inference backend.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let mut client_builder =
            Client::builder().timeout(Duration::from_secs(config.timeout_seconds));

        if config.skip_tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            model = %config.model,
            "Initializing OpenAI backend: url={}",
            config.base_url
        );

        Ok(Self { client, config })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OpenAIConfig::default())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }

    fn build_messages(request: &CompletionRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);

        if !request.system.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: request.system.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        messages
    }
}

#[async_trait]
impl GenerationBackend for OpenAIBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.model.clone());
        let start = Instant::now();

        debug!(
            subsystem = "inference",
            component = "openai",
            op = %request.operation,
            model = %model,
            prompt_len = request.prompt.len(),
            "Sending chat completion"
        );

        let body = ChatCompletionRequest {
            model,
            messages: Self::build_messages(request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_response.then(ResponseFormat::json_object),
        };

        let response = self
            .build_request("/chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.json::<OpenAIErrorResponse>().await.ok();
            let err = status_error(status, body.as_ref().map(|b| &b.error));
            warn!(
                subsystem = "inference",
                component = "openai",
                op = %request.operation,
                status,
                error_kind = err.kind(),
                error = %err,
                "Chat completion rejected"
            );
            return Err(err);
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Inference("Response contained no message content".to_string()))?;

        debug!(
            subsystem = "inference",
            component = "openai",
            op = %request.operation,
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat completion finished"
        );
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL};
    use nun_core::InferenceOperation;

    #[test]
    fn test_backend_creation() {
        let backend = OpenAIBackend::with_defaults().unwrap();
        assert_eq!(backend.config().base_url, DEFAULT_OPENAI_URL);
        assert_eq!(backend.model_name(), DEFAULT_GEN_MODEL);
    }

    #[test]
    fn test_messages_skip_empty_system() {
        let request = CompletionRequest::json(InferenceOperation::Ranking, "", "prompt");
        let messages = OpenAIBackend::build_messages(&request);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }

    #[test]
    fn test_messages_include_system() {
        let request =
            CompletionRequest::json(InferenceOperation::Classification, "system", "prompt");
        let messages = OpenAIBackend::build_messages(&request);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "prompt");
    }
}
