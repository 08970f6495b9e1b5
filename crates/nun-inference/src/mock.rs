//! Mock generation backend for deterministic testing.
//!
//! Responses are scripted per pipeline stage, optionally keyed on a
//! substring of the prompt, and every call is logged for assertions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nun_inference::mock::MockGenerationBackend;
//! use nun_core::InferenceOperation;
//!
//! let backend = MockGenerationBackend::new()
//!     .with_response(InferenceOperation::Classification, r#"{"region": "PC"}"#)
//!     .with_prompt_response(
//!         InferenceOperation::Classification,
//!         "muñeca",
//!         r#"{"region": "MS"}"#,
//!     );
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use nun_core::{CompletionRequest, Error, GenerationBackend, InferenceOperation, Result};

/// Mock generation backend for testing.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    model: String,
    default_responses: HashMap<InferenceOperation, String>,
    prompt_responses: Vec<(InferenceOperation, String, String)>,
    failing_operations: Vec<InferenceOperation>,
    latency_ms: u64,
    failure_rate: f64,
}

/// A recorded backend call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub request: CompletionRequest,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            model: "mock-model".to_string(),
            default_responses: HashMap::new(),
            prompt_responses: Vec::new(),
            failing_operations: Vec::new(),
            latency_ms: 0,
            failure_rate: 0.0,
        }
    }
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the response returned for an operation when no prompt rule matches.
    pub fn with_response(
        mut self,
        operation: InferenceOperation,
        response: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .default_responses
            .insert(operation, response.into());
        self
    }

    /// Return `response` when the prompt contains `needle`. First match wins.
    pub fn with_prompt_response(
        mut self,
        operation: InferenceOperation,
        needle: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config).prompt_responses.push((
            operation,
            needle.into(),
            response.into(),
        ));
        self
    }

    /// Make every call for `operation` fail.
    pub fn with_failing_operation(mut self, operation: InferenceOperation) -> Self {
        Arc::make_mut(&mut self.config)
            .failing_operations
            .push(operation);
        self
    }

    /// Set simulated latency for all operations.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Set failure rate (0.0 - 1.0) for testing error handling.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        Arc::make_mut(&mut self.config).failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of calls made for an operation.
    pub fn call_count(&self, operation: InferenceOperation) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.request.operation == operation)
            .count()
    }

    /// Total number of calls across operations.
    pub fn total_calls(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    fn log_call(&self, request: &CompletionRequest) {
        self.call_log.lock().unwrap().push(MockCall {
            request: request.clone(),
            timestamp: std::time::Instant::now(),
        });
    }

    fn should_fail(&self, operation: InferenceOperation) -> bool {
        use rand::Rng;
        if self.config.failing_operations.contains(&operation) {
            return true;
        }
        if self.config.failure_rate > 0.0 {
            rand::thread_rng().gen::<f64>() < self.config.failure_rate
        } else {
            false
        }
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.log_call(request);
        self.simulate_latency().await;

        if self.should_fail(request.operation) {
            return Err(Error::Inference(
                "Simulated failure for testing".to_string(),
            ));
        }

        let scripted = self
            .config
            .prompt_responses
            .iter()
            .find(|(op, needle, _)| *op == request.operation && request.prompt.contains(needle))
            .map(|(_, _, response)| response)
            .or_else(|| self.config.default_responses.get(&request.operation));

        scripted.cloned().ok_or_else(|| {
            Error::Inference(format!(
                "No scripted response for {} request",
                request.operation
            ))
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(operation: InferenceOperation, prompt: &str) -> CompletionRequest {
        CompletionRequest::json(operation, "", prompt)
    }

    #[tokio::test]
    async fn test_default_response_per_operation() {
        let backend = MockGenerationBackend::new()
            .with_response(InferenceOperation::Classification, "class")
            .with_response(InferenceOperation::Ranking, "rank");

        let c = backend
            .complete(&request(InferenceOperation::Classification, "x"))
            .await
            .unwrap();
        let r = backend
            .complete(&request(InferenceOperation::Ranking, "x"))
            .await
            .unwrap();
        assert_eq!(c, "class");
        assert_eq!(r, "rank");
    }

    #[tokio::test]
    async fn test_prompt_rule_takes_precedence() {
        let backend = MockGenerationBackend::new()
            .with_response(InferenceOperation::Classification, "default")
            .with_prompt_response(InferenceOperation::Classification, "muñeca", "wrist");

        let hit = backend
            .complete(&request(InferenceOperation::Classification, "fractura de muñeca"))
            .await
            .unwrap();
        let miss = backend
            .complete(&request(InferenceOperation::Classification, "fractura de cadera"))
            .await
            .unwrap();
        assert_eq!(hit, "wrist");
        assert_eq!(miss, "default");
    }

    #[tokio::test]
    async fn test_unscripted_operation_fails() {
        let backend = MockGenerationBackend::new();
        let result = backend
            .complete(&request(InferenceOperation::Ranking, "x"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_call_logging() {
        let backend = MockGenerationBackend::new()
            .with_response(InferenceOperation::Classification, "{}");

        backend
            .complete(&request(InferenceOperation::Classification, "a"))
            .await
            .unwrap();
        let _ = backend
            .complete(&request(InferenceOperation::Ranking, "b"))
            .await;

        assert_eq!(backend.call_count(InferenceOperation::Classification), 1);
        assert_eq!(backend.call_count(InferenceOperation::Ranking), 1);
        assert_eq!(backend.get_calls()[1].request.prompt, "b");

        backend.clear_calls();
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_failing_operation() {
        let backend = MockGenerationBackend::new()
            .with_response(InferenceOperation::Classification, "{}")
            .with_response(InferenceOperation::Ranking, "{}")
            .with_failing_operation(InferenceOperation::Ranking);

        assert!(backend
            .complete(&request(InferenceOperation::Classification, "a"))
            .await
            .is_ok());
        assert!(backend
            .complete(&request(InferenceOperation::Ranking, "a"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_failure_simulation() {
        let backend = MockGenerationBackend::new()
            .with_response(InferenceOperation::Classification, "{}")
            .with_failure_rate(1.0);
        assert!(backend
            .complete(&request(InferenceOperation::Classification, "a"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_latency_simulation() {
        let backend = MockGenerationBackend::new()
            .with_response(InferenceOperation::Classification, "{}")
            .with_latency_ms(50);

        let start = std::time::Instant::now();
        backend
            .complete(&request(InferenceOperation::Classification, "a"))
            .await
            .unwrap();
        assert!(start.elapsed().as_millis() >= 50, "Should simulate latency");
    }
}
