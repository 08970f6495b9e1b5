//! OpenAI-compatible inference backend.
//!
//! Works with any endpoint exposing `/chat/completions` with
//! `response_format: {"type": "json_object"}` support, including:
//!
//! - OpenAI cloud API
//! - Azure OpenAI
//! - Ollama (in OpenAI compatibility mode)
//! - vLLM, LocalAI, LM Studio
//!
//! # Example
//!
//! ```rust,no_run
//! use nun_inference::openai::{OpenAIBackend, OpenAIConfig};
//!
//! let config = OpenAIConfig {
//!     base_url: "http://localhost:11434/v1".to_string(), // Ollama
//!     model: "llama3".to_string(),
//!     ..Default::default()
//! };
//! let backend = OpenAIBackend::new(config).unwrap();
//! ```

mod backend;
mod error;
mod types;

pub use backend::OpenAIBackend;
pub use crate::config::{OpenAIConfig, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{failure_from_status, status_error, transport_error};
pub use types::*;
