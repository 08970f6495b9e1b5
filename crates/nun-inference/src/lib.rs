//! # nun-inference
//!
//! Language-understanding stages of the NUN lookup pipeline.
//!
//! This crate provides:
//! - An OpenAI-compatible backend (feature `openai`, default)
//! - Lookup configuration with per-stage model routing
//! - A bounded memo cache for capability calls
//! - The anatomical glossary and prompt builders
//! - [`RegionClassifier`], the first stage
//! - [`CodeRanker`], the second stage
//!
//! # Feature Flags
//!
//! - `openai` (default): Enable the OpenAI-compatible backend
//! - `mock`: Expose [`mock::MockGenerationBackend`] to dependent crates' tests
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nun_inference::{LookupConfig, OpenAIBackend, RegionClassifier};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = LookupConfig::from_env();
//!     let backend = Arc::new(OpenAIBackend::new(config.backend.clone()).unwrap());
//!     let classifier = RegionClassifier::new(
//!         backend,
//!         config.routing.classification.clone(),
//!         &config.cache,
//!     );
//!     let result = classifier.classify("fractura de cadera").await;
//!     println!("{:?}", result.region);
//! }
//! ```

pub mod cache;
pub mod classifier;
pub mod config;
pub mod glossary;
pub mod ranker;
pub mod response;

#[cfg(feature = "openai")]
pub mod openai;

// Mock generation backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use nun_core::*;

#[cfg(feature = "openai")]
pub use openai::OpenAIBackend;

pub use cache::MemoCache;
pub use classifier::{parse_classification, RegionClassifier};
pub use config::{
    CacheConfig, ConfigError, LookupConfig, OpenAIConfig, OperationSettings, RoutingConfig,
};
pub use glossary::{default_synonyms, SynonymMapping};
pub use ranker::{candidate_listing, parse_suggestions, CodeRanker};
