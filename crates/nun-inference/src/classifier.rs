//! Region classification, the first pipeline stage.
//!
//! Maps a free-text procedure description to one of the five NUN regions.
//! The capability is not a closed system, so anything outside the region
//! enumeration is treated as unknown instead of being trusted. Failures of
//! any kind surface as [`ClassificationResult::unknown`], never as errors.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use nun_core::{
    ClassificationResult, CompletionRequest, GenerationBackend, InferenceOperation, Region,
};

use crate::cache::MemoCache;
use crate::config::{CacheConfig, OperationSettings};
use crate::glossary::{classification_prompt, default_synonyms, SynonymMapping, SYSTEM_PROMPT};
use crate::response::{number_field, parse_json, string_field};

/// First-stage classifier: description → region.
pub struct RegionClassifier {
    backend: Arc<dyn GenerationBackend>,
    settings: OperationSettings,
    synonyms: Vec<SynonymMapping>,
    cache: MemoCache<ClassificationResult>,
}

impl RegionClassifier {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        settings: OperationSettings,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            backend,
            settings,
            synonyms: default_synonyms(),
            cache: MemoCache::from_config(cache),
        }
    }

    /// Replace the worked synonym mappings placed in the prompt.
    pub fn with_synonyms(mut self, synonyms: Vec<SynonymMapping>) -> Self {
        self.synonyms = synonyms;
        self
    }

    pub fn settings(&self) -> &OperationSettings {
        &self.settings
    }

    /// Build the completion request sent for `description`.
    pub fn build_request(&self, description: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
            ..CompletionRequest::json(
                InferenceOperation::Classification,
                SYSTEM_PROMPT,
                classification_prompt(description, &self.synonyms),
            )
        }
    }

    /// Classify a description into a region.
    ///
    /// Blank input short-circuits to unknown without calling the backend.
    /// Known regions are memoized by the exact description text.
    pub async fn classify(&self, description: &str) -> ClassificationResult {
        if description.trim().is_empty() {
            warn!(
                subsystem = "inference",
                component = "region_classifier",
                op = "classify",
                "Blank description, skipping classification"
            );
            return ClassificationResult::unknown();
        }

        if let Some(cached) = self.cache.get(description).await {
            debug!(
                subsystem = "inference",
                component = "region_classifier",
                op = "classify",
                cache_hit = true,
                region = ?cached.region,
                "Serving memoized classification"
            );
            return cached;
        }

        let start = Instant::now();
        let request = self.build_request(description);

        let response = match self.backend.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    subsystem = "inference",
                    component = "region_classifier",
                    op = "classify",
                    error_kind = e.kind(),
                    error = %e,
                    "Classification capability failed, region unknown"
                );
                return ClassificationResult::unknown();
            }
        };

        let result = parse_classification(&response);

        match result.region {
            Some(region) => {
                info!(
                    subsystem = "inference",
                    component = "region_classifier",
                    op = "classify",
                    region = %region,
                    confidence = result.confidence,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Classified description"
                );
                self.cache.put(description.to_string(), result.clone()).await;
            }
            None => {
                warn!(
                    subsystem = "inference",
                    component = "region_classifier",
                    op = "classify",
                    response_len = response.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Classification output unusable, region unknown"
                );
            }
        }

        result
    }
}

/// Parse a classification response.
///
/// Malformed JSON, a missing or empty region, or a region outside the five
/// codes all yield the unknown outcome.
pub fn parse_classification(response: &str) -> ClassificationResult {
    let Some(value) = parse_json(response) else {
        return ClassificationResult::unknown();
    };
    let Some(object) = value.as_object() else {
        return ClassificationResult::unknown();
    };

    let Some(region) = string_field(object, &["region", "región", "region_code"])
        .and_then(Region::from_code)
    else {
        return ClassificationResult::unknown();
    };

    let confidence = number_field(object, &["confidence", "confianza"]).unwrap_or(0.0);
    let rationale = string_field(object, &["rationale", "motivo", "razon", "razón"])
        .unwrap_or_default()
        .trim()
        .to_string();

    ClassificationResult::new(region, confidence, rationale)
}
