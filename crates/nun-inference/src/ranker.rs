//! Code ranking, the second pipeline stage.
//!
//! Given the description and the region-narrowed candidates, asks the
//! capability for an ordered shortlist. The ranker returns exactly what the
//! capability produced: no dropping, padding, or re-sorting. Shortlist
//! anomalies are surfaced later, at result resolution.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, trace, warn};

use nun_core::{CompletionRequest, GenerationBackend, InferenceOperation, ProcedureRecord, Suggestion};

use crate::cache::MemoCache;
use crate::config::{CacheConfig, OperationSettings};
use crate::glossary::{ranking_prompt, SYSTEM_PROMPT};
use crate::response::{number_field, parse_json, string_field};

/// Serialize candidates as a compact `code - description` listing.
///
/// Complexity and keywords are appended in brackets when present so the
/// capability can weigh them.
pub fn candidate_listing(candidates: &[&ProcedureRecord]) -> String {
    candidates
        .iter()
        .map(|record| {
            let mut line = format!("{} - {}", record.code.trim(), record.description.trim());

            let mut signals = Vec::new();
            if let Some(complexity) = non_blank(record.complexity.as_deref()) {
                signals.push(format!("complejidad: {}", complexity));
            }
            if let Some(keywords) = non_blank(record.keywords.as_deref()) {
                signals.push(format!("palabras clave: {}", keywords));
            }
            if !signals.is_empty() {
                line.push_str(&format!(" [{}]", signals.join("; ")));
            }

            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Memo key for a description and listing.
///
/// The description length prefix keeps the split point unambiguous when the
/// description itself contains newlines.
fn memo_key(description: &str, listing: &str) -> String {
    format!("{}:{}\n{}", description.len(), description, listing)
}

/// Second-stage ranker: description + candidates → ordered suggestions.
pub struct CodeRanker {
    backend: Arc<dyn GenerationBackend>,
    settings: OperationSettings,
    cache: MemoCache<Vec<Suggestion>>,
}

impl CodeRanker {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        settings: OperationSettings,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            backend,
            settings,
            cache: MemoCache::from_config(cache),
        }
    }

    pub fn settings(&self) -> &OperationSettings {
        &self.settings
    }

    /// Build the completion request for a description and listing.
    pub fn build_request(&self, description: &str, listing: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
            ..CompletionRequest::json(
                InferenceOperation::Ranking,
                SYSTEM_PROMPT,
                ranking_prompt(description, listing),
            )
        }
    }

    /// Rank candidates for a description.
    ///
    /// An empty candidate set returns no suggestions without calling the
    /// backend. Capability failure or malformed output also yields an empty
    /// list. Non-empty results are memoized by `(description, listing)`.
    pub async fn rank(&self, description: &str, candidates: &[&ProcedureRecord]) -> Vec<Suggestion> {
        if candidates.is_empty() {
            debug!(
                subsystem = "inference",
                component = "code_ranker",
                op = "rank",
                "No candidates, skipping ranking"
            );
            return Vec::new();
        }

        let listing = candidate_listing(candidates);
        let key = memo_key(description, &listing);

        if let Some(cached) = self.cache.get(&key).await {
            debug!(
                subsystem = "inference",
                component = "code_ranker",
                op = "rank",
                cache_hit = true,
                result_count = cached.len(),
                "Serving memoized ranking"
            );
            return cached;
        }

        let start = Instant::now();
        let request = self.build_request(description, &listing);

        let response = match self.backend.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    subsystem = "inference",
                    component = "code_ranker",
                    op = "rank",
                    error_kind = e.kind(),
                    error = %e,
                    "Ranking capability failed, no suggestions"
                );
                return Vec::new();
            }
        };

        let suggestions = match parse_suggestions(&response) {
            Some(suggestions) => suggestions,
            None => {
                warn!(
                    subsystem = "inference",
                    component = "code_ranker",
                    op = "rank",
                    response_len = response.len(),
                    "Ranking output malformed, no suggestions"
                );
                return Vec::new();
            }
        };

        for suggestion in &suggestions {
            trace!(code = %suggestion.code, confidence = suggestion.confidence, "Suggestion");
        }

        info!(
            subsystem = "inference",
            component = "code_ranker",
            op = "rank",
            candidate_count = candidates.len(),
            result_count = suggestions.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Ranked candidates"
        );

        if !suggestions.is_empty() {
            self.cache.put(key, suggestions.clone()).await;
        }

        suggestions
    }
}

/// Parse a ranking response into suggestions, in the order given.
///
/// Accepts `{"codigos_sugeridos": [...]}`, `{"suggestions": [...]}` or a
/// bare array. Returns `None` when the shape is wrong or any item lacks a
/// code, since such output cannot be reported item by item.
pub fn parse_suggestions(response: &str) -> Option<Vec<Suggestion>> {
    let value = parse_json(response)?;

    let items = match &value {
        Value::Array(items) => items,
        Value::Object(object) => ["codigos_sugeridos", "suggestions", "codigos", "codes"]
            .iter()
            .find_map(|k| object.get(*k))?
            .as_array()?,
        _ => return None,
    };

    items
        .iter()
        .map(|item| {
            let object = item.as_object()?;
            let code = string_field(object, &["codigo", "código", "code"])?.trim();
            if code.is_empty() {
                return None;
            }
            let rationale = string_field(object, &["motivo", "rationale", "razon", "razón"])
                .unwrap_or_default()
                .trim();
            let confidence = number_field(object, &["confianza", "confidence"]).unwrap_or(0.0);
            Some(Suggestion::new(code, rationale, confidence))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGenerationBackend;
    use nun_core::{Fees, Region};

    fn record(code: &str, description: &str) -> ProcedureRecord {
        ProcedureRecord {
            code: code.to_string(),
            description: description.to_string(),
            region: Region::PelvisHip,
            complexity: None,
            keywords: None,
            fees: Fees::default(),
        }
    }

    fn ranker(backend: MockGenerationBackend) -> CodeRanker {
        CodeRanker::new(
            Arc::new(backend),
            OperationSettings::ranking(),
            &CacheConfig::default(),
        )
    }

    const RANKING: &str = r#"{"codigos_sugeridos": [
        {"codigo": "PC.05.07", "motivo": "osteosíntesis de fémur proximal", "confianza": 0.9},
        {"codigo": "PC.05.08", "motivo": "prótesis parcial", "confianza": 0.7},
        {"codigo": "PC.01.01", "motivo": "reducción cerrada", "confianza": 0.4}
    ]}"#;

    #[test]
    fn test_candidate_listing_format() {
        let mut with_signals = record("PC.05.08", "Prótesis parcial de cadera");
        with_signals.complexity = Some("Alta".to_string());
        with_signals.keywords = Some("hemiartroplastia".to_string());
        let blank_signals = ProcedureRecord {
            keywords: Some("  ".to_string()),
            ..record("PC.05.07", "Osteosíntesis de fémur proximal")
        };

        let listing = candidate_listing(&[&blank_signals, &with_signals]);
        assert_eq!(
            listing,
            "PC.05.07 - Osteosíntesis de fémur proximal\n\
             PC.05.08 - Prótesis parcial de cadera [complejidad: Alta; palabras clave: hemiartroplastia]"
        );
    }

    #[test]
    fn test_parse_suggestions_preserves_order() {
        let suggestions = parse_suggestions(RANKING).unwrap();
        let codes: Vec<&str> = suggestions.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["PC.05.07", "PC.05.08", "PC.01.01"]);
        assert_eq!(suggestions[1].rationale, "prótesis parcial");
    }

    #[test]
    fn test_parse_suggestions_does_not_sort_or_trim_count() {
        let response = r#"[
            {"code": "A", "confidence": 0.2},
            {"code": "B", "confidence": 0.9}
        ]"#;
        let suggestions = parse_suggestions(response).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].code, "A");
    }

    #[test]
    fn test_parse_suggestions_rejects_item_without_code() {
        let response = r#"{"suggestions": [{"code": "A"}, {"motivo": "sin código"}]}"#;
        assert!(parse_suggestions(response).is_none());
    }

    #[test]
    fn test_parse_suggestions_rejects_wrong_shape() {
        assert!(parse_suggestions(r#"{"codigos_sugeridos": "PC.05.07"}"#).is_none());
        assert!(parse_suggestions(r#"{"otra_cosa": []}"#).is_none());
        assert!(parse_suggestions("no es json").is_none());
    }

    #[test]
    fn test_parse_empty_list_is_valid() {
        assert_eq!(parse_suggestions(r#"{"codigos_sugeridos": []}"#), Some(vec![]));
    }

    #[tokio::test]
    async fn test_rank_returns_capability_output() {
        let backend = MockGenerationBackend::new().with_response(InferenceOperation::Ranking, RANKING);
        let a = record("PC.05.07", "Osteosíntesis de fémur proximal");
        let suggestions = ranker(backend).rank("fractura de cadera", &[&a]).await;
        // PC.05.08 and PC.01.01 were not in the listing; they are still returned.
        assert_eq!(suggestions.len(), 3);
    }

    #[tokio::test]
    async fn test_rank_empty_candidates_makes_no_call() {
        let backend = MockGenerationBackend::new().with_response(InferenceOperation::Ranking, RANKING);
        let suggestions = ranker(backend.clone()).rank("fractura de cadera", &[]).await;
        assert!(suggestions.is_empty());
        assert_eq!(backend.call_count(InferenceOperation::Ranking), 0);
    }

    #[tokio::test]
    async fn test_rank_failure_is_empty() {
        let backend = MockGenerationBackend::new().with_failure_rate(1.0);
        let a = record("PC.05.07", "Osteosíntesis");
        assert!(ranker(backend).rank("cadera", &[&a]).await.is_empty());
    }

    #[tokio::test]
    async fn test_rank_memoizes_identical_inputs() {
        let backend = MockGenerationBackend::new().with_response(InferenceOperation::Ranking, RANKING);
        let ranker = ranker(backend.clone());
        let a = record("PC.05.07", "Osteosíntesis de fémur proximal");
        let b = record("PC.05.08", "Prótesis parcial de cadera");

        let first = ranker.rank("fractura de cadera", &[&a, &b]).await;
        let second = ranker.rank("fractura de cadera", &[&a, &b]).await;
        assert_eq!(first, second);
        assert_eq!(backend.call_count(InferenceOperation::Ranking), 1);

        // A different candidate set is a different key.
        ranker.rank("fractura de cadera", &[&a]).await;
        assert_eq!(backend.call_count(InferenceOperation::Ranking), 2);
    }

    #[tokio::test]
    async fn test_rank_memo_does_not_merge_description_into_listing() {
        let backend = MockGenerationBackend::new().with_response(InferenceOperation::Ranking, RANKING);
        let ranker = ranker(backend.clone());
        let a = record("PC.05.07", "Osteosíntesis de fémur proximal");
        let b = record("PC.05.08", "Prótesis parcial de cadera");

        // Joined with a bare newline, both pairs would produce the same text.
        ranker
            .rank("cadera\nPC.05.08 - Prótesis parcial de cadera", &[&a])
            .await;
        ranker.rank("cadera", &[&b, &a]).await;
        assert_eq!(backend.call_count(InferenceOperation::Ranking), 2);
    }

    #[test]
    fn test_memo_key_distinguishes_split_point() {
        assert_ne!(memo_key("a\nb", "c"), memo_key("a", "b\nc"));
        assert_eq!(memo_key("a", "b"), memo_key("a", "b"));
    }

    #[tokio::test]
    async fn test_build_request_carries_listing() {
        let ranker = ranker(MockGenerationBackend::new());
        let request = ranker.build_request("cadera", "PC.05.07 - Osteosíntesis");
        assert_eq!(request.operation, InferenceOperation::Ranking);
        assert_eq!(request.temperature, Some(0.3));
        assert!(request.prompt.contains("PC.05.07 - Osteosíntesis"));
    }
}
