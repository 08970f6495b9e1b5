//! Two-stage lookup: classify → filter → rank → resolve.
//!
//! Stages run strictly in sequence. An unknown region ends the lookup
//! before the catalog is narrowed, and an empty candidate set ends it
//! before the ranker is called. Capability failures never escape as
//! errors; each terminal state is a distinct [`SearchOutcome`] variant.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use nun_core::{
    Catalog, ClassificationResult, Error, GenerationBackend, HistoryEntry, ProcedureRecord,
    Region, Result, SearchHistory,
};
use nun_inference::{CodeRanker, LookupConfig, RegionClassifier};

use crate::filter::filter_by_region;
use crate::resolution::{resolve, shortlist_notices, ResolvedSuggestion, ShortlistNotice};

/// Terminal state of a lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Classification failed or produced a label outside the five regions.
    UnknownRegion { classification: ClassificationResult },
    /// The region is valid but the catalog holds no records for it.
    NoCandidates { classification: ClassificationResult },
    /// Ranking failed or returned nothing usable.
    NoSuggestions {
        classification: ClassificationResult,
        candidate_count: usize,
    },
    /// Ranked suggestions with per-item resolution and shortlist notices.
    Suggestions {
        classification: ClassificationResult,
        candidate_count: usize,
        resolved: Vec<ResolvedSuggestion>,
        notices: Vec<ShortlistNotice>,
    },
}

impl SearchOutcome {
    pub fn classification(&self) -> &ClassificationResult {
        match self {
            SearchOutcome::UnknownRegion { classification }
            | SearchOutcome::NoCandidates { classification }
            | SearchOutcome::NoSuggestions { classification, .. }
            | SearchOutcome::Suggestions { classification, .. } => classification,
        }
    }

    pub fn region(&self) -> Option<Region> {
        self.classification().region
    }

    /// Resolved suggestions; empty for every other outcome.
    pub fn resolved(&self) -> &[ResolvedSuggestion] {
        match self {
            SearchOutcome::Suggestions { resolved, .. } => resolved,
            _ => &[],
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SearchOutcome::UnknownRegion { .. } => "unknown_region",
            SearchOutcome::NoCandidates { .. } => "no_candidates",
            SearchOutcome::NoSuggestions { .. } => "no_suggestions",
            SearchOutcome::Suggestions { .. } => "suggestions",
        }
    }
}

/// The lookup pipeline over a read-only catalog.
pub struct LookupPipeline {
    catalog: Arc<Catalog>,
    classifier: RegionClassifier,
    ranker: CodeRanker,
}

impl LookupPipeline {
    pub fn new(catalog: Arc<Catalog>, classifier: RegionClassifier, ranker: CodeRanker) -> Self {
        Self {
            catalog,
            classifier,
            ranker,
        }
    }

    /// Build both stages over one backend using the routing and cache settings.
    pub fn from_config(
        catalog: Arc<Catalog>,
        backend: Arc<dyn GenerationBackend>,
        config: &LookupConfig,
    ) -> Self {
        let classifier = RegionClassifier::new(
            backend.clone(),
            config.routing.classification.clone(),
            &config.cache,
        );
        let ranker = CodeRanker::new(backend, config.routing.ranking.clone(), &config.cache);
        Self::new(catalog, classifier, ranker)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run only the first stage.
    pub async fn classify(&self, description: &str) -> Result<ClassificationResult> {
        let description = non_blank(description)?;
        Ok(self.classifier.classify(description).await)
    }

    /// Catalog records for a region, in catalog order.
    pub fn candidates(&self, region: Region) -> Vec<&ProcedureRecord> {
        filter_by_region(&self.catalog, region)
    }

    /// Run the full lookup for a description.
    ///
    /// Returns `Error::InvalidInput` for blank input; every other condition
    /// is reported through the outcome.
    #[instrument(skip(self), fields(
        subsystem = "search",
        component = "pipeline",
        op = "search",
    ))]
    pub async fn search(&self, description: &str) -> Result<SearchOutcome> {
        let description = non_blank(description)?;
        let start = Instant::now();

        let classification = self.classifier.classify(description).await;
        let Some(region) = classification.region else {
            warn!(
                duration_ms = start.elapsed().as_millis() as u64,
                "Region unknown, halting before ranking"
            );
            return Ok(SearchOutcome::UnknownRegion { classification });
        };

        let candidates = filter_by_region(&self.catalog, region);
        debug!(
            region = %region,
            candidate_count = candidates.len(),
            "Narrowed catalog to region"
        );
        if candidates.is_empty() {
            info!(region = %region, "No catalog records for region");
            return Ok(SearchOutcome::NoCandidates { classification });
        }

        let suggestions = self.ranker.rank(description, &candidates).await;
        let outcome = if suggestions.is_empty() {
            SearchOutcome::NoSuggestions {
                classification,
                candidate_count: candidates.len(),
            }
        } else {
            let notices = shortlist_notices(&suggestions);
            for notice in &notices {
                warn!(notice = %notice, "Shortlist anomaly");
            }
            SearchOutcome::Suggestions {
                candidate_count: candidates.len(),
                resolved: resolve(suggestions, &self.catalog, &candidates),
                notices,
                classification,
            }
        };

        info!(
            region = %region,
            outcome = outcome.label(),
            result_count = outcome.resolved().len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Lookup complete"
        );
        Ok(outcome)
    }

    /// Run [`search`](Self::search) and record successful lookups in `history`.
    pub async fn search_with_history(
        &self,
        description: &str,
        history: &mut SearchHistory,
    ) -> Result<SearchOutcome> {
        let description = non_blank(description)?;
        let outcome = self.search(description).await?;

        if let SearchOutcome::Suggestions {
            classification,
            resolved,
            ..
        } = &outcome
        {
            if let Some(region) = classification.region {
                let suggestions: Vec<_> = resolved.iter().map(|r| r.suggestion.clone()).collect();
                history.append(HistoryEntry::new(description, region, &suggestions));
            }
        }

        Ok(outcome)
    }
}

fn non_blank(description: &str) -> Result<&str> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(
            "Procedure description is empty".to_string(),
        ));
    }
    Ok(trimmed)
}
