//! Result resolution: ranked suggestions → catalog records.
//!
//! Each suggestion is checked against the candidate set it was ranked from
//! and then against the whole catalog. Anything that does not resolve is
//! kept in place with a distinct status so the capability's contract
//! violations stay visible. Shortlist-level anomalies (size, duplicates,
//! ordering) are reported as notices; nothing is dropped, padded or sorted.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use nun_core::defaults::{MAX_SUGGESTIONS, MIN_SUGGESTIONS};
use nun_core::{Catalog, ProcedureRecord, Region, Suggestion};

/// Notice for a code the catalog does not contain.
pub const NOT_IN_CATALOG: &str = "suggested code not found in catalog";

/// Notice for a catalog code that was not among the ranked candidates.
pub const OUTSIDE_CANDIDATES: &str = "suggested code not in the candidate listing";

/// How a single suggested code resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// The code was in the candidate listing.
    Found { record: ProcedureRecord },
    /// The code does not exist in the catalog.
    NotInCatalog,
    /// The code exists, but belongs to records that were not offered to the ranker.
    OutsideCandidates { region: Region },
}

/// A suggestion paired with its resolution, in ranker order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSuggestion {
    pub suggestion: Suggestion,
    pub resolution: Resolution,
}

impl ResolvedSuggestion {
    /// The resolved record, if the code was a valid candidate.
    pub fn record(&self) -> Option<&ProcedureRecord> {
        match &self.resolution {
            Resolution::Found { record } => Some(record),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.resolution, Resolution::Found { .. })
    }

    /// Per-item notice for unresolved suggestions.
    pub fn notice(&self) -> Option<&'static str> {
        match self.resolution {
            Resolution::Found { .. } => None,
            Resolution::NotInCatalog => Some(NOT_IN_CATALOG),
            Resolution::OutsideCandidates { .. } => Some(OUTSIDE_CANDIDATES),
        }
    }
}

/// Anomaly in the shape of the shortlist as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShortlistNotice {
    TooFew { count: usize },
    TooMany { count: usize },
    Duplicate { code: String },
    NotDescending,
}

impl fmt::Display for ShortlistNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortlistNotice::TooFew { count } => write!(
                f,
                "only {} suggestion(s) returned, expected at least {}",
                count, MIN_SUGGESTIONS
            ),
            ShortlistNotice::TooMany { count } => write!(
                f,
                "{} suggestions returned, expected at most {}",
                count, MAX_SUGGESTIONS
            ),
            ShortlistNotice::Duplicate { code } => write!(f, "code {} suggested more than once", code),
            ShortlistNotice::NotDescending => {
                write!(f, "suggestions are not ordered by descending confidence")
            }
        }
    }
}

/// Resolve suggestions against the candidates they were ranked from.
pub fn resolve(
    suggestions: Vec<Suggestion>,
    catalog: &Catalog,
    candidates: &[&ProcedureRecord],
) -> Vec<ResolvedSuggestion> {
    suggestions
        .into_iter()
        .map(|suggestion| {
            let code = suggestion.code.trim();
            let resolution = match candidates.iter().find(|r| r.code.trim() == code) {
                Some(record) => Resolution::Found {
                    record: (*record).clone(),
                },
                None => match catalog.get(code) {
                    Some(record) => {
                        warn!(
                            subsystem = "search",
                            component = "resolution",
                            op = "resolve",
                            code = %code,
                            region = %record.region,
                            "Suggested code outside candidate listing"
                        );
                        Resolution::OutsideCandidates {
                            region: record.region,
                        }
                    }
                    None => {
                        warn!(
                            subsystem = "search",
                            component = "resolution",
                            op = "resolve",
                            code = %code,
                            "Suggested code not found in catalog"
                        );
                        Resolution::NotInCatalog
                    }
                },
            };
            ResolvedSuggestion {
                suggestion,
                resolution,
            }
        })
        .collect()
}

/// Flag shortlist anomalies without altering the list.
pub fn shortlist_notices(suggestions: &[Suggestion]) -> Vec<ShortlistNotice> {
    let mut notices = Vec::new();
    let count = suggestions.len();

    if count < MIN_SUGGESTIONS {
        notices.push(ShortlistNotice::TooFew { count });
    } else if count > MAX_SUGGESTIONS {
        notices.push(ShortlistNotice::TooMany { count });
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for suggestion in suggestions {
        let code = suggestion.code.trim();
        if !seen.insert(code) && reported.insert(code) {
            notices.push(ShortlistNotice::Duplicate {
                code: code.to_string(),
            });
        }
    }

    if suggestions
        .windows(2)
        .any(|pair| pair[1].confidence > pair[0].confidence)
    {
        notices.push(ShortlistNotice::NotDescending);
    }

    notices
}
