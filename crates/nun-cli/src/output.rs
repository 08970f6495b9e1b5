//! Plain-text rendering of lookup results.

use nun_core::{Catalog, ClassificationResult, Fees, ProcedureRecord, Region, SearchHistory};
use nun_search::{ResolvedSuggestion, SearchOutcome};

/// Format an amount as `$1,234,567.89`.
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Fee line listing only non-zero amounts.
pub fn render_fees(fees: &Fees) -> Option<String> {
    let parts: Vec<String> = [
        ("surgeon", fees.surgeon),
        ("assistant", fees.assistant),
        ("total", fees.total),
    ]
    .iter()
    .filter(|(_, amount)| *amount > 0.0)
    .map(|(label, amount)| format!("{} {}", label, format_amount(*amount)))
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

pub fn render_classification(classification: &ClassificationResult) -> String {
    match classification.region {
        Some(region) => {
            let mut out = format!(
                "Region: {} - {} (confidence {:.0}%)",
                region.code(),
                region.label(),
                classification.confidence * 100.0
            );
            if !classification.rationale.is_empty() {
                out.push_str(&format!("\n  {}", classification.rationale));
            }
            out
        }
        None => "Region: unknown. Try a more specific anatomical description.".to_string(),
    }
}

fn render_suggestion(rank: usize, item: &ResolvedSuggestion) -> String {
    let suggestion = &item.suggestion;
    let mut out = format!(
        "{}. {} ({:.0}%)",
        rank,
        suggestion.code,
        suggestion.confidence * 100.0
    );

    match item.record() {
        Some(record) => {
            out.push_str(&format!(" {}", record.description));
            if let Some(complexity) = record.complexity.as_deref().filter(|c| !c.trim().is_empty())
            {
                out.push_str(&format!(" [{}]", complexity.trim()));
            }
            if let Some(fees) = render_fees(&record.fees) {
                out.push_str(&format!("\n   {}", fees));
            }
        }
        None => {
            if let Some(notice) = item.notice() {
                out.push_str(&format!("\n   warning: {}", notice));
            }
        }
    }

    if !suggestion.rationale.is_empty() {
        out.push_str(&format!("\n   {}", suggestion.rationale));
    }
    out
}

pub fn render_outcome(outcome: &SearchOutcome) -> String {
    let mut out = render_classification(outcome.classification());

    match outcome {
        SearchOutcome::UnknownRegion { .. } => {}
        SearchOutcome::NoCandidates { .. } => {
            out.push_str("\nNo catalog codes are registered for this region.");
        }
        SearchOutcome::NoSuggestions {
            candidate_count, ..
        } => {
            out.push_str(&format!(
                "\nNo usable suggestions among {} candidate codes.",
                candidate_count
            ));
        }
        SearchOutcome::Suggestions {
            candidate_count,
            resolved,
            notices,
            ..
        } => {
            out.push_str(&format!(
                "\n{} suggestion(s) from {} candidate codes:\n",
                resolved.len(),
                candidate_count
            ));
            for (i, item) in resolved.iter().enumerate() {
                out.push('\n');
                out.push_str(&render_suggestion(i + 1, item));
            }
            for notice in notices {
                out.push_str(&format!("\nnote: {}", notice));
            }
        }
    }

    out
}

pub fn render_candidates(region: Region, candidates: &[&ProcedureRecord]) -> String {
    if candidates.is_empty() {
        return format!("No catalog codes for {} ({}).", region.code(), region.label());
    }

    let mut out = format!(
        "{} codes for {} ({}):",
        candidates.len(),
        region.code(),
        region.label()
    );
    for record in candidates {
        out.push_str(&format!("\n{}  {}", record.code, record.description));
    }
    out
}

pub fn render_regions(catalog: &Catalog) -> String {
    catalog
        .region_counts()
        .into_iter()
        .map(|(region, count)| {
            format!(
                "{}  {:<22} {:>4} codes  {}",
                region.code(),
                region.label(),
                count,
                region.anatomy()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_history(history: &SearchHistory) -> String {
    if history.is_empty() {
        return "History is empty.".to_string();
    }

    history
        .list()
        .map(|entry| {
            let codes: Vec<&str> = entry
                .top_suggestions
                .iter()
                .map(|s| s.code.as_str())
                .collect();
            format!(
                "{}  {}  {}  → {}",
                entry.timestamp.format("%H:%M:%S"),
                entry.region.code(),
                entry.description,
                codes.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nun_core::{HistoryEntry, Suggestion};
    use nun_search::Resolution;

    fn record(code: &str, fees: Fees) -> ProcedureRecord {
        ProcedureRecord {
            code: code.to_string(),
            description: "Osteosíntesis de fémur proximal".to_string(),
            region: Region::PelvisHip,
            complexity: Some("Alta".to_string()),
            keywords: None,
            fees,
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "$0.00");
        assert_eq!(format_amount(950.5), "$950.50");
        assert_eq!(format_amount(1234.0), "$1,234.00");
        assert_eq!(format_amount(1152000.0), "$1,152,000.00");
    }

    #[test]
    fn test_render_fees_skips_zero_amounts() {
        let fees = Fees {
            surgeon: 298000.0,
            assistant: 0.0,
            total: 298000.0,
        };
        assert_eq!(
            render_fees(&fees).unwrap(),
            "surgeon $298,000.00 | total $298,000.00"
        );
        assert!(render_fees(&Fees::default()).is_none());
    }

    #[test]
    fn test_render_unknown_region() {
        let outcome = SearchOutcome::UnknownRegion {
            classification: ClassificationResult::unknown(),
        };
        assert!(render_outcome(&outcome).contains("Region: unknown"));
    }

    #[test]
    fn test_render_suggestions_with_dangling_code() {
        let fees = Fees {
            surgeon: 640000.0,
            assistant: 128000.0,
            total: 768000.0,
        };
        let outcome = SearchOutcome::Suggestions {
            classification: ClassificationResult::new(Region::PelvisHip, 0.95, "fémur"),
            candidate_count: 4,
            resolved: vec![
                ResolvedSuggestion {
                    suggestion: Suggestion::new("PC.05.07", "osteosíntesis", 0.9),
                    resolution: Resolution::Found {
                        record: record("PC.05.07", fees),
                    },
                },
                ResolvedSuggestion {
                    suggestion: Suggestion::new("PC.99.99", "", 0.5),
                    resolution: Resolution::NotInCatalog,
                },
            ],
            notices: vec![nun_search::ShortlistNotice::TooFew { count: 2 }],
        };

        let text = render_outcome(&outcome);
        assert!(text.contains("Region: PC - Pelvis y Cadera (confidence 95%)"));
        assert!(text.contains("1. PC.05.07 (90%) Osteosíntesis de fémur proximal [Alta]"));
        assert!(text.contains("surgeon $640,000.00 | assistant $128,000.00 | total $768,000.00"));
        assert!(text.contains("2. PC.99.99 (50%)\n   warning: suggested code not found in catalog"));
        assert!(text.contains("note: only 2 suggestion(s) returned"));
    }

    #[test]
    fn test_render_history_newest_first() {
        let mut history = SearchHistory::new();
        history.append(HistoryEntry::new(
            "fractura de muñeca",
            Region::UpperLimb,
            &[Suggestion::new("MS.02.04", "", 0.8)],
        ));
        history.append(HistoryEntry::new(
            "fractura de cadera",
            Region::PelvisHip,
            &[Suggestion::new("PC.05.07", "", 0.9)],
        ));

        let text = render_history(&history);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("fractura de cadera  → PC.05.07"));
        assert!(lines[1].contains("MS.02.04"));
    }
}
