//! Aggregate inputs for the corpus-only detectors

use crate::analyzer::thresholds;
use crate::{CorpusEntry, VariableId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Publication rhythm derived from document dates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CadenceStats {
    pub dated_posts: usize,
    pub mean_gap_days: f64,
    /// Coefficient of variation of the gaps; 0 is perfectly regular
    pub gap_cv: f64,
    pub posts_per_month: f64,
}

/// Caller-computed corpus signals that replace the derived ones
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusInsights {
    /// Topical coverage, 0.0-1.0
    #[serde(default)]
    pub topic_coverage: Option<f64>,
    #[serde(default)]
    pub cadence: Option<CadenceStats>,
    /// Share of documents written from first-hand experience, 0.0-1.0
    #[serde(default)]
    pub experience_share: Option<f64>,
}

const DAYS_PER_MONTH: f64 = 30.44;
const MIN_CADENCE_POSTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusSummary {
    /// Every entry, including ones whose document failed extraction
    pub sample_size: usize,
    pub readable_documents: usize,
    /// Readable documents at or above the first-person "good" threshold
    pub experience_documents: usize,
    pub experience_share_override: Option<f64>,
    /// Mean pairwise Jaccard overlap of document keywords
    pub keyword_overlap: Option<f64>,
    pub topic_coverage_override: Option<f64>,
    pub cadence: Option<CadenceStats>,
    pub cadence_from_insights: bool,
    pub dated_documents: usize,
    /// Documents whose effective date falls inside the freshness window
    pub fresh_documents: usize,
    pub freshness_window_days: i64,
}

impl CorpusSummary {
    /// `first_person_scores` is aligned with `entries`; `None` marks an
    /// unreadable entry.
    pub fn build(
        entries: &[CorpusEntry],
        first_person_scores: &[Option<f64>],
        as_of: DateTime<Utc>,
        freshness_window_days: i64,
        insights: Option<&CorpusInsights>,
    ) -> Self {
        let good = thresholds::lookup(VariableId::FirstPersonExperience).good;
        let readable_documents = entries.iter().filter(|e| e.document.is_some()).count();
        let experience_documents = first_person_scores
            .iter()
            .flatten()
            .filter(|s| **s >= good)
            .count();

        // Entries that were never read contribute no date
        let dates: Vec<DateTime<Utc>> = entries
            .iter()
            .filter(|e| e.document.is_some())
            .filter_map(CorpusEntry::resolved_date)
            .collect();
        let fresh_documents = dates
            .iter()
            .filter(|d| (as_of - **d).num_days() <= freshness_window_days)
            .count();

        let insight_cadence = insights.and_then(|i| i.cadence);
        Self {
            sample_size: entries.len(),
            readable_documents,
            experience_documents,
            experience_share_override: insights
                .and_then(|i| i.experience_share)
                .map(|s| s.clamp(0.0, 1.0)),
            keyword_overlap: keyword_overlap(entries),
            topic_coverage_override: insights
                .and_then(|i| i.topic_coverage)
                .map(|c| c.clamp(0.0, 1.0)),
            cadence: insight_cadence.or_else(|| cadence(&dates)),
            cadence_from_insights: insight_cadence.is_some(),
            dated_documents: dates.len(),
            fresh_documents,
            freshness_window_days,
        }
    }
}

/// Mean Jaccard similarity over all pairs of documents that have keywords
pub fn keyword_overlap(entries: &[CorpusEntry]) -> Option<f64> {
    let sets: Vec<BTreeSet<String>> = entries
        .iter()
        .filter_map(|e| e.document.as_ref())
        .map(|d| d.keywords())
        .filter(|k| !k.is_empty())
        .collect();
    if sets.len() < 2 {
        return None;
    }
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in sets.iter().enumerate() {
        for b in &sets[i + 1..] {
            let shared = a.intersection(b).count();
            let union = a.union(b).count();
            total += shared as f64 / union as f64;
            pairs += 1;
        }
    }
    Some(total / pairs as f64)
}

/// Gap statistics; `None` under three dated posts or when every date is the same
pub fn cadence(dates: &[DateTime<Utc>]) -> Option<CadenceStats> {
    if dates.len() < MIN_CADENCE_POSTS {
        return None;
    }
    let mut sorted = dates.to_vec();
    sorted.sort();
    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds() as f64 / 86_400.0)
        .collect();
    let mean = gaps.iter().sum::<f64>() / gaps.len() as f64;
    if mean <= 0.0 {
        return None;
    }
    let variance = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / gaps.len() as f64;
    let span_days = gaps.iter().sum::<f64>();
    Some(CadenceStats {
        dated_posts: sorted.len(),
        mean_gap_days: mean,
        gap_cv: variance.sqrt() / mean,
        posts_per_month: sorted.len() as f64 / (span_days / DAYS_PER_MONTH).max(1.0),
    })
}
