//! Freshness rate: share of the corpus updated inside the freshness window

use super::CorpusDetector;
use crate::analyzer::thresholds;
use crate::corpus::CorpusSummary;
use crate::{EvidenceItem, VariableId, VariableResult};

pub struct FreshnessRateDetector;

impl FreshnessRateDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FreshnessRateDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusDetector for FreshnessRateDetector {
    fn id(&self) -> VariableId {
        VariableId::FreshnessRate
    }

    fn detect(&self, summary: &CorpusSummary) -> VariableResult {
        if summary.sample_size == 0 {
            return VariableResult::insufficient_data(self.id(), "corpus is empty");
        }
        if summary.dated_documents == 0 {
            return VariableResult::insufficient_data(self.id(), "no dated documents");
        }

        // Each document contributes at most once; undated ones count as stale
        let max = thresholds::lookup(self.id()).max_score;
        let score = summary.fresh_documents as f64 * max / summary.sample_size as f64;
        let mut evidence = vec![
            EvidenceItem::metric(
                "Fresh documents",
                format!("{} of {}", summary.fresh_documents, summary.sample_size),
            ),
            EvidenceItem::metric("Freshness window (days)", summary.freshness_window_days),
        ];
        let undated = summary.sample_size - summary.dated_documents;
        if undated > 0 {
            evidence.push(EvidenceItem::note(format!(
                "{} documents have no date and count as stale",
                undated
            )));
        }
        VariableResult::scored(self.id(), score, evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CorpusEntry, Document};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_rate_over_whole_corpus() {
        let as_of = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let entries = vec![
            CorpusEntry::new(Document::default()).with_date(as_of - Duration::days(10)),
            CorpusEntry::new(Document::default()).with_date(as_of - Duration::days(200)),
            CorpusEntry::new(Document::default()).with_date(as_of - Duration::days(900)),
            CorpusEntry::new(Document::default()),
        ];
        let scores = [Some(0.0); 4];
        let s = CorpusSummary::build(&entries, &scores, as_of, 365, None);
        let r = FreshnessRateDetector::new().detect(&s);
        assert_eq!(r.actual_score, 3.0);
        assert!(r.evidence.iter().any(|e| e.value.contains("count as stale")));
    }

    #[test]
    fn test_no_dates_is_insufficient() {
        let entries = vec![CorpusEntry::missing(), CorpusEntry::missing()];
        let s = CorpusSummary::build(&entries, &[None, None], Utc::now(), 365, None);
        let r = FreshnessRateDetector::new().detect(&s);
        assert!(r.evidence[0].value.contains("no dated documents"));
    }
}
