//! Topical focus: keyword overlap between corpus documents

use super::CorpusDetector;
use crate::analyzer::thresholds;
use crate::corpus::CorpusSummary;
use crate::{EvidenceItem, VariableId, VariableResult};

/// Mean pairwise keyword overlap that earns the full score. Related posts
/// share a handful of terms, not their whole vocabulary.
pub const TARGET_OVERLAP: f64 = 0.25;

pub struct TopicalFocusDetector;

impl TopicalFocusDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TopicalFocusDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusDetector for TopicalFocusDetector {
    fn id(&self) -> VariableId {
        VariableId::TopicalFocus
    }

    fn detect(&self, summary: &CorpusSummary) -> VariableResult {
        let max = thresholds::lookup(self.id()).max_score;
        if summary.sample_size == 0 {
            return VariableResult::insufficient_data(self.id(), "corpus is empty");
        }
        if let Some(coverage) = summary.topic_coverage_override {
            return VariableResult::scored(
                self.id(),
                coverage * max,
                vec![
                    EvidenceItem::metric("Topic coverage", format!("{:.0}%", coverage * 100.0)),
                    EvidenceItem::note("Coverage supplied with corpus insights"),
                ],
            );
        }
        let Some(overlap) = summary.keyword_overlap else {
            return VariableResult::insufficient_data(
                self.id(),
                "need at least two documents with a title or headings",
            );
        };

        let mut evidence = vec![EvidenceItem::metric(
            "Mean keyword overlap",
            format!("{:.2}", overlap),
        )];
        if overlap < TARGET_OVERLAP / 4.0 {
            evidence.push(EvidenceItem::note("Documents share almost no topic keywords"));
        }
        VariableResult::scored(self.id(), (overlap / TARGET_OVERLAP).min(1.0) * max, evidence)
    }
}
