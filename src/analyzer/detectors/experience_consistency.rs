//! Experience consistency: how much of the corpus is written from first-hand use

use super::CorpusDetector;
use crate::corpus::CorpusSummary;
use crate::{EvidenceItem, VariableId, VariableResult};

/// Share of experience-led documents that earns the full score
pub const TARGET_SHARE: f64 = 0.7;

pub struct ExperienceConsistencyDetector;

impl ExperienceConsistencyDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExperienceConsistencyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusDetector for ExperienceConsistencyDetector {
    fn id(&self) -> VariableId {
        VariableId::ExperienceConsistency
    }

    fn detect(&self, summary: &CorpusSummary) -> VariableResult {
        let max = crate::analyzer::thresholds::lookup(self.id()).max_score;
        if summary.sample_size == 0 {
            return VariableResult::insufficient_data(self.id(), "corpus is empty");
        }
        if let Some(share) = summary.experience_share_override {
            return VariableResult::scored(
                self.id(),
                (share / TARGET_SHARE).min(1.0) * max,
                vec![
                    EvidenceItem::metric("Experience-led share", format!("{:.0}%", share * 100.0)),
                    EvidenceItem::note("Share supplied with corpus insights"),
                ],
            );
        }
        if summary.readable_documents == 0 {
            return VariableResult::insufficient_data(self.id(), "no readable documents");
        }

        // Unreadable entries stay in the denominator
        let share = summary.experience_documents as f64 / summary.sample_size as f64;
        VariableResult::scored(
            self.id(),
            (share / TARGET_SHARE).min(1.0) * max,
            vec![
                EvidenceItem::metric(
                    "Documents with first-hand experience",
                    format!("{} of {}", summary.experience_documents, summary.sample_size),
                ),
                EvidenceItem::metric("Experience-led share", format!("{:.0}%", share * 100.0)),
            ],
        )
    }
}
