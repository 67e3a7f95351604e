//! Publishing cadence: frequency and regularity of publication dates

use super::{band, CorpusDetector};
use crate::corpus::CorpusSummary;
use crate::{EvidenceItem, VariableId, VariableResult};

const FREQUENCY_BANDS: [(f64, f64); 4] = [(4.0, 2.0), (2.0, 1.5), (1.0, 1.0), (0.25, 0.5)];
/// (max coefficient of variation, points); lower variation is more regular
const REGULARITY_BANDS: [(f64, f64); 3] = [(0.5, 2.0), (1.0, 1.0), (1.5, 0.5)];

pub struct PublishingCadenceDetector;

impl PublishingCadenceDetector {
    pub fn new() -> Self {
        Self
    }

    fn regularity(cv: f64) -> f64 {
        REGULARITY_BANDS
            .iter()
            .find(|(max_cv, _)| cv <= *max_cv)
            .map(|(_, points)| *points)
            .unwrap_or(0.0)
    }
}

impl Default for PublishingCadenceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusDetector for PublishingCadenceDetector {
    fn id(&self) -> VariableId {
        VariableId::PublishingCadence
    }

    fn detect(&self, summary: &CorpusSummary) -> VariableResult {
        if summary.sample_size == 0 {
            return VariableResult::insufficient_data(self.id(), "corpus is empty");
        }
        let Some(cadence) = summary.cadence else {
            return VariableResult::insufficient_data(
                self.id(),
                "need at least three documents with distinct dates",
            );
        };

        let score =
            band(cadence.posts_per_month, &FREQUENCY_BANDS) + Self::regularity(cadence.gap_cv);
        let mut evidence = vec![
            EvidenceItem::metric("Dated posts", cadence.dated_posts),
            EvidenceItem::metric("Posts per month", format!("{:.1}", cadence.posts_per_month)),
            EvidenceItem::metric("Mean gap (days)", format!("{:.1}", cadence.mean_gap_days)),
            EvidenceItem::metric("Gap variation", format!("{:.2}", cadence.gap_cv)),
        ];
        if summary.cadence_from_insights {
            evidence.push(EvidenceItem::note("Cadence supplied with corpus insights"));
        }
        VariableResult::scored(self.id(), score, evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::summary::cadence;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn with_dates(dates: &[DateTime<Utc>]) -> CorpusSummary {
        let entries: Vec<crate::CorpusEntry> = dates
            .iter()
            .map(|d| crate::CorpusEntry::new(crate::Document::default()).with_date(*d))
            .collect();
        let scores = vec![Some(0.0); entries.len()];
        let s = CorpusSummary::build(&entries, &scores, Utc::now(), 365, None);
        assert_eq!(s.cadence, cadence(dates));
        s
    }

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_weekly_cadence_is_full_marks() {
        let dates: Vec<_> = (0..12).map(|i| day(i * 7)).collect();
        let r = PublishingCadenceDetector::new().detect(&with_dates(&dates));
        assert_eq!(r.actual_score, 4.0);
    }

    #[test]
    fn test_irregular_sparse_cadence() {
        let dates = [day(0), day(1), day(2), day(3), day(400)];
        let r = PublishingCadenceDetector::new().detect(&with_dates(&dates));
        // ~0.4 posts/month (0.5) and highly irregular gaps (0)
        assert_eq!(r.actual_score, 0.5);
    }

    #[test]
    fn test_too_few_dates() {
        let r = PublishingCadenceDetector::new().detect(&with_dates(&[day(0), day(9)]));
        assert_eq!(r.actual_score, 0.0);
    }
}
