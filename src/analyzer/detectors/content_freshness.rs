//! Content freshness: age of the effective date at the reference time

use super::{Detector, DocumentContext};
use crate::{EvidenceItem, VariableId, VariableResult};

/// (max age in days, points); older than the last band earns `STALE_POINTS`
const AGE_BANDS: [(i64, f64); 4] = [(90, 7.0), (180, 5.5), (365, 4.0), (730, 2.0)];
const STALE_POINTS: f64 = 0.5;

pub struct ContentFreshnessDetector;

impl ContentFreshnessDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn points_for_age(days: i64) -> f64 {
        AGE_BANDS
            .iter()
            .find(|(max_age, _)| days <= *max_age)
            .map(|(_, points)| *points)
            .unwrap_or(STALE_POINTS)
    }
}

impl Default for ContentFreshnessDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ContentFreshnessDetector {
    fn id(&self) -> VariableId {
        VariableId::ContentFreshness
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        let doc = ctx.document;
        let Some(date) = doc.effective_date() else {
            return VariableResult::insufficient_data(
                self.id(),
                "no publication or modification date",
            );
        };

        let raw_age = (ctx.as_of - date).num_days();
        let mut evidence = vec![EvidenceItem::metric(
            "Effective date",
            date.format("%Y-%m-%d"),
        )];
        if raw_age < 0 {
            evidence.push(EvidenceItem::note(
                "Date is after the reference time; treated as published today",
            ));
        }
        let age = raw_age.max(0);
        evidence.push(EvidenceItem::metric("Age (days)", age));

        let has_modified = doc.dates.modified.is_some()
            || doc.structured_data.iter().any(|e| e.has("dateModified"));
        if !has_modified {
            evidence.push(EvidenceItem::note("No modified date exposed"));
        }

        VariableResult::scored(self.id(), Self::points_for_age(age), evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::detectors::test_support::{as_of, has_note, run};
    use crate::document::DocumentDates;
    use crate::Document;
    use chrono::Duration;

    fn aged(days: i64) -> Document {
        Document {
            dates: DocumentDates {
                published: Some(as_of() - Duration::days(days)),
                modified: None,
            },
            ..Document::default()
        }
    }

    #[test]
    fn test_age_bands() {
        let d = ContentFreshnessDetector::new();
        assert_eq!(run(&d, &aged(10)).actual_score, 7.0);
        assert_eq!(run(&d, &aged(90)).actual_score, 7.0);
        assert_eq!(run(&d, &aged(91)).actual_score, 5.5);
        assert_eq!(run(&d, &aged(365)).actual_score, 4.0);
        assert_eq!(run(&d, &aged(700)).actual_score, 2.0);
        assert_eq!(run(&d, &aged(2000)).actual_score, 0.5);
    }

    #[test]
    fn test_future_date_clamps_to_zero_age() {
        let r = run(&ContentFreshnessDetector::new(), &aged(-30));
        assert_eq!(r.actual_score, 7.0);
        assert!(has_note(&r, "after the reference time"));
    }

    #[test]
    fn test_no_date_is_insufficient() {
        let r = run(&ContentFreshnessDetector::new(), &Document::default());
        assert!(has_note(&r, "no publication or modification date"));
    }
}
