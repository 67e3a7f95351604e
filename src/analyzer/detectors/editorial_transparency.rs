//! Editorial transparency: review, update, disclosure and methodology cues

use super::{Detector, DocumentContext};
use crate::document::text;
use crate::{EvidenceItem, VariableId, VariableResult};
use regex::Regex;
use std::sync::OnceLock;

const CUE_POINTS: f64 = 0.8;
const MARKUP_POINTS: f64 = 0.5;

fn cues() -> &'static [(&'static str, Regex)] {
    static CUES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    CUES.get_or_init(|| {
        [
            (
                "Review process",
                r"(?i)\b(?:reviewed by|fact[- ]checked|medically reviewed|editorial (?:policy|standards|guidelines))\b",
            ),
            ("Update history", r"(?i)\b(?:last updated|updated on|updated:|revised on)"),
            (
                "Disclosure",
                r"(?i)\b(?:disclosure|affiliate links?|sponsored|we may earn|paid partnership)\b",
            ),
            ("Corrections", r"(?i)\b(?:correction|corrected|erratum)\b"),
            (
                "Methodology",
                r"(?i)\b(?:methodology|how we test(?:ed)?|our testing process|how we chose)\b",
            ),
        ]
        .into_iter()
        .map(|(label, pattern)| (label, Regex::new(pattern).unwrap()))
        .collect()
    })
}

pub struct EditorialTransparencyDetector;

impl EditorialTransparencyDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EditorialTransparencyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for EditorialTransparencyDetector {
    fn id(&self) -> VariableId {
        VariableId::EditorialTransparency
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        let doc = ctx.document;
        if !doc.has_text() && doc.structured_data.is_empty() {
            return VariableResult::insufficient_data(self.id(), "no body text or structured data");
        }

        let mut found = 0usize;
        let mut evidence = Vec::new();
        for (label, re) in cues() {
            if let Some(m) = re.find(&doc.text) {
                found += 1;
                evidence.push(
                    EvidenceItem::snippet(text::sentence_around(&doc.text, m.start(), 160))
                        .with_label(label),
                );
            }
        }
        let mut score = found as f64 * CUE_POINTS;
        if doc
            .structured_data
            .iter()
            .any(|e| e.has("reviewedBy") || e.has("lastReviewed"))
        {
            score += MARKUP_POINTS;
            evidence.push(EvidenceItem::note("Structured data declares a reviewer"));
        }
        if doc.structured_data.iter().any(|e| e.has("publishingPrinciples")) {
            score += MARKUP_POINTS;
            evidence.push(EvidenceItem::note("Structured data links publishing principles"));
        }
        if evidence.is_empty() {
            evidence.push(EvidenceItem::note(
                "No review, update, disclosure or methodology statements",
            ));
        }

        VariableResult::scored(self.id(), score, evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::detectors::test_support::{has_note, run};
    use crate::document::StructuredDataEntry;
    use crate::Document;
    use serde_json::json;

    #[test]
    fn test_all_cues_with_reviewer_markup() {
        let doc = Document {
            text: "Medically reviewed by Dr. Ruiz. Last updated May 2, 2025. \
                   Disclosure: we may earn a commission. Correction: an earlier version \
                   misstated the ratio. Methodology: how we tested each grinder."
                .to_string(),
            structured_data: vec![StructuredDataEntry::new("Article")
                .with("reviewedBy", json!({"name": "Dr. Ruiz"}))],
            ..Document::default()
        };
        let r = run(&EditorialTransparencyDetector::new(), &doc);
        assert_eq!(r.actual_score, 4.5);
    }

    #[test]
    fn test_plain_text_has_no_cues() {
        let doc = Document {
            text: "Coffee is brewed from roasted beans.".to_string(),
            ..Document::default()
        };
        let r = run(&EditorialTransparencyDetector::new(), &doc);
        assert_eq!(r.actual_score, 0.0);
        assert!(has_note(&r, "No review"));
    }
}
