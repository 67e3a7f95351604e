//! Specific details: measurements, prices, dates and numbered steps

use super::{band, cached, Detector, DocumentContext};
use crate::document::text;
use crate::{EvidenceItem, VariableId, VariableResult};
use regex::Regex;
use std::sync::OnceLock;

const DENSITY_BANDS: [(f64, f64); 4] = [(15.0, 4.0), (8.0, 3.0), (4.0, 2.0), (1.0, 1.0)];
const VARIETY_POINTS: f64 = 0.5;

fn measurements() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(
        &RE,
        r"(?i)\b\d+(?:[.,]\d+)?\s?(?:%|(?:percent|mg|kg|g|lbs?|oz|ml|cm|mm|km|miles?|hours?|hrs?|minutes?|mins?|seconds?|secs?|days?|weeks?|months?|years?|gb|mb|tb|mph|kwh|watts?|°[cf])\b)",
    )
}

fn prices() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"[$€£]\s?\d[\d,]*(?:\.\d+)?")
}

fn dates() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(
        &RE,
        r"(?i)\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?\b|\b\d{4}-\d{2}-\d{2}\b",
    )
}

fn steps() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"(?im)^\s*(?:step\s+\d+\b|\d+[.)]\s)")
}

pub struct SpecificDetailsDetector;

impl SpecificDetailsDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SpecificDetailsDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for SpecificDetailsDetector {
    fn id(&self) -> VariableId {
        VariableId::SpecificDetails
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        let doc = ctx.document;
        if !doc.has_text() {
            return VariableResult::insufficient_data(self.id(), "document has no body text");
        }

        let counts = [
            ("Measurements", measurements().find_iter(&doc.text).count()),
            ("Prices", prices().find_iter(&doc.text).count()),
            ("Dates", dates().find_iter(&doc.text).count()),
            ("Numbered steps", steps().find_iter(&doc.text).count()),
        ];
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        let kinds = counts.iter().filter(|(_, n)| *n > 0).count();
        let density = text::per_thousand(total, doc.word_count());

        let score = band(density, &DENSITY_BANDS) + kinds as f64 * VARIETY_POINTS;

        let mut evidence: Vec<EvidenceItem> = counts
            .iter()
            .map(|(label, n)| EvidenceItem::metric(label, n))
            .collect();
        evidence.push(EvidenceItem::metric(
            "Specific details per 1k words",
            format!("{:.1}", density),
        ));
        if let Some(m) = measurements().find(&doc.text) {
            evidence.push(EvidenceItem::snippet(text::sentence_around(
                &doc.text,
                m.start(),
                200,
            )));
        }

        VariableResult::scored(self.id(), score, evidence)
    }
}
