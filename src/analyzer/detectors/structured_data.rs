//! Structured data completeness

use super::{Detector, DocumentContext};
use crate::{EvidenceItem, VariableId, VariableResult};

const ARTICLE_TYPES: &[&str] = &[
    "Article",
    "BlogPosting",
    "NewsArticle",
    "TechArticle",
    "Review",
    "HowTo",
    "Recipe",
];
/// Fields an article entry should carry; each is worth an equal share
const ARTICLE_FIELDS: &[&str] = &["headline", "author", "datePublished", "image"];

const ARTICLE_POINTS: f64 = 2.0;
const ARTICLE_FIELD_POINTS: f64 = 1.0;
const PERSON_POINTS: f64 = 1.0;
const ORGANIZATION_POINTS: f64 = 1.0;
const NAVIGATION_POINTS: f64 = 1.0;

pub struct StructuredDataDetector;

impl StructuredDataDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StructuredDataDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for StructuredDataDetector {
    fn id(&self) -> VariableId {
        VariableId::StructuredData
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        let doc = ctx.document;
        if doc.structured_data.is_empty() {
            return VariableResult::scored(
                self.id(),
                0.0,
                vec![EvidenceItem::note("No structured data found")],
            );
        }

        let mut score = 0.0;
        let mut evidence = vec![EvidenceItem::metric(
            "Types",
            doc.structured_data
                .iter()
                .map(|e| e.type_label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )];

        // The most complete article entry counts
        let article_fields = doc
            .entries_of_type(ARTICLE_TYPES)
            .map(|e| ARTICLE_FIELDS.iter().filter(|f| e.has(f)).count())
            .max();
        match article_fields {
            Some(present) => {
                score += ARTICLE_POINTS
                    + ARTICLE_FIELD_POINTS * present as f64 / ARTICLE_FIELDS.len() as f64;
                evidence.push(EvidenceItem::metric(
                    "Article fields present",
                    format!("{}/{}", present, ARTICLE_FIELDS.len()),
                ));
            }
            None => evidence.push(EvidenceItem::note("No Article-type entry")),
        }

        let has_person = doc.entries_of_type(&["Person"]).next().is_some()
            || doc
                .entries_of_type(ARTICLE_TYPES)
                .any(|e| e.properties.get("author").is_some_and(|a| a.is_object()));
        if has_person {
            score += PERSON_POINTS;
        }
        let has_org = doc
            .entries_of_type(&["Organization", "NewsMediaOrganization"])
            .next()
            .is_some()
            || doc.entries_of_type(ARTICLE_TYPES).any(|e| e.has("publisher"));
        if has_org {
            score += ORGANIZATION_POINTS;
        }
        if doc.entries_of_type(&["BreadcrumbList", "FAQPage"]).next().is_some() {
            score += NAVIGATION_POINTS;
        }

        VariableResult::scored(self.id(), score, evidence)
    }
}
