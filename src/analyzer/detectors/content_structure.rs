//! Content structure: heading hierarchy, lists and FAQ sections

use super::{band, Detector, DocumentContext};
use crate::{EvidenceItem, VariableId, VariableResult};

const H2_BANDS: [(f64, f64); 3] = [(4.0, 2.0), (2.0, 1.5), (1.0, 1.0)];
const H3_BANDS: [(f64, f64); 2] = [(2.0, 1.0), (1.0, 0.5)];
const LIST_POINTS: f64 = 1.0;
const MIN_LIST_ITEMS: usize = 3;
const FAQ_POINTS: f64 = 1.0;

pub struct ContentStructureDetector;

impl ContentStructureDetector {
    pub fn new() -> Self {
        Self
    }

    fn list_items(body: &str) -> usize {
        body.lines()
            .map(str::trim_start)
            .filter(|line| {
                line.starts_with("- ")
                    || line.starts_with("* ")
                    || line.starts_with("• ")
                    || line
                        .split_once(['.', ')'])
                        .is_some_and(|(n, rest)| {
                            !n.is_empty()
                                && n.len() <= 3
                                && n.chars().all(|c| c.is_ascii_digit())
                                && rest.starts_with(' ')
                        })
            })
            .count()
    }
}

impl Default for ContentStructureDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ContentStructureDetector {
    fn id(&self) -> VariableId {
        VariableId::ContentStructure
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        let doc = ctx.document;
        let headings = &doc.headings;
        if !doc.has_text() && headings.h2.is_empty() && headings.h3.is_empty() {
            return VariableResult::insufficient_data(self.id(), "no body text or headings");
        }

        let list_items = Self::list_items(&doc.text);
        let has_faq = doc.entries_of_type(&["FAQPage"]).next().is_some()
            || headings
                .h2
                .iter()
                .chain(headings.h3.iter())
                .any(|h| h.trim_end().ends_with('?') || h.to_lowercase().contains("faq"));

        let mut score = band(headings.h2.len() as f64, &H2_BANDS)
            + band(headings.h3.len() as f64, &H3_BANDS);
        if list_items >= MIN_LIST_ITEMS {
            score += LIST_POINTS;
        }
        if has_faq {
            score += FAQ_POINTS;
        }

        let mut evidence = vec![
            EvidenceItem::metric("H1 headings", headings.h1.len()),
            EvidenceItem::metric("H2 headings", headings.h2.len()),
            EvidenceItem::metric("H3 headings", headings.h3.len()),
            EvidenceItem::metric("List items", list_items),
        ];
        if has_faq {
            evidence.push(EvidenceItem::note("FAQ or question-led section present"));
        }
        if headings.h1.len() > 1 {
            evidence.push(EvidenceItem::note(format!(
                "{} H1 headings; a single H1 is expected",
                headings.h1.len()
            )));
        }

        VariableResult::scored(self.id(), score, evidence)
    }
}
