//! Content depth from body length

use super::{band, Detector, DocumentContext};
use crate::{EvidenceItem, VariableId, VariableResult};

const WORD_BANDS: [(f64, f64); 5] = [
    (2000.0, 7.0),
    (1200.0, 5.5),
    (600.0, 4.0),
    (300.0, 2.0),
    (1.0, 1.0),
];
const WORDS_PER_MINUTE: usize = 230;

pub struct ContentDepthDetector;

impl ContentDepthDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ContentDepthDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ContentDepthDetector {
    fn id(&self) -> VariableId {
        VariableId::ContentDepth
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        let words = ctx.document.word_count();
        if words == 0 {
            return VariableResult::insufficient_data(self.id(), "document has no body text");
        }
        let minutes = words.div_ceil(WORDS_PER_MINUTE);
        let mut evidence = vec![
            EvidenceItem::metric("Word count", words),
            EvidenceItem::metric("Reading time (min)", minutes),
        ];
        if words < 300 {
            evidence.push(EvidenceItem::note("Thin content: under 300 words"));
        }
        VariableResult::scored(self.id(), band(words as f64, &WORD_BANDS), evidence)
    }
}
