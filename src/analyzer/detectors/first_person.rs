//! First-person experience: deterministic branch of the hybrid detector

use super::{band, cached, Detector, DocumentContext};
use crate::document::text;
use crate::{EvidenceItem, VariableId, VariableResult};
use regex::Regex;
use std::sync::OnceLock;

/// Pronoun density (per 1k words) to points
const PRONOUN_BANDS: [(f64, f64); 3] = [(20.0, 3.0), (10.0, 2.0), (4.0, 1.0)];
/// Each distinct experience phrase is worth a point, up to this many
const MAX_PHRASE_POINTS: usize = 5;
const MAX_SNIPPETS: usize = 3;
const SNIPPET_CHARS: usize = 200;

fn singular_pronoun() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"\bI\b")
}

fn other_pronouns() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"(?i)\b(?:my|me|mine|myself|we|our|ourselves)\b")
}

fn experience_phrases() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(
        &RE,
        r"(?i)\b(?:(?:i|we)(?:'ve| have)? (?:tested|tried|used|spent|built|found|noticed|learned|discovered|bought|visited|measured|compared|switched)|in my experience|hands-on|first-?hand|after (?:\d+|a few|several|many) (?:days|weeks|months|years)|when i (?:started|first)|lessons? (?:i )?learned|i personally|my own (?:setup|results|tests?))\b",
    )
}

/// Counts first-person pronouns and experience phrases
pub struct FirstPersonDetector;

impl FirstPersonDetector {
    pub fn new() -> Self {
        Self
    }

    /// Distinct experience phrases (lowercased) with the offset of their first use
    fn phrases(body: &str) -> Vec<(String, usize)> {
        let mut seen: Vec<(String, usize)> = Vec::new();
        for m in experience_phrases().find_iter(body) {
            let phrase = m.as_str().to_lowercase();
            if !seen.iter().any(|(p, _)| *p == phrase) {
                seen.push((phrase, m.start()));
            }
        }
        seen
    }
}

impl Default for FirstPersonDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for FirstPersonDetector {
    fn id(&self) -> VariableId {
        VariableId::FirstPersonExperience
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        let doc = ctx.document;
        if !doc.has_text() {
            return VariableResult::insufficient_data(self.id(), "document has no body text");
        }

        let words = doc.word_count();
        let pronouns = singular_pronoun().find_iter(&doc.text).count()
            + other_pronouns().find_iter(&doc.text).count();
        let density = text::per_thousand(pronouns, words);
        let phrases = Self::phrases(&doc.text);

        let score = band(density, &PRONOUN_BANDS) + phrases.len().min(MAX_PHRASE_POINTS) as f64;

        let mut evidence = vec![
            EvidenceItem::metric("First-person pronouns per 1k words", format!("{:.1}", density)),
            EvidenceItem::metric("Experience phrases", phrases.len()),
        ];
        for (_, offset) in phrases.iter().take(MAX_SNIPPETS) {
            evidence.push(EvidenceItem::snippet(text::sentence_around(
                &doc.text,
                *offset,
                SNIPPET_CHARS,
            )));
        }
        if phrases.is_empty() {
            evidence.push(EvidenceItem::note(
                "No phrases describing first-hand use, testing or observation",
            ));
        }

        VariableResult::scored(self.id(), score, evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::detectors::test_support::{has_note, run};
    use crate::{Document, EvidenceKind};

    fn doc(text: &str) -> Document {
        Document {
            text: text.to_string(),
            ..Document::default()
        }
    }

    #[test]
    fn test_personal_review_scores_high() {
        let body = "I tested this grinder for six weeks. After 3 weeks I noticed the burrs \
                    drifting. In my experience the stepless dial matters. We compared it with \
                    our old grinder and I found it quieter. My own setup uses a scale. \
                    Lessons learned: I personally clean it weekly.";
        let r = run(&FirstPersonDetector::new(), &doc(body));
        assert!(r.actual_score >= 7.0, "score was {}", r.actual_score);
        assert!(r.evidence.iter().any(|e| e.kind == EvidenceKind::Snippet));
    }

    #[test]
    fn test_impersonal_text_scores_zero() {
        let body = "The grinder has forty settings. Burr size is 38mm. \
                    The hopper holds 250 grams. It ships in three colors. ".repeat(10);
        let r = run(&FirstPersonDetector::new(), &doc(&body));
        assert_eq!(r.actual_score, 0.0);
        assert!(has_note(&r, "No phrases"));
    }

    #[test]
    fn test_lowercase_i_inside_words_not_counted() {
        // "it", "is" and "in" must not count as the pronoun I
        let r = run(&FirstPersonDetector::new(), &doc("it is in it is in it is in"));
        let density = &r.evidence[0];
        assert_eq!(density.value, "0.0");
    }

    #[test]
    fn test_repeated_phrase_counts_once() {
        let body = "I tested it. I tested it. I tested it. I tested it.";
        let r = run(&FirstPersonDetector::new(), &doc(body));
        let phrases = &r.evidence[1];
        assert_eq!(phrases.value, "1");
    }

    #[test]
    fn test_empty_text_is_insufficient() {
        let r = run(&FirstPersonDetector::new(), &Document::default());
        assert_eq!(r.actual_score, 0.0);
        assert!(has_note(&r, "Insufficient data"));
    }
}
