//! Author credentials: stated qualifications and Person markup

use super::{cached, Detector, DocumentContext};
use crate::{EvidenceItem, VariableId, VariableResult};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

const STATED_CREDENTIALS_POINTS: f64 = 3.0;
const KEYWORD_POINTS: f64 = 1.0;
const MAX_KEYWORDS: usize = 2;
const JOB_TITLE_POINTS: f64 = 1.0;
const QUALIFICATION_POINTS: f64 = 1.0;
const KNOWS_ABOUT_POINTS: f64 = 0.5;

fn credential_keywords() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(
        &RE,
        r"(?i)\b(?:ph\.?d|m\.?d|mba|msc|bsc|cpa|cfa|rdn?|certified|licensed|registered|board[- ]certified|professor|engineer|physician|doctor|dr\.|nutritionist|dietitian|attorney|lawyer|editor|journalist|researcher|\d+\+? years)",
    )
}

pub struct AuthorCredentialsDetector;

impl AuthorCredentialsDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AuthorCredentialsDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for AuthorCredentialsDetector {
    fn id(&self) -> VariableId {
        VariableId::AuthorCredentials
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        let doc = ctx.document;
        let people: Vec<_> = doc.entries_of_type(&["Person"]).collect();
        if doc.authors.is_empty() && people.is_empty() {
            return VariableResult::insufficient_data(self.id(), "no author information");
        }

        let stated: Vec<&str> = doc
            .authors
            .iter()
            .filter_map(|a| a.credentials.as_deref())
            .filter(|c| !c.trim().is_empty())
            .collect();

        let mut keywords: BTreeSet<String> = BTreeSet::new();
        let job_titles: Vec<&str> = people.iter().filter_map(|p| p.get_str("jobTitle")).collect();
        for source in stated.iter().chain(job_titles.iter()) {
            for m in credential_keywords().find_iter(source) {
                keywords.insert(m.as_str().to_lowercase());
            }
        }

        let mut score = 0.0;
        let mut evidence = Vec::new();
        if !stated.is_empty() {
            score += STATED_CREDENTIALS_POINTS;
            for c in &stated {
                evidence.push(EvidenceItem::snippet(*c).with_label("Stated credentials"));
            }
        }
        score += keywords.len().min(MAX_KEYWORDS) as f64 * KEYWORD_POINTS;
        if !keywords.is_empty() {
            evidence.push(EvidenceItem::metric(
                "Credential keywords",
                keywords.iter().cloned().collect::<Vec<_>>().join(", "),
            ));
        }
        if !job_titles.is_empty() {
            score += JOB_TITLE_POINTS;
            evidence.push(EvidenceItem::metric("Person jobTitle", job_titles.join(", ")));
        }
        if people
            .iter()
            .any(|p| p.has("hasCredential") || p.has("alumniOf"))
        {
            score += QUALIFICATION_POINTS;
            evidence.push(EvidenceItem::note("Person markup lists credentials or alma mater"));
        }
        if people.iter().any(|p| p.has("knowsAbout")) {
            score += KNOWS_ABOUT_POINTS;
            evidence.push(EvidenceItem::note("Person markup declares areas of expertise"));
        }
        if evidence.is_empty() {
            evidence.push(EvidenceItem::note("Author is named but no qualifications are stated"));
        }

        VariableResult::scored(self.id(), score, evidence)
    }
}
