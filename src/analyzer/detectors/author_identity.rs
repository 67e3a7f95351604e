//! Author identity: a named, verifiable person behind the content

use super::{Detector, DocumentContext};
use crate::document::{AuthorRecord, AuthorSource};
use crate::{EvidenceItem, VariableId, VariableResult};

const NAMED_POINTS: f64 = 2.0;
const PROFILE_POINTS: f64 = 1.5;
const PHOTO_POINTS: f64 = 1.0;

/// Names that identify a role or brand rather than a person
const GENERIC_NAMES: &[&str] = &["admin", "staff", "editor", "team", "guest", "author"];

fn source_points(source: AuthorSource) -> f64 {
    match source {
        AuthorSource::StructuredData => 1.5,
        AuthorSource::Byline => 1.0,
        AuthorSource::MetaTag => 0.5,
        AuthorSource::Unknown => 0.0,
    }
}

pub struct AuthorIdentityDetector;

impl AuthorIdentityDetector {
    pub fn new() -> Self {
        Self
    }

    fn is_generic(name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        lower.is_empty()
            || GENERIC_NAMES
                .iter()
                .any(|g| lower == *g || lower.ends_with(&format!(" {}", g)))
    }

    fn points(author: &AuthorRecord) -> f64 {
        if Self::is_generic(&author.name) {
            return 0.0;
        }
        let mut points = NAMED_POINTS + source_points(author.source);
        if author.profile_url.as_deref().is_some_and(|u| !u.trim().is_empty()) {
            points += PROFILE_POINTS;
        }
        if author.photo_url.as_deref().is_some_and(|u| !u.trim().is_empty()) {
            points += PHOTO_POINTS;
        }
        points
    }
}

impl Default for AuthorIdentityDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for AuthorIdentityDetector {
    fn id(&self) -> VariableId {
        VariableId::AuthorIdentity
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        let authors = &ctx.document.authors;
        let best = authors
            .iter()
            .map(|a| (a, Self::points(a)))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        let Some((author, score)) = best else {
            return VariableResult::scored(
                self.id(),
                0.0,
                vec![EvidenceItem::note("No author attribution found")],
            );
        };

        let mut evidence = vec![EvidenceItem::metric("Attributed authors", authors.len())];
        if score == 0.0 {
            evidence.push(EvidenceItem::note(format!(
                "Author \"{}\" is a role or brand, not a person",
                author.name
            )));
        } else {
            evidence.push(EvidenceItem::snippet(author.name.clone()).with_label("Author"));
            if let Some(url) = &author.profile_url {
                evidence.push(EvidenceItem::url(url.clone()).with_label("Profile"));
            }
            if author.photo_url.is_none() {
                evidence.push(EvidenceItem::note("No author photo"));
            }
        }

        VariableResult::scored(self.id(), score, evidence)
    }
}
