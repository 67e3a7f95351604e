//! Detectors: pure functions producing one bounded `VariableResult` each

pub mod author_credentials;
pub mod author_identity;
pub mod citation_quality;
pub mod content_depth;
pub mod content_freshness;
pub mod content_structure;
pub mod domain_authority;
pub mod editorial_transparency;
pub mod experience_consistency;
pub mod external_reputation;
pub mod first_person;
pub mod freshness_rate;
pub mod original_media;
pub mod publishing_cadence;
pub mod specific_details;
pub mod structured_data;
pub mod topical_focus;

pub use author_credentials::AuthorCredentialsDetector;
pub use author_identity::AuthorIdentityDetector;
pub use citation_quality::CitationQualityDetector;
pub use content_depth::ContentDepthDetector;
pub use content_freshness::ContentFreshnessDetector;
pub use content_structure::ContentStructureDetector;
pub use domain_authority::DomainAuthorityDetector;
pub use editorial_transparency::EditorialTransparencyDetector;
pub use experience_consistency::ExperienceConsistencyDetector;
pub use external_reputation::ExternalReputationDetector;
pub use first_person::FirstPersonDetector;
pub use freshness_rate::FreshnessRateDetector;
pub use original_media::OriginalMediaDetector;
pub use publishing_cadence::PublishingCadenceDetector;
pub use specific_details::SpecificDetailsDetector;
pub use structured_data::StructuredDataDetector;
pub use topical_focus::TopicalFocusDetector;

use crate::corpus::CorpusSummary;
use crate::error::{check_variable, enforce};
use crate::telemetry::trace_detector;
use crate::{Document, Enrichments, VariableId, VariableResult};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Inputs visible to a single-document detector
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'a> {
    pub document: &'a Document,
    pub enrichments: &'a Enrichments,
    /// Reference instant for age calculations
    pub as_of: DateTime<Utc>,
}

/// Trait for single-document detectors
///
/// Implementations never fail, never mutate their inputs and are
/// deterministic for identical inputs. Missing input is expressed as a zero
/// score with a note.
pub trait Detector: Send + Sync {
    /// Variable this detector measures
    fn id(&self) -> VariableId;

    /// Score one document
    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult;
}

/// Trait for detectors over aggregate corpus inputs
pub trait CorpusDetector: Send + Sync {
    fn id(&self) -> VariableId;

    fn detect(&self, summary: &CorpusSummary) -> VariableResult;
}

/// Run a detector, check its bounds and emit the trace event
pub fn run_detector(
    detector: &dyn Detector,
    ctx: &DocumentContext<'_>,
    input_fingerprint: &str,
) -> VariableResult {
    let result = detector.detect(ctx);
    enforce(check_variable(&result));
    trace_detector(&result, input_fingerprint);
    result
}

/// Run a corpus detector, check its bounds and emit the trace event
pub fn run_corpus_detector(
    detector: &dyn CorpusDetector,
    summary: &CorpusSummary,
    input_fingerprint: &str,
) -> VariableResult {
    let result = detector.detect(summary);
    enforce(check_variable(&result));
    trace_detector(&result, input_fingerprint);
    result
}

/// Deterministic single-document detectors other than first-person
/// experience, which goes through the hybrid coordinator.
pub fn pure_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(OriginalMediaDetector::new()),
        Box::new(SpecificDetailsDetector::new()),
        Box::new(AuthorCredentialsDetector::new()),
        Box::new(ContentDepthDetector::new()),
        Box::new(ContentStructureDetector::new()),
        Box::new(AuthorIdentityDetector::new()),
        Box::new(StructuredDataDetector::new()),
        Box::new(DomainAuthorityDetector::new()),
        Box::new(ExternalReputationDetector::new()),
        Box::new(ContentFreshnessDetector::new()),
        Box::new(CitationQualityDetector::new()),
        Box::new(EditorialTransparencyDetector::new()),
    ]
}

/// Detectors that only run over a corpus summary
pub fn corpus_detectors() -> Vec<Box<dyn CorpusDetector>> {
    vec![
        Box::new(ExperienceConsistencyDetector::new()),
        Box::new(TopicalFocusDetector::new()),
        Box::new(PublishingCadenceDetector::new()),
        Box::new(FreshnessRateDetector::new()),
    ]
}

/// Stepwise band lookup: the points of the first `(floor, points)` pair whose
/// floor is reached. Bands must be ordered from highest floor down.
pub(crate) fn band(value: f64, bands: &[(f64, f64)]) -> f64 {
    bands
        .iter()
        .find(|(floor, _)| value >= *floor)
        .map(|(_, points)| *points)
        .unwrap_or(0.0)
}

/// Compile a literal pattern once
pub(crate) fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;

    pub fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    pub fn run(detector: &dyn Detector, document: &Document) -> VariableResult {
        run_with(detector, document, &Enrichments::default())
    }

    pub fn run_with(
        detector: &dyn Detector,
        document: &Document,
        enrichments: &Enrichments,
    ) -> VariableResult {
        let ctx = DocumentContext {
            document,
            enrichments,
            as_of: as_of(),
        };
        detector.detect(&ctx)
    }

    pub fn has_note(result: &VariableResult, needle: &str) -> bool {
        result
            .evidence
            .iter()
            .any(|e| e.kind == crate::EvidenceKind::Note && e.value.contains(needle))
    }
}
