//! Credence: content credibility scoring engine
//!
//! This library scores a document, or a dated corpus of related documents,
//! across four categories (experience, expertise, authoritativeness and
//! trustworthiness). Each category is built from independent detectors that
//! emit a capped sub-score together with the evidence that produced it.

pub mod analyzer;
pub mod config;
pub mod corpus;
pub mod document;
pub mod error;
pub mod ports;
pub mod telemetry;

pub use analyzer::ScoringEngine;
pub use corpus::CorpusInsights;
pub use document::{CorpusEntry, Document};
pub use ports::Enrichments;

use serde::{Deserialize, Serialize};

/// The four scoring categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Experience,
    Expertise,
    Authoritativeness,
    Trustworthiness,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Experience,
        Category::Expertise,
        Category::Authoritativeness,
        Category::Trustworthiness,
    ];

    /// Variables belonging to this category, in report order
    pub fn variables(self) -> &'static [VariableId] {
        use VariableId::*;
        match self {
            Category::Experience => &[
                FirstPersonExperience,
                OriginalMedia,
                SpecificDetails,
                ExperienceConsistency,
            ],
            Category::Expertise => &[
                AuthorCredentials,
                ContentDepth,
                ContentStructure,
                TopicalFocus,
            ],
            Category::Authoritativeness => &[
                AuthorIdentity,
                StructuredData,
                DomainAuthority,
                ExternalReputation,
                PublishingCadence,
            ],
            Category::Trustworthiness => &[
                ContentFreshness,
                CitationQuality,
                EditorialTransparency,
                FreshnessRate,
            ],
        }
    }

    /// Ceiling of the category (sum of its variables' max scores)
    pub fn max_score(self) -> f64 {
        self.variables()
            .iter()
            .map(|id| analyzer::thresholds::lookup(*id).max_score)
            .sum()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Experience => write!(f, "Experience"),
            Category::Expertise => write!(f, "Expertise"),
            Category::Authoritativeness => write!(f, "Authoritativeness"),
            Category::Trustworthiness => write!(f, "Trustworthiness"),
        }
    }
}

/// Measured signals. Ids are stable and used as keys in the threshold registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariableId {
    FirstPersonExperience,
    OriginalMedia,
    SpecificDetails,
    /// Share of corpus documents with first-person signals
    ExperienceConsistency,
    AuthorCredentials,
    ContentDepth,
    ContentStructure,
    /// Keyword overlap between corpus documents
    TopicalFocus,
    AuthorIdentity,
    StructuredData,
    DomainAuthority,
    ExternalReputation,
    /// Regularity of publication dates across the corpus
    PublishingCadence,
    ContentFreshness,
    CitationQuality,
    EditorialTransparency,
    /// Share of corpus documents updated inside the freshness window
    FreshnessRate,
}

impl VariableId {
    pub const ALL: [VariableId; 17] = [
        VariableId::FirstPersonExperience,
        VariableId::OriginalMedia,
        VariableId::SpecificDetails,
        VariableId::ExperienceConsistency,
        VariableId::AuthorCredentials,
        VariableId::ContentDepth,
        VariableId::ContentStructure,
        VariableId::TopicalFocus,
        VariableId::AuthorIdentity,
        VariableId::StructuredData,
        VariableId::DomainAuthority,
        VariableId::ExternalReputation,
        VariableId::PublishingCadence,
        VariableId::ContentFreshness,
        VariableId::CitationQuality,
        VariableId::EditorialTransparency,
        VariableId::FreshnessRate,
    ];

    /// Category this variable contributes to
    pub fn category(self) -> Category {
        analyzer::thresholds::lookup(self).category
    }

    /// True for variables that can only be measured over a corpus
    pub fn is_corpus_only(self) -> bool {
        analyzer::thresholds::lookup(self).corpus_only
    }

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        analyzer::thresholds::lookup(self).name
    }
}

impl std::fmt::Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            VariableId::FirstPersonExperience => "first-person-experience",
            VariableId::OriginalMedia => "original-media",
            VariableId::SpecificDetails => "specific-details",
            VariableId::ExperienceConsistency => "experience-consistency",
            VariableId::AuthorCredentials => "author-credentials",
            VariableId::ContentDepth => "content-depth",
            VariableId::ContentStructure => "content-structure",
            VariableId::TopicalFocus => "topical-focus",
            VariableId::AuthorIdentity => "author-identity",
            VariableId::StructuredData => "structured-data",
            VariableId::DomainAuthority => "domain-authority",
            VariableId::ExternalReputation => "external-reputation",
            VariableId::PublishingCadence => "publishing-cadence",
            VariableId::ContentFreshness => "content-freshness",
            VariableId::CitationQuality => "citation-quality",
            VariableId::EditorialTransparency => "editorial-transparency",
            VariableId::FreshnessRate => "freshness-rate",
        };
        write!(f, "{}", id)
    }
}

/// Kind of evidence attached to a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Metric,
    Snippet,
    Note,
    Url,
}

/// A labeled, typed fact supporting a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    pub kind: EvidenceKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl EvidenceItem {
    pub fn metric(label: &str, value: impl ToString) -> Self {
        Self {
            kind: EvidenceKind::Metric,
            value: value.to_string(),
            label: Some(label.to_string()),
            confidence: None,
        }
    }

    pub fn note(text: impl Into<String>) -> Self {
        Self {
            kind: EvidenceKind::Note,
            value: text.into(),
            label: None,
            confidence: None,
        }
    }

    pub fn snippet(text: impl Into<String>) -> Self {
        Self {
            kind: EvidenceKind::Snippet,
            value: text.into(),
            label: None,
            confidence: None,
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            kind: EvidenceKind::Url,
            value: url.into(),
            label: None,
            confidence: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }
}

/// Per-variable status, resolved from the registry thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariableStatus {
    Excellent,
    Good,
    NeedsImprovement,
    Poor,
}

impl std::fmt::Display for VariableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableStatus::Excellent => write!(f, "excellent"),
            VariableStatus::Good => write!(f, "good"),
            VariableStatus::NeedsImprovement => write!(f, "needs improvement"),
            VariableStatus::Poor => write!(f, "poor"),
        }
    }
}

/// Category and overall rating bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Rating {
    /// Percentage bands shared by every category
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 85.0 {
            Rating::Excellent
        } else if percentage >= 65.0 {
            Rating::Good
        } else if percentage >= 40.0 {
            Rating::Fair
        } else {
            Rating::Poor
        }
    }

    /// Absolute bands for the 0-100 overall score
    pub fn from_overall(score: f64) -> Self {
        if score >= 85.0 {
            Rating::Excellent
        } else if score >= 70.0 {
            Rating::Good
        } else if score >= 50.0 {
            Rating::Fair
        } else {
            Rating::Poor
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Excellent => write!(f, "excellent"),
            Rating::Good => write!(f, "good"),
            Rating::Fair => write!(f, "fair"),
            Rating::Poor => write!(f, "poor"),
        }
    }
}

/// Output of one detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableResult {
    pub id: VariableId,
    pub name: String,
    pub max_score: f64,
    pub actual_score: f64,
    pub status: VariableStatus,
    pub evidence: Vec<EvidenceItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    /// Score derived from a fallback estimate because an external signal was unavailable
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_estimated: bool,
}

impl VariableResult {
    /// Build a result from a raw score. The score is clamped to `[0, maxScore]`
    /// and the status is resolved from the registry; neither is set by callers.
    pub fn scored(id: VariableId, raw_score: f64, evidence: Vec<EvidenceItem>) -> Self {
        let spec = analyzer::thresholds::lookup(id);
        let actual_score = clamp_score(raw_score, spec.max_score);
        let status = spec.resolve(actual_score);
        let recommendation = match status {
            VariableStatus::Excellent | VariableStatus::Good => None,
            _ => Some(spec.recommendation.to_string()),
        };
        Self {
            id,
            name: spec.name.to_string(),
            max_score: spec.max_score,
            actual_score,
            status,
            evidence,
            recommendation,
            is_estimated: false,
        }
    }

    /// Zero score with an explanatory note; absence of input is a valid outcome
    pub fn insufficient_data(id: VariableId, reason: &str) -> Self {
        Self::scored(
            id,
            0.0,
            vec![EvidenceItem::note(format!("Insufficient data: {}", reason))],
        )
    }

    /// Mark as estimated and record why
    pub fn estimated(mut self, rationale: impl Into<String>) -> Self {
        self.is_estimated = true;
        self.evidence.push(EvidenceItem::note(rationale));
        self
    }

    pub fn is_within_bounds(&self) -> bool {
        self.actual_score.is_finite()
            && self.actual_score >= 0.0
            && self.actual_score <= self.max_score
    }
}

/// Clamp to `[0, max]`; non-finite intermediate arithmetic collapses to 0
pub fn clamp_score(raw: f64, max: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, max)
    } else {
        0.0
    }
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whether corpus-level data was available to the scoring run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringMode {
    SingleDocument,
    Corpus,
}

/// Score for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub category: Category,
    pub variables: Vec<VariableResult>,
    pub total_score: f64,
    pub max_score: f64,
    /// totalScore / maxScore as a percentage (0-100)
    pub percentage: f64,
    pub status: Rating,
    /// Corpus-only variables that could not be measured (single-document mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unavailable_variables: Option<Vec<VariableId>>,
    /// Sum of the unavailable variables' max scores (single-document mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missed_points: Option<f64>,
}

impl CategoryScore {
    /// Sum of variable scores, in list order
    pub fn variable_sum(&self) -> f64 {
        self.variables.iter().map(|v| v.actual_score).sum()
    }
}

/// The four category scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub experience: CategoryScore,
    pub expertise: CategoryScore,
    pub authoritativeness: CategoryScore,
    pub trustworthiness: CategoryScore,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> &CategoryScore {
        match category {
            Category::Experience => &self.experience,
            Category::Expertise => &self.expertise,
            Category::Authoritativeness => &self.authoritativeness,
            Category::Trustworthiness => &self.trustworthiness,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryScore> {
        [
            &self.experience,
            &self.expertise,
            &self.authoritativeness,
            &self.trustworthiness,
        ]
        .into_iter()
    }

    /// Find a variable result across all categories
    pub fn variable(&self, id: VariableId) -> Option<&VariableResult> {
        self.get(id.category()).variables.iter().find(|v| v.id == id)
    }
}

/// Static benchmark range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRange {
    pub min: f64,
    pub max: f64,
}

/// Where an overall score sits relative to the benchmark ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BenchmarkPosition {
    BelowAverage,
    Average,
    AboveAverage,
    TopPerformer,
}

/// Comparison of the overall score against static benchmark data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub industry_average: BenchmarkRange,
    pub top_performer_min: f64,
    pub position: BenchmarkPosition,
    pub summary: String,
}

/// Final result of a scoring call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallScore {
    /// Sum of the category totals, rounded to two decimals once
    pub overall: f64,
    pub categories: CategoryScores,
    pub status: Rating,
    pub mode: ScoringMode,
    pub benchmark_comparison: BenchmarkComparison,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degradation_note: Option<String>,
    /// Number of corpus entries analyzed (corpus mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts_analyzed: Option<usize>,
}

/// Public API: score one document with the default engine (deterministic
/// detectors only, no AI port).
pub async fn score_document(document: &Document, enrichments: &Enrichments) -> OverallScore {
    ScoringEngine::new().score_document(document, enrichments).await
}

/// Public API: score a corpus with the default engine.
pub async fn score_corpus(
    entries: &[CorpusEntry],
    insights: Option<&CorpusInsights>,
    enrichments: &Enrichments,
) -> OverallScore {
    ScoringEngine::new()
        .score_corpus(entries, insights, enrichments)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ceilings_sum_to_100() {
        let total: f64 = Category::ALL.iter().map(|c| c.max_score()).sum();
        assert_eq!(total, 100.0);
        for category in Category::ALL {
            assert_eq!(category.max_score(), 25.0, "{} ceiling", category);
        }
    }

    #[test]
    fn test_every_variable_listed_once() {
        let mut seen: Vec<VariableId> = Category::ALL
            .iter()
            .flat_map(|c| c.variables().iter().copied())
            .collect();
        seen.sort();
        let mut all = VariableId::ALL.to_vec();
        all.sort();
        assert_eq!(seen, all);
        for category in Category::ALL {
            for id in category.variables() {
                assert_eq!(id.category(), category);
            }
        }
    }

    #[test]
    fn test_scored_clamps_above_max() {
        let r = VariableResult::scored(VariableId::ContentDepth, 42.0, vec![]);
        assert_eq!(r.actual_score, 7.0);
        assert_eq!(r.status, VariableStatus::Excellent);
        assert!(r.recommendation.is_none());
    }

    #[test]
    fn test_scored_clamps_negative_and_nan() {
        let r = VariableResult::scored(VariableId::ContentDepth, -3.0, vec![]);
        assert_eq!(r.actual_score, 0.0);
        assert_eq!(r.status, VariableStatus::Poor);
        assert!(r.recommendation.is_some());

        let r = VariableResult::scored(VariableId::ContentDepth, f64::NAN, vec![]);
        assert_eq!(r.actual_score, 0.0);
        assert!(r.is_within_bounds());
    }

    #[test]
    fn test_insufficient_data_has_note() {
        let r = VariableResult::insufficient_data(VariableId::ContentFreshness, "no dates");
        assert_eq!(r.actual_score, 0.0);
        assert_eq!(r.evidence.len(), 1);
        assert_eq!(r.evidence[0].kind, EvidenceKind::Note);
        assert!(r.evidence[0].value.contains("no dates"));
    }

    #[test]
    fn test_variable_id_display_matches_serde() {
        for id in VariableId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id));
        }
    }

    #[test]
    fn test_rating_bands() {
        assert_eq!(Rating::from_percentage(85.0), Rating::Excellent);
        assert_eq!(Rating::from_percentage(84.99), Rating::Good);
        assert_eq!(Rating::from_percentage(65.0), Rating::Good);
        assert_eq!(Rating::from_percentage(40.0), Rating::Fair);
        assert_eq!(Rating::from_percentage(39.9), Rating::Poor);
        assert_eq!(Rating::from_overall(70.0), Rating::Good);
        assert_eq!(Rating::from_overall(49.99), Rating::Poor);
    }

    #[test]
    fn test_estimated_serializes_flag_only_when_set() {
        let plain = VariableResult::scored(VariableId::DomainAuthority, 2.0, vec![]);
        let json = serde_json::to_string(&plain).unwrap();
        assert!(!json.contains("isEstimated"));

        let est = plain.estimated("metrics unavailable");
        let json = serde_json::to_string(&est).unwrap();
        assert!(json.contains("\"isEstimated\":true"));
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(99.994), 99.99);
    }
}
