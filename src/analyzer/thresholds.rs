//! Variable registry: thresholds, names and recommendations keyed by variable id
//!
//! Built once on first use and shared read-only by every detector and every
//! category's status resolution.

use crate::{Category, VariableId, VariableStatus};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Registry row for one variable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableSpec {
    pub id: VariableId,
    pub name: &'static str,
    pub category: Category,
    pub max_score: f64,
    pub excellent: f64,
    pub good: f64,
    pub needs_improvement: f64,
    /// Measurable only over a corpus
    pub corpus_only: bool,
    pub recommendation: &'static str,
}

impl VariableSpec {
    /// Resolve a status from an already clamped score
    pub fn resolve(&self, score: f64) -> VariableStatus {
        if score >= self.excellent {
            VariableStatus::Excellent
        } else if score >= self.good {
            VariableStatus::Good
        } else if score >= self.needs_improvement {
            VariableStatus::NeedsImprovement
        } else {
            VariableStatus::Poor
        }
    }
}

const fn spec(
    id: VariableId,
    name: &'static str,
    category: Category,
    max_score: f64,
    bands: (f64, f64, f64),
    corpus_only: bool,
    recommendation: &'static str,
) -> VariableSpec {
    VariableSpec {
        id,
        name,
        category,
        max_score,
        excellent: bands.0,
        good: bands.1,
        needs_improvement: bands.2,
        corpus_only,
        recommendation,
    }
}

const VARIABLE_TABLE: [VariableSpec; 17] = [
    spec(
        VariableId::FirstPersonExperience,
        "First-person experience signals",
        Category::Experience,
        8.0,
        (7.0, 5.0, 3.0),
        false,
        "Describe what you personally tested, built or observed, in the first person",
    ),
    spec(
        VariableId::OriginalMedia,
        "Original media",
        Category::Experience,
        5.0,
        (4.0, 3.0, 1.5),
        false,
        "Add original photos, screenshots or video instead of stock imagery, with descriptive alt text",
    ),
    spec(
        VariableId::SpecificDetails,
        "Specific details",
        Category::Experience,
        6.0,
        (5.0, 4.0, 2.0),
        false,
        "Include concrete measurements, prices, dates and step-by-step detail from real use",
    ),
    spec(
        VariableId::ExperienceConsistency,
        "Experience consistency",
        Category::Experience,
        6.0,
        (5.0, 4.0, 2.0),
        true,
        "Make first-hand experience a consistent feature across your content, not a one-off",
    ),
    spec(
        VariableId::AuthorCredentials,
        "Author credentials",
        Category::Expertise,
        7.0,
        (6.0, 4.0, 2.0),
        false,
        "State the author's qualifications, certifications or professional role on the page",
    ),
    spec(
        VariableId::ContentDepth,
        "Content depth",
        Category::Expertise,
        7.0,
        (6.0, 4.0, 2.0),
        false,
        "Cover the topic in more depth; thin pages rarely demonstrate expertise",
    ),
    spec(
        VariableId::ContentStructure,
        "Content structure",
        Category::Expertise,
        5.0,
        (4.0, 3.0, 1.5),
        false,
        "Organize the content with descriptive H2/H3 headings, lists and an FAQ section",
    ),
    spec(
        VariableId::TopicalFocus,
        "Topical focus",
        Category::Expertise,
        6.0,
        (5.0, 4.0, 2.0),
        true,
        "Publish clusters of related content around your core topics",
    ),
    spec(
        VariableId::AuthorIdentity,
        "Author identity",
        Category::Authoritativeness,
        6.0,
        (5.0, 4.0, 2.0),
        false,
        "Attribute content to a named author with a profile page and photo",
    ),
    spec(
        VariableId::StructuredData,
        "Structured data",
        Category::Authoritativeness,
        6.0,
        (5.0, 4.0, 2.0),
        false,
        "Add Article, Person and Organization structured data with author and date fields",
    ),
    spec(
        VariableId::DomainAuthority,
        "Domain authority",
        Category::Authoritativeness,
        5.0,
        (4.0, 3.0, 1.5),
        false,
        "Earn links and references from reputable sites in your field",
    ),
    spec(
        VariableId::ExternalReputation,
        "External reputation",
        Category::Authoritativeness,
        4.0,
        (3.5, 2.5, 1.0),
        false,
        "Link the author to verified external profiles and independent mentions",
    ),
    spec(
        VariableId::PublishingCadence,
        "Publishing cadence",
        Category::Authoritativeness,
        4.0,
        (3.5, 2.5, 1.0),
        true,
        "Publish on a regular schedule",
    ),
    spec(
        VariableId::ContentFreshness,
        "Content freshness",
        Category::Trustworthiness,
        7.0,
        (6.0, 4.0, 2.0),
        false,
        "Review and update the content regularly and expose the modified date",
    ),
    spec(
        VariableId::CitationQuality,
        "Citation quality",
        Category::Trustworthiness,
        7.0,
        (6.0, 4.0, 2.0),
        false,
        "Cite primary and authoritative sources (.gov, .edu, research) from several domains",
    ),
    spec(
        VariableId::EditorialTransparency,
        "Editorial transparency",
        Category::Trustworthiness,
        5.0,
        (4.0, 3.0, 1.5),
        false,
        "Disclose review process, affiliations and update history on the page",
    ),
    spec(
        VariableId::FreshnessRate,
        "Corpus freshness rate",
        Category::Trustworthiness,
        6.0,
        (5.0, 4.0, 2.0),
        true,
        "Refresh older content so most of the corpus has been updated within the last year",
    ),
];

fn registry() -> &'static HashMap<VariableId, VariableSpec> {
    static REGISTRY: OnceLock<HashMap<VariableId, VariableSpec>> = OnceLock::new();
    REGISTRY.get_or_init(|| VARIABLE_TABLE.iter().map(|s| (s.id, *s)).collect())
}

/// O(1) lookup. Every `VariableId` has exactly one registry row.
pub fn lookup(id: VariableId) -> &'static VariableSpec {
    &registry()[&id]
}

/// All registry rows in table order
pub fn all() -> &'static [VariableSpec] {
    &VARIABLE_TABLE
}

/// Sum of max scores of the corpus-only variables in a category
pub fn corpus_only_points(category: Category) -> f64 {
    category
        .variables()
        .iter()
        .map(|id| lookup(*id))
        .filter(|s| s.corpus_only)
        .map(|s| s.max_score)
        .sum()
}
