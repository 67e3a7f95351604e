//! External reputation of the author, from pre-fetched signals or on-page profile links

use super::{band, Detector, DocumentContext};
use crate::ports::ReputationSignals;
use crate::{Document, EvidenceItem, VariableId, VariableResult};
use std::collections::BTreeSet;

const PROFILE_POINTS: f64 = 0.5;
const MAX_PROFILES: u32 = 3;
const MENTION_BANDS: [(f64, f64); 2] = [(50.0, 1.0), (10.0, 0.5)];
const AWARD_POINTS: f64 = 0.75;
const KNOWLEDGE_PANEL_POINTS: f64 = 0.75;
const ESTIMATE_LINK_POINTS: f64 = 0.4;
const MAX_ESTIMATE_LINKS: usize = 3;

pub struct ExternalReputationDetector;

impl ExternalReputationDetector {
    pub fn new() -> Self {
        Self
    }

    fn from_signals(&self, signals: &ReputationSignals) -> VariableResult {
        let mut score = signals.verified_profiles.min(MAX_PROFILES) as f64 * PROFILE_POINTS
            + band(signals.mentions as f64, &MENTION_BANDS);
        if signals.awards > 0 {
            score += AWARD_POINTS;
        }
        if signals.has_knowledge_panel {
            score += KNOWLEDGE_PANEL_POINTS;
        }
        let evidence = vec![
            EvidenceItem::metric("Verified profiles", signals.verified_profiles),
            EvidenceItem::metric("Independent mentions", signals.mentions),
            EvidenceItem::metric("Awards", signals.awards),
            EvidenceItem::metric("Knowledge panel", signals.has_knowledge_panel),
        ];
        VariableResult::scored(self.id(), score, evidence)
    }

    /// Distinct external profile links declared for the author on the page
    fn profile_links(doc: &Document) -> BTreeSet<String> {
        doc.entries_of_type(&["Person"])
            .flat_map(|e| e.get_strings("sameAs"))
            .map(str::to_string)
            .chain(doc.authors.iter().filter_map(|a| a.profile_url.clone()))
            .filter(|u| !u.trim().is_empty())
            .collect()
    }

    fn estimate(&self, doc: &Document) -> VariableResult {
        let links = Self::profile_links(doc);
        let score = links.len().min(MAX_ESTIMATE_LINKS) as f64 * ESTIMATE_LINK_POINTS;
        let mut evidence = vec![EvidenceItem::metric("Author profile links", links.len())];
        evidence.extend(
            links
                .iter()
                .take(MAX_ESTIMATE_LINKS)
                .map(|u| EvidenceItem::url(u.clone())),
        );
        VariableResult::scored(self.id(), score, evidence)
            .estimated("Reputation signals unavailable; estimated from author profile links")
    }
}

impl Default for ExternalReputationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ExternalReputationDetector {
    fn id(&self) -> VariableId {
        VariableId::ExternalReputation
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        match &ctx.enrichments.reputation {
            Some(signals) => self.from_signals(signals),
            None => self.estimate(ctx.document),
        }
    }
}
