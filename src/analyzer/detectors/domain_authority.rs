//! Domain authority from pre-fetched metrics, estimated when unavailable

use super::{band, Detector, DocumentContext};
use crate::ports::DomainMetrics;
use crate::{Document, EvidenceItem, VariableId, VariableResult};

/// Share of the ceiling carried by the provider authority score
const AUTHORITY_POINTS: f64 = 3.5;
const REFERRING_DOMAIN_BANDS: [(f64, f64); 3] = [(1000.0, 1.5), (100.0, 1.0), (10.0, 0.5)];
/// Estimates never exceed this; on-page signals are weak evidence of authority
const ESTIMATE_CEILING: f64 = 1.5;

pub struct DomainAuthorityDetector;

impl DomainAuthorityDetector {
    pub fn new() -> Self {
        Self
    }

    fn from_metrics(&self, metrics: &DomainMetrics) -> VariableResult {
        let mut score = 0.0;
        let mut evidence = Vec::new();
        if let Some(authority) = metrics.authority_score {
            let authority = authority.clamp(0.0, 100.0);
            score += AUTHORITY_POINTS * authority / 100.0;
            evidence.push(EvidenceItem::metric("Authority score", format!("{:.0}", authority)));
        }
        if let Some(referring) = metrics.referring_domains {
            score += band(referring as f64, &REFERRING_DOMAIN_BANDS);
            evidence.push(EvidenceItem::metric("Referring domains", referring));
        }
        if let Some(inbound) = metrics.inbound_links {
            evidence.push(EvidenceItem::metric("Inbound links", inbound));
        }
        VariableResult::scored(self.id(), score, evidence)
    }

    fn estimate(&self, doc: &Document) -> VariableResult {
        let mut score: f64 = 0.0;
        let mut evidence = vec![EvidenceItem::metric("External links", doc.links.external)];
        if doc.links.external >= 5 {
            score += 0.5;
        }
        let same_as = doc
            .entries_of_type(&["Organization", "NewsMediaOrganization"])
            .map(|e| e.get_strings("sameAs").len())
            .sum::<usize>();
        if same_as > 0 {
            score += 0.5;
            evidence.push(EvidenceItem::metric("Organization sameAs links", same_as));
        }
        if doc.url.as_deref().is_some_and(|u| u.starts_with("https://")) {
            score += 0.5;
        }
        VariableResult::scored(self.id(), score.min(ESTIMATE_CEILING), evidence)
            .estimated("Domain metrics unavailable; estimated from on-page signals")
    }
}

impl Default for DomainAuthorityDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for DomainAuthorityDetector {
    fn id(&self) -> VariableId {
        VariableId::DomainAuthority
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        match &ctx.enrichments.domain_metrics {
            Some(m) if m.authority_score.is_some() || m.referring_domains.is_some() => {
                self.from_metrics(m)
            }
            _ => self.estimate(ctx.document),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::detectors::test_support::{run, run_with};
    use crate::document::{LinkCounts, StructuredDataEntry};
    use crate::Enrichments;
    use serde_json::json;

    #[test]
    fn test_metrics_scale_authority() {
        let enrichments = Enrichments::none().with_domain_metrics(DomainMetrics {
            authority_score: Some(60.0),
            referring_domains: Some(450),
            inbound_links: Some(12_000),
        });
        let r = run_with(&DomainAuthorityDetector::new(), &Document::default(), &enrichments);
        assert!(!r.is_estimated);
        assert!((r.actual_score - 3.1).abs() < 1e-9);
    }

    #[test]
    fn test_missing_metrics_is_estimated_and_capped() {
        let doc = Document {
            url: Some("https://brew.example/guide".to_string()),
            links: LinkCounts {
                internal: 3,
                external: 9,
            },
            structured_data: vec![StructuredDataEntry::new("Organization")
                .with("sameAs", json!(["https://x.example/brew"]))],
            ..Document::default()
        };
        let r = run(&DomainAuthorityDetector::new(), &doc);
        assert!(r.is_estimated);
        assert_eq!(r.actual_score, 1.5);
    }

    #[test]
    fn test_empty_metrics_fall_back_to_estimate() {
        let enrichments = Enrichments::none().with_domain_metrics(DomainMetrics::default());
        let r = run_with(&DomainAuthorityDetector::new(), &Document::default(), &enrichments);
        assert!(r.is_estimated);
        assert_eq!(r.actual_score, 0.0);
    }
}
