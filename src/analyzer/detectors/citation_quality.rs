//! Citation quality: volume, authority and diversity of outbound citations

use super::{band, Detector, DocumentContext};
use crate::{EvidenceItem, VariableId, VariableResult};
use std::collections::BTreeSet;

const COUNT_BANDS: [(f64, f64); 4] = [(8.0, 2.5), (4.0, 2.0), (2.0, 1.5), (1.0, 0.75)];
/// Points for a citation list made entirely of authoritative hosts
const AUTHORITY_POINTS: f64 = 3.0;
const DIVERSITY_BANDS: [(f64, f64); 3] = [(5.0, 1.5), (3.0, 1.0), (2.0, 0.5)];

const AUTHORITATIVE_SUFFIXES: &[&str] = &[
    ".gov", ".edu", ".mil", ".int", ".gov.uk", ".ac.uk", ".edu.au", ".gc.ca",
];
const AUTHORITATIVE_HOSTS: &[&str] = &[
    "who.int",
    "nature.com",
    "science.org",
    "sciencedirect.com",
    "springer.com",
    "wiley.com",
    "jstor.org",
    "arxiv.org",
    "ieee.org",
    "acm.org",
    "thelancet.com",
    "bmj.com",
    "nejm.org",
    "cochranelibrary.com",
    "reuters.com",
    "apnews.com",
];

/// Lowercased host without scheme, credentials, port or a leading `www.`
pub fn host_of(url: &str) -> Option<String> {
    let rest = url.trim().split_once("://").map(|(_, r)| r).unwrap_or(url.trim());
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?.split(':').next()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if host.is_empty() || !host.contains('.') {
        None
    } else {
        Some(host)
    }
}

pub fn is_authoritative(host: &str) -> bool {
    AUTHORITATIVE_SUFFIXES.iter().any(|s| host.ends_with(s))
        || AUTHORITATIVE_HOSTS
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
}

pub struct CitationQualityDetector;

impl CitationQualityDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CitationQualityDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for CitationQualityDetector {
    fn id(&self) -> VariableId {
        VariableId::CitationQuality
    }

    fn detect(&self, ctx: &DocumentContext<'_>) -> VariableResult {
        let hosts: Vec<String> = ctx
            .document
            .citations
            .iter()
            .filter_map(|u| host_of(u))
            .collect();
        if hosts.is_empty() {
            return VariableResult::scored(
                self.id(),
                0.0,
                vec![EvidenceItem::note("No outbound citations")],
            );
        }

        let authoritative: Vec<&String> = hosts.iter().filter(|h| is_authoritative(h)).collect();
        let share = authoritative.len() as f64 / hosts.len() as f64;
        let distinct: BTreeSet<&str> = hosts.iter().map(String::as_str).collect();

        let score = band(hosts.len() as f64, &COUNT_BANDS)
            + AUTHORITY_POINTS * share
            + band(distinct.len() as f64, &DIVERSITY_BANDS);

        let mut evidence = vec![
            EvidenceItem::metric("Citations", hosts.len()),
            EvidenceItem::metric("Authoritative share", format!("{:.0}%", share * 100.0)),
            EvidenceItem::metric("Distinct domains", distinct.len()),
        ];
        let mut shown = BTreeSet::new();
        for host in authoritative {
            if shown.insert(host.as_str()) && shown.len() <= 3 {
                evidence.push(EvidenceItem::url(host.clone()).with_label("Authoritative source"));
            }
        }
        if share == 0.0 {
            evidence.push(EvidenceItem::note("No government, academic or research sources cited"));
        }

        VariableResult::scored(self.id(), score, evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::detectors::test_support::{has_note, run};
    use crate::Document;

    fn cites(urls: &[&str]) -> Document {
        Document {
            citations: urls.iter().map(|u| u.to_string()).collect(),
            ..Document::default()
        }
    }

    #[test]
    fn test_host_parsing() {
        assert_eq!(host_of("https://www.NIH.gov/path?q=1").as_deref(), Some("nih.gov"));
        assert_eq!(
            host_of("http://user@data.example.org:8080/x").as_deref(),
            Some("data.example.org")
        );
        assert_eq!(host_of("example.com/page").as_deref(), Some("example.com"));
        assert_eq!(host_of("not a url"), None);
    }

    #[test]
    fn test_authoritative_hosts() {
        assert!(is_authoritative("cdc.gov"));
        assert!(is_authoritative("ox.ac.uk"));
        assert!(is_authoritative("pubs.acs.nature.com"));
        assert!(!is_authoritative("notnature.com"));
        assert!(!is_authoritative("blog.example.com"));
    }

    #[test]
    fn test_strong_citations() {
        let doc = cites(&[
            "https://www.cdc.gov/a",
            "https://www.nih.gov/b",
            "https://stanford.edu/c",
            "https://www.nature.com/d",
            "https://who.int/e",
            "https://www.fda.gov/f",
            "https://mit.edu/g",
            "https://arxiv.org/h",
        ]);
        let r = run(&CitationQualityDetector::new(), &doc);
        assert_eq!(r.actual_score, 7.0);
    }

    #[test]
    fn test_single_blog_citation() {
        let r = run(&CitationQualityDetector::new(), &cites(&["https://someblog.example/post"]));
        assert_eq!(r.actual_score, 0.75);
        assert!(has_note(&r, "No government"));
    }
}
