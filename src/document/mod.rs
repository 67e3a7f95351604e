//! Document feature set: the read-only input contract produced upstream
//!
//! Fetching, parsing and feature extraction happen outside this crate. A
//! `Document` arrives fully built and is never mutated while scoring.

pub mod text;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// One analyzable unit of content with its extracted features
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    /// Normalized body text
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub headings: Headings,
    #[serde(default)]
    pub structured_data: Vec<StructuredDataEntry>,
    #[serde(default)]
    pub authors: Vec<AuthorRecord>,
    #[serde(default)]
    pub media: MediaCounts,
    #[serde(default)]
    pub links: LinkCounts,
    /// Outbound citation URLs
    #[serde(default)]
    pub citations: Vec<String>,
    /// Dates found outside structured data (meta tags, bylines)
    #[serde(default)]
    pub dates: DocumentDates,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headings {
    #[serde(default)]
    pub h1: Vec<String>,
    #[serde(default)]
    pub h2: Vec<String>,
    #[serde(default)]
    pub h3: Vec<String>,
}

/// A structured-data entry: an arbitrary key/value bag tagged with a type label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredDataEntry {
    #[serde(rename = "type")]
    pub type_label: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl StructuredDataEntry {
    pub fn new(type_label: &str) -> Self {
        Self {
            type_label: type_label.to_string(),
            properties: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    /// Case-insensitive match against any of the given type labels
    pub fn is_type(&self, labels: &[&str]) -> bool {
        labels
            .iter()
            .any(|l| self.type_label.eq_ignore_ascii_case(l))
    }

    pub fn has(&self, key: &str) -> bool {
        match self.properties.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(_) => true,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// String values of a property that may be a single string or an array
    pub fn get_strings(&self, key: &str) -> Vec<&str> {
        match self.properties.get(key) {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn date(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get_str(key).and_then(parse_date)
    }

    /// `dateModified` wins over `datePublished` within the same entry
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        self.date("dateModified").or_else(|| self.date("datePublished"))
    }
}

/// Where an author record was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthorSource {
    StructuredData,
    Byline,
    MetaTag,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRecord {
    pub name: String,
    #[serde(default)]
    pub credentials: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub source: AuthorSource,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCounts {
    #[serde(default)]
    pub images: u32,
    #[serde(default)]
    pub videos: u32,
    /// Images not matched to a stock library upstream
    #[serde(default)]
    pub original_images: u32,
    #[serde(default)]
    pub images_with_alt: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCounts {
    #[serde(default)]
    pub internal: u32,
    #[serde(default)]
    pub external: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDates {
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified: Option<DateTime<Utc>>,
}

impl Document {
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn word_count(&self) -> usize {
        text::word_count(&self.text)
    }

    /// Structured entries matching any of the type labels
    pub fn entries_of_type<'a>(
        &'a self,
        labels: &'a [&'a str],
    ) -> impl Iterator<Item = &'a StructuredDataEntry> + 'a {
        self.structured_data.iter().filter(move |e| e.is_type(labels))
    }

    /// Date used for freshness and trend ordering. The first structured entry
    /// carrying a date decides; meta dates are the fallback.
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        self.structured_data
            .iter()
            .find_map(StructuredDataEntry::effective_date)
            .or(self.dates.modified)
            .or(self.dates.published)
    }

    /// Lowercased topic keywords from the title and headings
    pub fn keywords(&self) -> BTreeSet<String> {
        let mut sources: Vec<&str> = vec![self.title.as_str()];
        sources.extend(self.headings.h1.iter().map(String::as_str));
        sources.extend(self.headings.h2.iter().map(String::as_str));
        sources.extend(self.headings.h3.iter().map(String::as_str));
        sources
            .into_iter()
            .flat_map(text::words)
            .map(|w| w.to_lowercase())
            .filter(|w| w.chars().count() >= 4 && !text::is_stopword(w))
            .collect()
    }
}

/// One member of a corpus. `document` is `None` when upstream extraction failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusEntry {
    #[serde(default)]
    pub document: Option<Document>,
    /// Caller-supplied date; extracted from the document when absent
    #[serde(default)]
    pub effective_date: Option<DateTime<Utc>>,
}

impl CorpusEntry {
    pub fn new(document: Document) -> Self {
        Self {
            document: Some(document),
            effective_date: None,
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.effective_date = Some(date);
        self
    }

    pub fn resolved_date(&self) -> Option<DateTime<Utc>> {
        self.effective_date
            .or_else(|| self.document.as_ref().and_then(Document::effective_date))
    }
}

/// Parse the date formats seen in structured data: RFC 3339, naive
/// date-time, or a bare `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-03-05"), Some(expected));
        assert_eq!(parse_date("2024-03-05T00:00:00Z"), Some(expected));
        assert_eq!(parse_date("2024-03-05T00:00:00"), Some(expected));
        assert_eq!(
            parse_date("2024-03-05T02:00:00+02:00"),
            Some(expected)
        );
        assert_eq!(parse_date("March 5th"), None);
    }

    #[test]
    fn test_effective_date_prefers_modified_within_entry() {
        let entry = StructuredDataEntry::new("Article")
            .with("datePublished", json!("2023-01-01"))
            .with("dateModified", json!("2024-06-01"));
        assert_eq!(
            entry.effective_date(),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_document_effective_date_falls_back_to_meta() {
        let published = Utc.with_ymd_and_hms(2022, 2, 2, 0, 0, 0).unwrap();
        let doc = Document {
            structured_data: vec![StructuredDataEntry::new("Organization")],
            dates: DocumentDates {
                published: Some(published),
                modified: None,
            },
            ..Document::default()
        };
        assert_eq!(doc.effective_date(), Some(published));
    }

    #[test]
    fn test_corpus_entry_caller_date_wins() {
        let caller = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let doc = Document {
            structured_data: vec![
                StructuredDataEntry::new("BlogPosting").with("datePublished", json!("2020-01-01")),
            ],
            ..Document::default()
        };
        assert_eq!(CorpusEntry::new(doc.clone()).with_date(caller).resolved_date(), Some(caller));
        assert_eq!(
            CorpusEntry::new(doc).resolved_date(),
            Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(CorpusEntry::missing().resolved_date(), None);
    }

    #[test]
    fn test_keywords_skip_short_and_stopwords() {
        let doc = Document {
            title: "How to Brew Pour-Over Coffee From Your Kitchen".to_string(),
            headings: Headings {
                h2: vec!["Choosing a grinder".to_string()],
                ..Headings::default()
            },
            ..Document::default()
        };
        let kw = doc.keywords();
        assert!(kw.contains("brew"));
        assert!(kw.contains("coffee"));
        assert!(kw.contains("grinder"));
        assert!(kw.contains("kitchen"));
        assert!(!kw.contains("how"));
        assert!(!kw.contains("from"));
        assert!(!kw.contains("your"));
    }

    #[test]
    fn test_document_deserializes_with_defaults() {
        let doc: Document = serde_json::from_str(
            r#"{
                "title": "t",
                "structuredData": [{"type": "Article", "properties": {"headline": "t"}}],
                "authors": [{"name": "Ana", "source": "byline"}]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.structured_data[0].type_label, "Article");
        assert_eq!(doc.authors[0].source, AuthorSource::Byline);
        assert_eq!(doc.media, MediaCounts::default());
        assert!(!doc.has_text());
    }

    #[test]
    fn test_get_strings_handles_scalar_and_array() {
        let entry = StructuredDataEntry::new("Person")
            .with("sameAs", json!(["https://a.example", "https://b.example"]))
            .with("url", json!("https://c.example"));
        assert_eq!(entry.get_strings("sameAs").len(), 2);
        assert_eq!(entry.get_strings("url"), vec!["https://c.example"]);
        assert!(entry.get_strings("missing").is_empty());
    }
}
