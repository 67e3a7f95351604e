//! Edge case tests: degenerate inputs must not panic and stay in bounds.

use chrono::{DateTime, Duration, TimeZone, Utc};
use credence::corpus::CadenceStats;
use credence::document::{MediaCounts, StructuredDataEntry};
use credence::{
    CorpusEntry, CorpusInsights, Document, Enrichments, EvidenceKind, ScoringEngine, VariableId,
};
use serde_json::json;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

fn engine() -> ScoringEngine {
    ScoringEngine::new().with_reference_time(as_of())
}

fn note_contains(score: &credence::OverallScore, id: VariableId, needle: &str) -> bool {
    score
        .categories
        .variable(id)
        .unwrap()
        .evidence
        .iter()
        .any(|e| e.kind == EvidenceKind::Note && e.value.contains(needle))
}

#[tokio::test]
async fn empty_document_no_panic() {
    let score = engine().score_document(&Document::default(), &Enrichments::none()).await;
    assert!(score.overall >= 0.0 && score.overall <= 78.0);
    for category in score.categories.iter() {
        for v in &category.variables {
            assert!(v.is_within_bounds());
            assert!(!v.evidence.is_empty(), "{} has no evidence", v.id);
        }
    }
    assert!(note_contains(&score, VariableId::FirstPersonExperience, "Insufficient data"));
}

#[tokio::test]
async fn absurd_counts_stay_in_bounds() {
    let doc = Document {
        text: "word ".repeat(50_000),
        media: MediaCounts {
            images: 3,
            videos: u32::MAX,
            original_images: u32::MAX,
            images_with_alt: u32::MAX,
        },
        ..Document::default()
    };
    let score = engine().score_document(&doc, &Enrichments::none()).await;
    let media = score.categories.variable(VariableId::OriginalMedia).unwrap();
    assert!(media.is_within_bounds());
    assert_eq!(media.actual_score, media.max_score);
    assert_eq!(score.categories.variable(VariableId::ContentDepth).unwrap().actual_score, 7.0);
}

#[tokio::test]
async fn future_dated_document_counts_as_new() {
    let doc = Document {
        text: "Launch notes.".to_string(),
        structured_data: vec![StructuredDataEntry::new("Article")
            .with("datePublished", json!("2030-01-01"))],
        ..Document::default()
    };
    let score = engine().score_document(&doc, &Enrichments::none()).await;
    let freshness = score.categories.variable(VariableId::ContentFreshness).unwrap();
    assert_eq!(freshness.actual_score, 7.0);
    assert!(note_contains(&score, VariableId::ContentFreshness, "after the reference time"));
}

#[tokio::test]
async fn unparseable_dates_are_ignored() {
    let doc = Document {
        text: "Some text.".to_string(),
        structured_data: vec![StructuredDataEntry::new("Article")
            .with("datePublished", json!("last Tuesday"))],
        ..Document::default()
    };
    let score = engine().score_document(&doc, &Enrichments::none()).await;
    assert!(note_contains(
        &score,
        VariableId::ContentFreshness,
        "no publication or modification date"
    ));
}

#[tokio::test]
async fn empty_corpus_is_all_insufficient() {
    let score = engine().score_corpus(&[], None, &Enrichments::none()).await;
    assert_eq!(score.overall, 0.0);
    assert_eq!(score.posts_analyzed, Some(0));
    for category in score.categories.iter() {
        for v in &category.variables {
            assert_eq!(v.actual_score, 0.0);
            assert!(v.evidence[0].value.starts_with("Insufficient data"), "{}", v.id);
        }
    }
}

#[tokio::test]
async fn empty_corpus_ignores_supplied_insights() {
    let insights = CorpusInsights {
        topic_coverage: Some(0.9),
        cadence: Some(CadenceStats {
            dated_posts: 20,
            mean_gap_days: 7.0,
            gap_cv: 0.1,
            posts_per_month: 4.3,
        }),
        experience_share: Some(0.8),
    };
    let score = engine()
        .score_corpus(&[], Some(&insights), &Enrichments::none())
        .await;
    assert_eq!(score.overall, 0.0);
    for id in [
        VariableId::ExperienceConsistency,
        VariableId::TopicalFocus,
        VariableId::PublishingCadence,
        VariableId::FreshnessRate,
    ] {
        let v = score.categories.variable(id).unwrap();
        assert_eq!(v.actual_score, 0.0, "{}", id);
        assert!(note_contains(&score, id, "corpus is empty"), "{}", id);
    }
}

#[tokio::test]
async fn malformed_entry_stays_in_denominator() {
    let doc = |days: i64| {
        CorpusEntry::new(Document {
            title: "Grinder retention".to_string(),
            text: "I tested retention for two weeks. In my experience it is low.".to_string(),
            ..Document::default()
        })
        .with_date(as_of() - Duration::days(days))
    };
    let entries = vec![doc(10), doc(20), CorpusEntry::missing(), doc(30), doc(40)];
    let score = engine().score_corpus(&entries, None, &Enrichments::none()).await;
    assert_eq!(score.posts_analyzed, Some(5));

    let depth = score.categories.variable(VariableId::ContentDepth).unwrap();
    let sample = depth
        .evidence
        .iter()
        .find(|e| e.label.as_deref() == Some("Sample size"))
        .unwrap();
    assert_eq!(sample.value, "5");
    assert!(note_contains(
        &score,
        VariableId::ContentDepth,
        "1 of 5 documents could not be scored"
    ));

    // Four of five documents are fresh; the missing one has no date
    let freshness = score.categories.variable(VariableId::FreshnessRate).unwrap();
    assert_eq!(freshness.actual_score, 4.8);
}

#[tokio::test]
async fn single_entry_corpus_lacks_corpus_signals() {
    let entries = vec![CorpusEntry::new(Document {
        title: "Only post".to_string(),
        text: "Text.".to_string(),
        ..Document::default()
    })];
    let score = engine().score_corpus(&entries, None, &Enrichments::none()).await;
    assert!(note_contains(&score, VariableId::TopicalFocus, "Insufficient data"));
    assert!(note_contains(&score, VariableId::PublishingCadence, "Insufficient data"));
}

#[tokio::test]
async fn identical_dates_have_no_cadence() {
    let date = as_of() - Duration::days(5);
    let entries: Vec<CorpusEntry> = (0..4)
        .map(|i| {
            CorpusEntry::new(Document {
                title: format!("Post {}", i),
                ..Document::default()
            })
            .with_date(date)
        })
        .collect();
    let score = engine().score_corpus(&entries, None, &Enrichments::none()).await;
    assert_eq!(
        score.categories.variable(VariableId::PublishingCadence).unwrap().actual_score,
        0.0
    );
}
