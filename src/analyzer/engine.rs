//! Scoring engine - orchestrates detectors, aggregation and composition

use crate::config::Config;
use crate::corpus::{project, run_bounded, CorpusSummary, DocumentScore, PoolOptions, TaskFailure};
use crate::error::{check_variable, enforce};
use crate::ports::AnalysisPort;
use crate::telemetry::{document_fingerprint, fingerprint, trace_detector};
use crate::{
    CorpusEntry, CorpusInsights, Document, Enrichments, OverallScore, ScoringMode, VariableId,
    VariableResult,
};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use super::category::CategoryAggregator;
use super::detectors::{
    corpus_detectors, pure_detectors, run_corpus_detector, run_detector, Detector,
    DocumentContext, FirstPersonDetector,
};
use super::hybrid::{
    AbortOnDrop, Detection, HybridBranch, HybridCoordinator, HybridOutcome, DEFAULT_AI_TIMEOUT,
};
use super::scoring::ScoreComposer;
use crate::corpus::pool::DEFAULT_CONCURRENCY;

/// Default window for content freshness in corpus mode
pub const DEFAULT_FRESHNESS_WINDOW_DAYS: i64 = 365;

const MISSING_DOCUMENT: &str = "document could not be extracted";

/// Tunables for one engine instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    /// Upper bound on the AI branch of a hybrid race
    pub ai_timeout: Duration,
    /// In-flight AI calls while scoring a corpus
    pub corpus_concurrency: usize,
    /// Batch deadline for per-document AI work; unfinished documents count as 0
    pub corpus_deadline: Option<Duration>,
    pub freshness_window_days: i64,
    /// Whether the first-person variable may use the analysis port
    pub ai_enabled: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            ai_timeout: DEFAULT_AI_TIMEOUT,
            corpus_concurrency: DEFAULT_CONCURRENCY,
            corpus_deadline: None,
            freshness_window_days: DEFAULT_FRESHNESS_WINDOW_DAYS,
            ai_enabled: true,
        }
    }
}

impl EngineOptions {
    /// Options from a loaded config; unset fields keep their defaults
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            ai_timeout: config
                .ai_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.ai_timeout),
            corpus_concurrency: config
                .corpus_concurrency
                .unwrap_or(defaults.corpus_concurrency)
                .max(1),
            corpus_deadline: config.corpus_deadline_ms.map(Duration::from_millis),
            freshness_window_days: config
                .freshness_window_days
                .unwrap_or(defaults.freshness_window_days),
            ai_enabled: config.ai_enabled_for(VariableId::FirstPersonExperience),
        }
    }
}

/// Main scoring engine
///
/// Holds no per-call state; one engine can score any number of documents
/// and corpora concurrently.
#[derive(Clone, Default)]
pub struct ScoringEngine {
    port: Option<Arc<dyn AnalysisPort>>,
    /// Fixed "now" for age calculations; wall clock when unset
    reference_time: Option<DateTime<Utc>>,
    options: EngineOptions,
}

impl ScoringEngine {
    /// Create an engine with deterministic detectors only
    pub fn new() -> Self {
        Self::default()
    }

    /// Race first-person experience detection through an analysis port
    pub fn with_analysis_port(mut self, port: Arc<dyn AnalysisPort>) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_reference_time(mut self, as_of: DateTime<Utc>) -> Self {
        self.reference_time = Some(as_of);
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_config(self, config: &Config) -> Self {
        self.with_options(EngineOptions::from_config(config))
    }

    pub fn with_ai_timeout(mut self, timeout: Duration) -> Self {
        self.options.ai_timeout = timeout;
        self
    }

    pub fn with_corpus_concurrency(mut self, concurrency: usize) -> Self {
        self.options.corpus_concurrency = concurrency.max(1);
        self
    }

    pub fn with_corpus_deadline(mut self, deadline: Duration) -> Self {
        self.options.corpus_deadline = Some(deadline);
        self
    }

    pub fn with_freshness_window(mut self, days: i64) -> Self {
        self.options.freshness_window_days = days;
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn as_of(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    /// The hybrid coordinator, when a port is configured and allowed
    fn coordinator(&self) -> Option<HybridCoordinator> {
        if !self.options.ai_enabled {
            return None;
        }
        self.port.as_ref().map(|port| {
            HybridCoordinator::new(Arc::clone(port)).with_timeout(self.options.ai_timeout)
        })
    }

    /// Score a single document. Corpus-only variables are reported as
    /// unavailable and the overall score carries a degradation note.
    pub async fn score_document(
        &self,
        document: &Document,
        enrichments: &Enrichments,
    ) -> OverallScore {
        let ctx = DocumentContext {
            document,
            enrichments,
            as_of: self.as_of(),
        };
        let input_fingerprint = document_fingerprint(document);

        // The port call is in flight while the pure detectors run
        let detection = match self.coordinator() {
            Some(coordinator) => coordinator.start(&ctx),
            None => Detection::Ready(FirstPersonDetector::new().detect(&ctx)),
        };

        let mut results = {
            let document = Arc::new(document.clone());
            let enrichments = Arc::new(enrichments.clone());
            let input_fingerprint = input_fingerprint.clone();
            let as_of = ctx.as_of;
            run_blocking(move || {
                let ctx = DocumentContext {
                    document: &document,
                    enrichments: &enrichments,
                    as_of,
                };
                pure_detectors()
                    .par_iter()
                    .map(|detector| run_detector(detector.as_ref(), &ctx, &input_fingerprint))
                    .collect::<Vec<VariableResult>>()
            })
            .await
        };

        let outcome = detection.resolve().await;
        enforce(check_variable(&outcome.result));
        trace_detector(&outcome.result, &input_fingerprint);
        results.push(outcome.result);

        let categories =
            CategoryAggregator::new(ScoringMode::SingleDocument).aggregate_all(results);
        let score = ScoreComposer::compose(categories, ScoringMode::SingleDocument, None);
        tracing::info!(
            input_fingerprint = %input_fingerprint,
            overall = score.overall,
            status = ?score.status,
            first_person_branch = %outcome.branch,
            "document.scored"
        );
        score
    }

    /// Score an ordered corpus. Entries without a document stay in every
    /// denominator and score 0 with a note.
    pub async fn score_corpus(
        &self,
        entries: &[CorpusEntry],
        insights: Option<&CorpusInsights>,
        enrichments: &Enrichments,
    ) -> OverallScore {
        let as_of = self.as_of();
        let dates: Vec<Option<DateTime<Utc>>> =
            entries.iter().map(CorpusEntry::resolved_date).collect();
        let shared_entries = Arc::new(entries.to_vec());
        let shared_enrichments = Arc::new(enrichments.clone());

        // Start the bounded AI pool before the CPU-bound fan-out. Dropping
        // this call aborts the pool and every race inside it.
        let pending = self.coordinator().map(|coordinator| {
            let tasks: Vec<_> = entries
                .iter()
                .map(|entry| {
                    let coordinator = coordinator.clone();
                    let document = entry.document.clone();
                    let enrichments = enrichments.clone();
                    async move {
                        let document = document?;
                        let ctx = DocumentContext {
                            document: &document,
                            enrichments: &enrichments,
                            as_of,
                        };
                        let outcome = coordinator.detect(&ctx).await;
                        trace_detector(&outcome.result, &document_fingerprint(&document));
                        Some(outcome)
                    }
                })
                .collect();
            let options = PoolOptions {
                concurrency: self.options.corpus_concurrency,
                deadline: self.options.corpus_deadline,
            };
            AbortOnDrop(tokio::spawn(run_bounded(tasks, options)))
        });

        let per_document = {
            let entries = Arc::clone(&shared_entries);
            let enrichments = Arc::clone(&shared_enrichments);
            run_blocking(move || pure_results(&entries, &enrichments, as_of)).await
        };

        let detectors = pure_detectors();
        let mut results: Vec<VariableResult> = detectors
            .iter()
            .enumerate()
            .map(|(index, detector)| {
                let scores: Vec<DocumentScore> = per_document
                    .iter()
                    .zip(&dates)
                    .map(|(doc_results, date)| match doc_results {
                        Some(doc_results) => {
                            DocumentScore::scored(doc_results[index].actual_score, *date)
                        }
                        None => DocumentScore::failed(MISSING_DOCUMENT, *date),
                    })
                    .collect();
                project(detector.id(), &scores).into_result()
            })
            .collect();

        let first_person = match pending {
            Some(mut handle) => {
                let outcomes = match (&mut handle.0).await {
                    Ok(outcomes) => outcomes,
                    Err(e) => {
                        tracing::error!(error = %e, "corpus pool aborted");
                        entries.iter().map(|_| Err(TaskFailure::Panicked)).collect()
                    }
                };
                log_branches(&outcomes);
                outcomes
                    .into_iter()
                    .zip(&dates)
                    .map(|(outcome, date)| match outcome {
                        Ok(Some(outcome)) => {
                            DocumentScore::scored(outcome.result.actual_score, *date)
                        }
                        Ok(None) => DocumentScore::failed(MISSING_DOCUMENT, *date),
                        Err(failure) => DocumentScore::failed(failure.to_string(), *date),
                    })
                    .collect::<Vec<_>>()
            }
            None => {
                let entries = Arc::clone(&shared_entries);
                let enrichments = Arc::clone(&shared_enrichments);
                run_blocking(move || first_person_results(&entries, &enrichments, as_of))
                    .await
                    .into_iter()
                    .zip(&dates)
                    .map(|(score, date)| match score {
                        Some(score) => DocumentScore::scored(score, *date),
                        None => DocumentScore::failed(MISSING_DOCUMENT, *date),
                    })
                    .collect::<Vec<_>>()
            }
        };

        let first_person_scores: Vec<Option<f64>> = first_person
            .iter()
            .map(|s| s.failure.is_none().then_some(s.score))
            .collect();
        results.push(project(VariableId::FirstPersonExperience, &first_person).into_result());

        let summary = CorpusSummary::build(
            entries,
            &first_person_scores,
            as_of,
            self.options.freshness_window_days,
            insights,
        );
        let summary_fingerprint = match serde_json::to_vec(&summary) {
            Ok(bytes) => fingerprint(&bytes),
            Err(_) => fingerprint(format!("{:?}", summary).as_bytes()),
        };
        results.extend(corpus_detectors().iter().map(|detector| {
            run_corpus_detector(detector.as_ref(), &summary, &summary_fingerprint)
        }));

        let categories = CategoryAggregator::new(ScoringMode::Corpus).aggregate_all(results);
        let score = ScoreComposer::compose(categories, ScoringMode::Corpus, Some(entries.len()));
        tracing::info!(
            posts_analyzed = entries.len(),
            readable = summary.readable_documents,
            overall = score.overall,
            status = ?score.status,
            "corpus.scored"
        );
        score
    }
}

/// Run CPU-bound detector work on the blocking pool so async workers stay free
async fn run_blocking<T, F>(work: F) -> T
where
    F: Fn() -> T + Send + Sync + 'static,
    T: Send + 'static,
{
    let work = Arc::new(work);
    let task = Arc::clone(&work);
    match tokio::task::spawn_blocking(move || (*task)()).await {
        Ok(value) => value,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => {
            tracing::warn!(error = %e, "blocking pool unavailable; scoring inline");
            (*work)()
        }
    }
}

/// Pure detector results per entry, in `pure_detectors()` order
fn pure_results(
    entries: &[CorpusEntry],
    enrichments: &Enrichments,
    as_of: DateTime<Utc>,
) -> Vec<Option<Vec<VariableResult>>> {
    let detectors = pure_detectors();
    entries
        .par_iter()
        .map(|entry| {
            entry.document.as_ref().map(|document| {
                let ctx = DocumentContext {
                    document,
                    enrichments,
                    as_of,
                };
                let input_fingerprint = document_fingerprint(document);
                detectors
                    .iter()
                    .map(|detector| run_detector(detector.as_ref(), &ctx, &input_fingerprint))
                    .collect()
            })
        })
        .collect()
}

/// Deterministic first-person scores; `None` for entries without a document
fn first_person_results(
    entries: &[CorpusEntry],
    enrichments: &Enrichments,
    as_of: DateTime<Utc>,
) -> Vec<Option<f64>> {
    let detector = FirstPersonDetector::new();
    entries
        .par_iter()
        .map(|entry| {
            entry.document.as_ref().map(|document| {
                let ctx = DocumentContext {
                    document,
                    enrichments,
                    as_of,
                };
                run_detector(&detector, &ctx, &document_fingerprint(document)).actual_score
            })
        })
        .collect()
}

fn log_branches(outcomes: &[Result<Option<HybridOutcome>, TaskFailure>]) {
    let count = |branch: HybridBranch| {
        outcomes
            .iter()
            .filter(|o| matches!(o, Ok(Some(outcome)) if outcome.branch == branch))
            .count()
    };
    let cancelled = outcomes.iter().filter(|o| o.is_err()).count();
    tracing::info!(
        ai_won = count(HybridBranch::AiWon),
        timeout_fallback = count(HybridBranch::AiTimeoutFallback),
        error_fallback = count(HybridBranch::AiErrorFallback),
        cancelled,
        "corpus.hybrid_summary"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{AuthorRecord, AuthorSource, StructuredDataEntry};
    use crate::ports::{AnalysisPayload, PortError, PromptContext};
    use crate::{EvidenceKind, Rating};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn review(days_old: i64) -> Document {
        let published = (as_of() - chrono::Duration::days(days_old)).format("%Y-%m-%d").to_string();
        Document {
            url: Some("https://example.com/grinder-review".to_string()),
            title: "Burr grinder review".to_string(),
            text: "I tested this burr grinder for six weeks. After 3 weeks I noticed the burrs \
                   drifting by 0.2 mm. In my experience the stepless dial matters. The grinder \
                   costs $249 and holds 250 g of beans. We compared it with our old grinder."
                .to_string(),
            structured_data: vec![StructuredDataEntry::new("Article")
                .with("headline", json!("Burr grinder review"))
                .with("datePublished", json!(published))],
            authors: vec![AuthorRecord {
                name: "Dana Whitfield".to_string(),
                source: AuthorSource::Byline,
                ..AuthorRecord::default()
            }],
            ..Document::default()
        }
    }

    enum Behavior {
        Hang,
        Reply(f64),
    }

    struct ScriptedPort(Behavior);

    #[async_trait]
    impl AnalysisPort for ScriptedPort {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn analyze(&self, _prompt: &PromptContext) -> Result<AnalysisPayload, PortError> {
            match self.0 {
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(PortError::Unavailable("never".to_string()))
                }
                Behavior::Reply(score) => Ok(AnalysisPayload {
                    score,
                    confidence: 0.8,
                    rationale: "first-hand testing".to_string(),
                    signals: vec![],
                }),
            }
        }
    }

    fn engine() -> ScoringEngine {
        ScoringEngine::new().with_reference_time(as_of())
    }

    #[tokio::test]
    async fn test_single_document_reports_unavailable_variables() {
        let score = engine().score_document(&review(30), &Enrichments::none()).await;
        assert_eq!(score.mode, ScoringMode::SingleDocument);
        assert!(score.posts_analyzed.is_none());
        assert!(score.overall > 0.0 && score.overall <= 78.0);
        let note = score.degradation_note.as_deref().unwrap();
        assert!(note.contains("22 points"), "{}", note);
        for category in score.categories.iter() {
            assert_eq!(category.variables.len(), category.category.variables().len() - 1);
            assert_eq!(category.unavailable_variables.as_ref().map(Vec::len), Some(1));
        }
        assert!(score.categories.variable(VariableId::TopicalFocus).is_none());
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_output() {
        let doc = review(30);
        let a = engine().score_document(&doc, &Enrichments::none()).await;
        let b = engine().score_document(&doc, &Enrichments::none()).await;
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[tokio::test]
    async fn test_port_timeout_matches_deterministic_engine() {
        let doc = review(30);
        let plain = engine().score_document(&doc, &Enrichments::none()).await;
        let hybrid = engine()
            .with_analysis_port(Arc::new(ScriptedPort(Behavior::Hang)))
            .with_ai_timeout(Duration::from_millis(30))
            .score_document(&doc, &Enrichments::none())
            .await;
        assert_eq!(serde_json::to_string(&plain).unwrap(), serde_json::to_string(&hybrid).unwrap());
    }

    #[tokio::test]
    async fn test_port_reply_is_used() {
        let score = engine()
            .with_analysis_port(Arc::new(ScriptedPort(Behavior::Reply(0.5))))
            .score_document(&review(30), &Enrichments::none())
            .await;
        let r = score.categories.variable(VariableId::FirstPersonExperience).unwrap();
        assert_eq!(r.actual_score, 4.0);
    }

    #[tokio::test]
    async fn test_disabled_ai_skips_port() {
        let options = EngineOptions {
            ai_enabled: false,
            ..EngineOptions::default()
        };
        let doc = review(30);
        let plain = engine().score_document(&doc, &Enrichments::none()).await;
        let score = engine()
            .with_analysis_port(Arc::new(ScriptedPort(Behavior::Reply(0.1))))
            .with_options(options)
            .score_document(&doc, &Enrichments::none())
            .await;
        assert_eq!(plain, score);
    }

    #[tokio::test]
    async fn test_corpus_counts_missing_documents() {
        let entries = vec![
            CorpusEntry::new(review(10)),
            CorpusEntry::new(review(40)),
            CorpusEntry::missing(),
            CorpusEntry::new(review(70)),
        ];
        let score = engine().score_corpus(&entries, None, &Enrichments::none()).await;
        assert_eq!(score.mode, ScoringMode::Corpus);
        assert_eq!(score.posts_analyzed, Some(4));
        assert!(score.degradation_note.is_none());

        let depth = score.categories.variable(VariableId::ContentDepth).unwrap();
        assert!(depth
            .evidence
            .iter()
            .any(|e| e.label.as_deref() == Some("Sample size") && e.value == "4"));
        assert!(depth
            .evidence
            .iter()
            .any(|e| e.kind == EvidenceKind::Note && e.value.contains("1 of 4 documents")));
        assert!(score.categories.variable(VariableId::TopicalFocus).is_some());
    }

    #[tokio::test]
    async fn test_empty_corpus_scores_zero() {
        let score = engine().score_corpus(&[], None, &Enrichments::none()).await;
        assert_eq!(score.overall, 0.0);
        assert_eq!(score.status, Rating::Poor);
        assert_eq!(score.posts_analyzed, Some(0));
        for category in score.categories.iter() {
            assert_eq!(category.total_score, 0.0);
        }
    }

    #[tokio::test]
    async fn test_corpus_deadline_turns_pending_documents_into_failures() {
        let entries = vec![CorpusEntry::new(review(10)), CorpusEntry::new(review(20))];
        let score = engine()
            .with_analysis_port(Arc::new(ScriptedPort(Behavior::Hang)))
            .with_corpus_deadline(Duration::from_millis(30))
            .score_corpus(&entries, None, &Enrichments::none())
            .await;
        let r = score.categories.variable(VariableId::FirstPersonExperience).unwrap();
        assert_eq!(r.actual_score, 0.0);
        assert!(r.evidence.iter().any(|e| e.value.contains("2 of 2 documents")));
        // Pure detectors are unaffected by the pool deadline
        assert!(score.categories.variable(VariableId::SpecificDetails).unwrap().actual_score > 0.0);
    }

    struct CountingPort {
        started: Arc<AtomicUsize>,
        finished: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AnalysisPort for CountingPort {
        fn name(&self) -> &str {
            "counting"
        }

        async fn analyze(&self, _prompt: &PromptContext) -> Result<AnalysisPayload, PortError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(300)).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            Err(PortError::Unavailable("slow".to_string()))
        }
    }

    #[tokio::test]
    async fn test_dropping_corpus_call_cancels_port_work() {
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let engine = engine().with_analysis_port(Arc::new(CountingPort {
            started: Arc::clone(&started),
            finished: Arc::clone(&finished),
        }));
        let entries = vec![CorpusEntry::new(review(10)), CorpusEntry::new(review(20))];

        let abandoned = tokio::time::timeout(
            Duration::from_millis(100),
            engine.score_corpus(&entries, None, &Enrichments::none()),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(started.load(Ordering::SeqCst) > 0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_options_from_config() {
        let config: Config = serde_json::from_str(
            r#"{ "aiTimeoutMs": 1500, "corpusConcurrency": 0, "freshnessWindowDays": 90,
                 "variables": { "first-person-experience": { "ai": false } } }"#,
        )
        .unwrap();
        let options = EngineOptions::from_config(&config);
        assert_eq!(options.ai_timeout, Duration::from_millis(1500));
        assert_eq!(options.corpus_concurrency, 1);
        assert_eq!(options.corpus_deadline, None);
        assert_eq!(options.freshness_window_days, 90);
        assert!(!options.ai_enabled);
    }
}
