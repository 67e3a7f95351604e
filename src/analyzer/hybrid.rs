//! Hybrid detection: an analysis port raced against a deterministic detector
//!
//! The AI call is spawned first and the deterministic branch runs while it is
//! in flight. The AI result is adopted only if it arrives valid before the
//! timeout; otherwise the deterministic result is returned untouched, so a
//! slow or failing port produces exactly the output of the pure detector.

use super::detectors::{Detector, DocumentContext, FirstPersonDetector};
use super::thresholds;
use crate::ports::{AnalysisPayload, AnalysisPort, PortError, PromptContext};
use crate::{Document, EvidenceItem, VariableId, VariableResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const DEFAULT_AI_TIMEOUT: Duration = Duration::from_millis(8000);
const MAX_SIGNAL_SNIPPETS: usize = 5;

/// Builds the port prompt for a document
pub type PromptBuilder = fn(&Document) -> PromptContext;

/// Which branch produced the final result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HybridBranch {
    /// No port configured
    DeterministicOnly,
    AiWon,
    AiTimeoutFallback,
    AiErrorFallback,
}

impl std::fmt::Display for HybridBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HybridBranch::DeterministicOnly => write!(f, "deterministic-only"),
            HybridBranch::AiWon => write!(f, "ai-won"),
            HybridBranch::AiTimeoutFallback => write!(f, "ai-timeout-fallback"),
            HybridBranch::AiErrorFallback => write!(f, "ai-error-fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HybridOutcome {
    pub result: VariableResult,
    pub branch: HybridBranch,
}

/// Aborts the wrapped task when dropped, so abandoned races do not leak calls
pub(crate) struct AbortOnDrop<T>(pub(crate) JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A detector outcome: either available now or awaiting a bounded race
pub enum Detection {
    Ready(VariableResult),
    Pending(PendingRace),
}

impl Detection {
    /// Declared upper bound on the asynchronous part, if any
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Detection::Ready(_) => None,
            Detection::Pending(race) => Some(race.timeout),
        }
    }

    pub async fn resolve(self) -> HybridOutcome {
        match self {
            Detection::Ready(result) => HybridOutcome {
                result,
                branch: HybridBranch::DeterministicOnly,
            },
            Detection::Pending(race) => race.finish().await,
        }
    }
}

/// An in-flight race; the fallback is already computed
pub struct PendingRace {
    call: AbortOnDrop<Result<AnalysisPayload, PortError>>,
    fallback: VariableResult,
    deadline: Instant,
    timeout: Duration,
    port_name: String,
}

impl PendingRace {
    pub async fn finish(mut self) -> HybridOutcome {
        let id = self.fallback.id;
        let reply = tokio::time::timeout_at(self.deadline, &mut self.call.0).await;
        let outcome = match reply {
            Ok(Ok(Ok(payload))) => match payload.validate() {
                Ok(()) => HybridOutcome {
                    result: from_payload(id, payload, &self.port_name),
                    branch: HybridBranch::AiWon,
                },
                Err(e) => {
                    tracing::warn!(
                        variable_id = %id,
                        port = %self.port_name,
                        error = %e,
                        "rejected analysis payload"
                    );
                    self.fallback_outcome(HybridBranch::AiErrorFallback)
                }
            },
            Ok(Ok(Err(e))) => {
                tracing::warn!(
                    variable_id = %id,
                    port = %self.port_name,
                    error = %e,
                    "analysis port failed"
                );
                self.fallback_outcome(HybridBranch::AiErrorFallback)
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    variable_id = %id,
                    port = %self.port_name,
                    error = %e,
                    "analysis task aborted"
                );
                self.fallback_outcome(HybridBranch::AiErrorFallback)
            }
            Err(_) => {
                tracing::warn!(
                    variable_id = %id,
                    port = %self.port_name,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "analysis port timed out"
                );
                self.fallback_outcome(HybridBranch::AiTimeoutFallback)
            }
        };
        tracing::info!(variable_id = %id, branch = %outcome.branch, "hybrid.resolved");
        outcome
    }

    fn fallback_outcome(&self, branch: HybridBranch) -> HybridOutcome {
        HybridOutcome {
            result: self.fallback.clone(),
            branch,
        }
    }
}

/// Convert a validated payload into the variable's result
fn from_payload(id: VariableId, payload: AnalysisPayload, port_name: &str) -> VariableResult {
    let max = thresholds::lookup(id).max_score;
    let confidence = payload.confidence;
    let mut evidence = vec![
        EvidenceItem::metric("AI assessment", format!("{:.2}", payload.score))
            .with_confidence(confidence),
        EvidenceItem::note(payload.rationale).with_label(port_name),
    ];
    evidence.extend(
        payload
            .signals
            .into_iter()
            .take(MAX_SIGNAL_SNIPPETS)
            .map(|s| EvidenceItem::snippet(s).with_confidence(confidence)),
    );
    VariableResult::scored(id, payload.score * max, evidence)
}

/// Races an analysis port against a deterministic detector for one variable
#[derive(Clone)]
pub struct HybridCoordinator {
    port: Arc<dyn AnalysisPort>,
    fallback: Arc<dyn Detector>,
    prompt: PromptBuilder,
    timeout: Duration,
}

impl HybridCoordinator {
    /// First-person experience coordinator with the default timeout
    pub fn new(port: Arc<dyn AnalysisPort>) -> Self {
        Self {
            port,
            fallback: Arc::new(FirstPersonDetector::new()),
            prompt: PromptContext::experience,
            timeout: DEFAULT_AI_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Race a different variable
    pub fn with_fallback(mut self, fallback: Arc<dyn Detector>, prompt: PromptBuilder) -> Self {
        self.fallback = fallback;
        self.prompt = prompt;
        self
    }

    pub fn id(&self) -> VariableId {
        self.fallback.id()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start the race. The port call is in flight when this returns and the
    /// deterministic result has been computed. Must be called inside a Tokio
    /// runtime.
    pub fn start(&self, ctx: &DocumentContext<'_>) -> Detection {
        let deadline = Instant::now() + self.timeout;
        let port = Arc::clone(&self.port);
        let prompt = (self.prompt)(ctx.document);
        let call = AbortOnDrop(tokio::spawn(async move { port.analyze(&prompt).await }));
        tracing::debug!(variable_id = %self.id(), port = self.port.name(), "hybrid.race_started");

        let fallback = self.fallback.detect(ctx);
        Detection::Pending(PendingRace {
            call,
            fallback,
            deadline,
            timeout: self.timeout,
            port_name: self.port.name().to_string(),
        })
    }

    /// Start and resolve in one step
    pub async fn detect(&self, ctx: &DocumentContext<'_>) -> HybridOutcome {
        self.start(ctx).resolve().await
    }
}
