//! External ports: the AI analysis port and pre-fetched enrichment signals
//!
//! None of these are required. Absence or failure of a port degrades the
//! affected variable to a deterministic estimate; scoring always succeeds.

pub mod claude;

use crate::document::{text, Document};
use crate::VariableId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use claude::ClaudeAnalysisPort;

/// Failure of an external port. Always absorbed by the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortError {
    #[error("ANTHROPIC_API_KEY environment variable not set")]
    NoApiKey,
    #[error("analysis port unavailable: {0}")]
    Unavailable(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("rate limited - try again later")]
    RateLimited,
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Prompt derived from a document for one variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptContext {
    pub variable: VariableId,
    pub title: String,
    pub excerpt: String,
    pub instructions: String,
}

/// Longest body excerpt sent to the port
pub const PROMPT_EXCERPT_CHARS: usize = 6000;

impl PromptContext {
    /// Default prompt for first-hand experience detection
    pub fn experience(document: &Document) -> Self {
        Self {
            variable: VariableId::FirstPersonExperience,
            title: document.title.clone(),
            excerpt: text::excerpt(&document.text, PROMPT_EXCERPT_CHARS).to_string(),
            instructions: "Judge whether the author writes from first-hand experience: personal testing, \
                 direct observation, lessons learned, specific anecdotes. Respond with JSON only: \
                 {\"score\": 0.0-1.0, \"confidence\": 0.0-1.0, \"rationale\": \"...\", \
                 \"signals\": [\"quoted phrase\", ...]}"
                .to_string(),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{}\n\n## Title\n{}\n\n## Content\n{}\n",
            self.instructions, self.title, self.excerpt
        )
    }
}

/// Structured reply from the analysis port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPayload {
    /// Fraction of the variable's ceiling, 0.0-1.0
    pub score: f64,
    pub confidence: f64,
    pub rationale: String,
    #[serde(default)]
    pub signals: Vec<String>,
}

impl AnalysisPayload {
    /// Reject payloads that are out of range or carry no rationale
    pub fn validate(&self) -> Result<(), PortError> {
        if !self.score.is_finite() || !(0.0..=1.0).contains(&self.score) {
            return Err(PortError::Malformed(format!(
                "score {} outside 0.0-1.0",
                self.score
            )));
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(PortError::Malformed(format!(
                "confidence {} outside 0.0-1.0",
                self.confidence
            )));
        }
        if self.rationale.trim().is_empty() {
            return Err(PortError::Malformed("empty rationale".to_string()));
        }
        Ok(())
    }

    /// Parse the first JSON object found in a model reply
    pub fn from_reply(reply: &str) -> Result<Self, PortError> {
        let start = reply
            .find('{')
            .ok_or_else(|| PortError::Malformed("no JSON object in reply".to_string()))?;
        let end = reply
            .rfind('}')
            .filter(|end| *end > start)
            .ok_or_else(|| PortError::Malformed("unterminated JSON object".to_string()))?;
        serde_json::from_str(&reply[start..=end]).map_err(|e| PortError::Malformed(e.to_string()))
    }
}

/// External analysis service consulted by the hybrid coordinator
#[async_trait]
pub trait AnalysisPort: Send + Sync {
    /// Name for logs
    fn name(&self) -> &str;

    /// One attempt; timeouts are imposed by the caller
    async fn analyze(&self, prompt: &PromptContext) -> Result<AnalysisPayload, PortError>;
}

/// Domain-level signals pre-fetched from an authority/metrics provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainMetrics {
    /// Provider authority score, 0-100
    #[serde(default)]
    pub authority_score: Option<f64>,
    #[serde(default)]
    pub referring_domains: Option<u64>,
    #[serde(default)]
    pub inbound_links: Option<u64>,
}

/// Pre-fetched signals about the author's external presence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationSignals {
    #[serde(default)]
    pub verified_profiles: u32,
    #[serde(default)]
    pub mentions: u32,
    #[serde(default)]
    pub awards: u32,
    #[serde(default)]
    pub has_knowledge_panel: bool,
}

/// Optional enrichments resolved before scoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichments {
    #[serde(default)]
    pub domain_metrics: Option<DomainMetrics>,
    #[serde(default)]
    pub reputation: Option<ReputationSignals>,
}

impl Enrichments {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_domain_metrics(mut self, metrics: DomainMetrics) -> Self {
        self.domain_metrics = Some(metrics);
        self
    }

    pub fn with_reputation(mut self, reputation: ReputationSignals) -> Self {
        self.reputation = Some(reputation);
        self
    }
}
