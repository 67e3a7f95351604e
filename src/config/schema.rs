//! Config schema and deserialization

use crate::VariableId;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Per-variable override
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableOverride {
    /// Set to false to keep the variable on its deterministic detector
    #[serde(default)]
    pub ai: Option<bool>,
}

/// Root config structure for .credencerc.json
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default)]
    pub extends: Option<String>,

    /// Minimum overall score (exit 1 if below). Default: none
    #[serde(default)]
    pub threshold: Option<f64>,

    /// Upper bound on an AI analysis call in milliseconds. Default: 8000
    #[serde(default)]
    pub ai_timeout_ms: Option<u64>,

    /// Model requested from the AI port
    #[serde(default)]
    pub model: Option<String>,

    /// In-flight AI calls while scoring a corpus. Default: 4
    #[serde(default)]
    pub corpus_concurrency: Option<usize>,

    /// Batch deadline for corpus AI work in milliseconds
    #[serde(default)]
    pub corpus_deadline_ms: Option<u64>,

    /// Documents dated inside this many days count as fresh. Default: 365
    #[serde(default)]
    pub freshness_window_days: Option<i64>,

    /// Per-variable overrides keyed by variable id
    #[serde(default)]
    pub variables: BTreeMap<VariableId, VariableOverride>,

    /// Glob patterns for files to skip when reading a corpus directory
    #[serde(default)]
    pub ignore: Vec<String>,

    /// File suffixes read as documents from a corpus directory (default: .json)
    #[serde(default)]
    pub document_patterns: Vec<String>,
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(
        mut self,
        cli_threshold: Option<f64>,
        cli_timeout_ms: Option<u64>,
    ) -> Self {
        if cli_threshold.is_some() {
            self.threshold = cli_threshold;
        }
        if cli_timeout_ms.is_some() {
            self.ai_timeout_ms = cli_timeout_ms;
        }
        self
    }

    /// Whether the AI path is allowed for a variable
    pub fn ai_enabled_for(&self, id: VariableId) -> bool {
        self.variables
            .get(&id)
            .and_then(|o| o.ai)
            .unwrap_or(true)
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        // Base values are overridden by this config's values
        if self.threshold.is_none() {
            self.threshold = base.threshold;
        }
        if self.ai_timeout_ms.is_none() {
            self.ai_timeout_ms = base.ai_timeout_ms;
        }
        if self.model.is_none() {
            self.model = base.model;
        }
        if self.corpus_concurrency.is_none() {
            self.corpus_concurrency = base.corpus_concurrency;
        }
        if self.corpus_deadline_ms.is_none() {
            self.corpus_deadline_ms = base.corpus_deadline_ms;
        }
        if self.freshness_window_days.is_none() {
            self.freshness_window_days = base.freshness_window_days;
        }

        for (id, base_override) in base.variables {
            let entry = self.variables.entry(id).or_default();
            if entry.ai.is_none() {
                entry.ai = base_override.ai;
            }
        }

        let mut all_ignores = base.ignore;
        all_ignores.append(&mut self.ignore);
        self.ignore = all_ignores;

        if self.document_patterns.is_empty() {
            self.document_patterns = base.document_patterns;
        }
    }

    /// Suffixes of files read as documents
    pub fn get_document_patterns(&self) -> Vec<&str> {
        if self.document_patterns.is_empty() {
            vec![".json"]
        } else {
            self.document_patterns.iter().map(|s| s.as_str()).collect()
        }
    }
}
