//! Structured tracing for detector invocations
//!
//! Every detector run emits one `detector.scored` event carrying the
//! variable id, a fingerprint of the input, the score and the evidence count.

use crate::{Document, VariableResult};
use sha2::{Digest, Sha256};
use tracing_subscriber::{fmt, EnvFilter};

/// Hex characters kept from the SHA-256 digest
const FINGERPRINT_LEN: usize = 16;

/// Initialize the tracing subscriber with env-based filtering.
///
/// Reads `RUST_LOG` (or `CREDENCE_LOG`) to set the filter.
/// Defaults to `default_level` if neither is set. Safe to call twice.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .or_else(|_| EnvFilter::try_from_env("CREDENCE_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Short SHA-256 fingerprint of arbitrary bytes
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let mut hex = hex::encode(hasher.finalize());
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Fingerprint of a document's full feature set
pub fn document_fingerprint(document: &Document) -> String {
    match serde_json::to_vec(document) {
        Ok(bytes) => fingerprint(&bytes),
        Err(_) => fingerprint(document.text.as_bytes()),
    }
}

/// Emit the per-invocation trace event
pub fn trace_detector(result: &VariableResult, input_fingerprint: &str) {
    tracing::debug!(
        target: "credence::detector",
        variable_id = %result.id,
        input_fingerprint,
        score = result.actual_score,
        evidence_count = result.evidence.len(),
        estimated = result.is_estimated,
        "detector.scored"
    );
}
