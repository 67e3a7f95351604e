//! CLI behavior tests: exit codes, JSON output, corpus input, init.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const EXPERT_REVIEW: &str = "test-data/expert-review.json";
const THIN_PAGE: &str = "test-data/thin-page.json";
const CORPUS_DIR: &str = "test-data/corpus";
const CORPUS_ARRAY: &str = "test-data/corpus.json";
const AS_OF: &str = "2025-06-01";

fn credence_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_credence"));
    cmd.env_remove("ANTHROPIC_API_KEY").env_remove("RUST_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    let s = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(s.trim()).expect("valid JSON on stdout")
}

#[test]
fn no_args_returns_usage_error_not_panic() {
    credence_cmd()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn score_prints_single_document_json() {
    let json = stdout_json(credence_cmd().args(["score", EXPERT_REVIEW, "--as-of", AS_OF]));
    assert_eq!(json["mode"], "single-document");
    assert!(json["degradationNote"].as_str().unwrap().contains("22 points"));
    assert!(json["postsAnalyzed"].is_null());
    let overall = json["overall"].as_f64().unwrap();
    assert!(overall > 0.0 && overall <= 78.0, "overall {}", overall);
}

#[test]
fn stderr_carries_status_lines() {
    credence_cmd()
        .args(["score", EXPERT_REVIEW, "--as-of", AS_OF])
        .assert()
        .success()
        .stderr(predicate::str::contains("Credibility"))
        .stderr(predicate::str::contains("Trustworthiness"));
}

#[test]
fn quiet_mode_keeps_stderr_empty() {
    credence_cmd()
        .args(["score", EXPERT_REVIEW, "--as-of", AS_OF, "--quiet"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn below_threshold_exit_1() {
    credence_cmd()
        .args(["score", THIN_PAGE, "--threshold", "60", "--as-of", AS_OF])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("below threshold"));
}

#[test]
fn above_threshold_exit_0() {
    credence_cmd()
        .args(["score", EXPERT_REVIEW, "--threshold", "20", "--as-of", AS_OF])
        .assert()
        .success();
}

#[test]
fn missing_file_exit_2() {
    credence_cmd()
        .args(["score", "test-data/does-not-exist.json"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn invalid_as_of_exit_2() {
    credence_cmd()
        .args(["score", EXPERT_REVIEW, "--as-of", "yesterday"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid --as-of"));
}

#[test]
fn ai_flag_without_key_falls_back() {
    let json = stdout_json(credence_cmd().args(["score", EXPERT_REVIEW, "--as-of", AS_OF, "--ai"]));
    let plain = stdout_json(credence_cmd().args(["score", EXPERT_REVIEW, "--as-of", AS_OF]));
    assert_eq!(json, plain);
}

#[test]
fn enrichments_raise_domain_authority() {
    let plain = stdout_json(credence_cmd().args(["score", EXPERT_REVIEW, "--as-of", AS_OF]));
    let enriched = stdout_json(credence_cmd().args([
        "score",
        EXPERT_REVIEW,
        "--as-of",
        AS_OF,
        "--enrichments",
        "test-data/enrichments.json",
    ]));
    let authority = |v: &serde_json::Value| {
        v["categories"]["authoritativeness"]["totalScore"]
            .as_f64()
            .unwrap()
    };
    assert!(authority(&enriched) > authority(&plain));
}

#[test]
fn corpus_directory_counts_broken_files() {
    let json =
        stdout_json(credence_cmd().args(["corpus", CORPUS_DIR, "--as-of", AS_OF, "--quiet"]));
    assert_eq!(json["mode"], "corpus");
    // four posts, one unreadable file and one draft
    assert_eq!(json["postsAnalyzed"], 6);
    assert!(json.get("degradationNote").is_none());
}

#[test]
fn corpus_ignore_patterns_from_config() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("custom.json");
    fs::write(&config, r#"{ "ignore": ["**/drafts/**", "**/*broken*"] }"#).unwrap();
    let json = stdout_json(credence_cmd().args([
        "corpus",
        CORPUS_DIR,
        "--as-of",
        AS_OF,
        "--config",
        config.to_str().unwrap(),
    ]));
    assert_eq!(json["postsAnalyzed"], 4);
}

#[test]
fn corpus_array_with_insights() {
    let json = stdout_json(credence_cmd().args([
        "corpus",
        CORPUS_ARRAY,
        "--as-of",
        AS_OF,
        "--insights",
        "test-data/insights.json",
    ]));
    assert_eq!(json["postsAnalyzed"], 4);
    let focus = json["categories"]["expertise"]["variables"]
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["id"] == "topical-focus")
        .cloned()
        .unwrap();
    assert_eq!(focus["actualScore"].as_f64().unwrap(), 3.0);
}

#[test]
fn init_creates_config() {
    let dir = tempfile::TempDir::new().unwrap();
    credence_cmd()
        .args(["init", "--threshold", "65", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("created"));
    let content = fs::read_to_string(dir.path().join(".credencerc.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["threshold"], 65.0);
    assert_eq!(json["aiTimeoutMs"], 8000);
}

#[test]
fn init_does_not_overwrite() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(dir.path().join(".credencerc.json"), "{}").unwrap();
    credence_cmd()
        .args(["init", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(dir.path().join(".credencerc.json")).unwrap(), "{}");
}
