//! Credence: content credibility scoring CLI

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use credence::analyzer::ScoreComposer;
use credence::config::{build_ignore_set, is_ignored, load_config, Config, CONFIG_FILENAME};
use credence::document::parse_date;
use credence::ports::claude::is_ai_available;
use credence::ports::{AnalysisPort, ClaudeAnalysisPort};
use credence::telemetry::init_tracing;
use credence::{
    CorpusEntry, CorpusInsights, Document, Enrichments, OverallScore, Rating, ScoringEngine,
};
use globset::GlobSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use walkdir::WalkDir;

/// Credence: content credibility scoring (experience, expertise, authority, trust)
#[derive(Parser, Debug)]
#[command(name = "credence")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Minimum overall score (exit 1 if below)
    #[arg(long, short, global = true)]
    threshold: Option<f64>,

    /// Path to config file (default: search .credencerc.json in current dir and parents)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Race first-person detection through Claude (needs ANTHROPIC_API_KEY and the `ai` feature)
    #[arg(long, global = true)]
    ai: bool,

    /// AI call timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    ai_timeout_ms: Option<u64>,

    /// Reference date for age calculations (default: now)
    #[arg(long, global = true, value_name = "DATE")]
    as_of: Option<String>,

    /// JSON file with pre-fetched domain metrics and reputation signals
    #[arg(long, global = true, value_name = "FILE")]
    enrichments: Option<PathBuf>,

    /// Compact JSON output
    #[arg(long, global = true)]
    compact: bool,

    /// Quiet mode (no status lines on stderr)
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Verbose output (recommendations and debug logs)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a single document (JSON feature set)
    Score {
        /// Document JSON file
        file: PathBuf,
    },

    /// Score a corpus: a directory of document files or a JSON array of entries
    Corpus {
        /// Directory or JSON file
        path: PathBuf,

        /// JSON file with pre-computed corpus insights
        #[arg(long, value_name = "FILE")]
        insights: Option<PathBuf>,
    },

    /// Create .credencerc.json with sensible defaults
    Init {
        /// Minimum score threshold (e.g. 70)
        #[arg(long)]
        threshold: Option<f64>,

        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

async fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(if args.verbose { "credence=debug" } else { "warn" });

    let (config, score) = match &args.command {
        Commands::Init { threshold, dir } => return run_init(*threshold, dir.as_deref()),
        Commands::Score { file } => {
            let (config, engine, enrichments) = prepare(&args, file)?;
            let document: Document = read_json(file)?;
            let score = engine.score_document(&document, &enrichments).await;
            (config, score)
        }
        Commands::Corpus { path, insights } => {
            let (config, engine, enrichments) = prepare(&args, path)?;
            let entries = collect_corpus(path, &config)?;
            let insights = match insights {
                Some(p) => Some(read_json::<CorpusInsights>(p)?),
                None => None,
            };
            if !args.quiet {
                eprintln!("{}: scoring {} documents", "Info".blue(), entries.len());
            }
            let score = engine
                .score_corpus(&entries, insights.as_ref(), &enrichments)
                .await;
            (config, score)
        }
    };

    let json = if args.compact {
        serde_json::to_string(&score)
    } else {
        serde_json::to_string_pretty(&score)
    }
    .context("Failed to serialize score")?;
    println!("{}", json);

    if !args.quiet {
        report(&score, args.verbose);
    }

    if let Some(threshold) = config.threshold {
        if score.overall < threshold {
            if !args.quiet {
                eprintln!(
                    "{}: score {:.2} is below threshold {}",
                    "Failed".red().bold(),
                    score.overall,
                    threshold
                );
            }
            return Ok(ExitCode::from(1));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Load config for the target, then build the engine and enrichments
fn prepare(args: &Args, target: &Path) -> Result<(Config, ScoringEngine, Enrichments)> {
    let work_dir = if target.is_file() {
        target.parent().unwrap_or(Path::new("."))
    } else {
        target
    };
    let config = load_config(work_dir, args.config.as_deref())?
        .merge_with_cli(args.threshold, args.ai_timeout_ms);
    let engine = build_engine(args, &config)?;
    let enrichments = match &args.enrichments {
        Some(path) => read_json::<Enrichments>(path)?,
        None => Enrichments::none(),
    };
    Ok((config, engine, enrichments))
}

fn build_engine(args: &Args, config: &Config) -> Result<ScoringEngine> {
    let mut engine = ScoringEngine::new().with_config(config);
    if let Some(raw) = &args.as_of {
        let as_of: DateTime<Utc> =
            parse_date(raw).with_context(|| format!("Invalid --as-of date: {}", raw))?;
        engine = engine.with_reference_time(as_of);
    }
    if args.ai {
        if !is_ai_available() && !args.quiet {
            eprintln!(
                "{}: built without the `ai` feature; AI calls will fall back to deterministic detection",
                "Warning".yellow()
            );
        }
        match ClaudeAnalysisPort::from_env() {
            Ok(port) => {
                let port = match &config.model {
                    Some(model) => port.model(model),
                    None => port,
                };
                let port: Arc<dyn AnalysisPort> = Arc::new(port);
                engine = engine.with_analysis_port(port);
            }
            Err(e) => {
                if !args.quiet {
                    eprintln!(
                        "{}: {}; using deterministic detection",
                        "Warning".yellow(),
                        e
                    );
                }
            }
        }
    }
    Ok(engine)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Read corpus entries. Unreadable items stay in the corpus as missing
/// documents so they count against every share.
fn collect_corpus(path: &Path, config: &Config) -> Result<Vec<CorpusEntry>> {
    if path.is_file() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let items: Vec<serde_json::Value> = serde_json::from_str(&content).with_context(|| {
            format!("Expected a JSON array of corpus entries in {}", path.display())
        })?;
        return Ok(items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<CorpusEntry>(item).unwrap_or_else(|e| {
                    tracing::warn!(index, error = %e, "unreadable corpus entry");
                    CorpusEntry::missing()
                })
            })
            .collect());
    }

    if !path.is_dir() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_ignore_set(&config.ignore)?)
    };
    let files = collect_document_files(path, ignore_set.as_ref(), &config.get_document_patterns());
    Ok(files
        .iter()
        .map(|file| match read_json::<Document>(file) {
            Ok(document) => CorpusEntry::new(document),
            Err(e) => {
                tracing::warn!(
                    file = %file.display(),
                    error = %format!("{:#}", e),
                    "unreadable document"
                );
                CorpusEntry::missing()
            }
        })
        .collect())
}

fn collect_document_files(
    dir: &Path,
    ignore_set: Option<&GlobSet>,
    patterns: &[&str],
) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_document_file(p, patterns))
        .filter(|p| p.file_name().map_or(true, |n| n != CONFIG_FILENAME))
        .filter(|p| ignore_set.map_or(true, |set| !is_ignored(p, set)))
        .collect();

    // Sort for consistent output
    files.sort();
    files
}

fn is_document_file(path: &Path, patterns: &[&str]) -> bool {
    let name = path.to_string_lossy();
    patterns.iter().any(|p| name.ends_with(p))
}

fn report(score: &OverallScore, verbose: bool) {
    let status = score.status.to_string();
    let status = match score.status {
        Rating::Excellent => status.green().bold(),
        Rating::Good => status.green(),
        Rating::Fair => status.yellow(),
        Rating::Poor => status.red(),
    };
    eprintln!(
        "{} {:.2}/100 ({})",
        "Credibility".bold(),
        score.overall,
        status
    );
    for category in score.categories.iter() {
        eprintln!(
            "  {:<18} {:>5.2}/{}",
            category.category.to_string(),
            category.total_score,
            category.max_score
        );
    }
    eprintln!("  {}", score.benchmark_comparison.summary.dimmed());
    if let Some(note) = &score.degradation_note {
        eprintln!("{}: {}", "Note".yellow(), note);
    }
    if verbose {
        eprintln!("{}", "Recommendations".bold());
        for rec in ScoreComposer::recommendations(score) {
            eprintln!("  - {}", rec);
        }
    }
}

fn run_init(threshold: Option<f64>, dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let json = format!(
        r#"{{
  "threshold": {},
  "aiTimeoutMs": 8000,
  "corpusConcurrency": 4,
  "freshnessWindowDays": 365,
  "variables": {{
    "first-person-experience": {{ "ai": true }}
  }},
  "ignore": [
    "**/drafts/**"
  ]
}}
"#,
        threshold.unwrap_or(60.0)
    );

    fs::write(&config_path, json)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    eprintln!("{}: created {}", "Info".blue(), config_path.display());
    Ok(ExitCode::SUCCESS)
}
