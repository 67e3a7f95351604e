//! Analyzer module - detectors, aggregation and score composition

pub mod category;
pub mod detectors;
pub mod engine;
pub mod hybrid;
pub mod scoring;
pub mod thresholds;

pub use category::CategoryAggregator;
pub use engine::{EngineOptions, ScoringEngine};
pub use hybrid::{HybridBranch, HybridCoordinator, HybridOutcome};
pub use scoring::ScoreComposer;
