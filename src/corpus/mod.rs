//! Corpus-level aggregation: projections of per-document scores, trend
//! inference, the summary consumed by corpus-only detectors and the bounded
//! pool used for asynchronous per-document work.

pub mod aggregator;
pub mod pool;
pub mod summary;
pub mod trend;

pub use aggregator::{project, DocumentScore, Distribution, Projection};
pub use pool::{run_bounded, PoolOptions, TaskFailure};
pub use summary::{CadenceStats, CorpusInsights, CorpusSummary};
pub use trend::{infer_trend, Trend, TrendDirection};
