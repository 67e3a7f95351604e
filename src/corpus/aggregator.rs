//! Corpus projection of one variable: mean, spread, distribution, outliers, trend

use super::trend::{infer_trend, Trend};
use crate::analyzer::thresholds;
use crate::{round2, EvidenceItem, VariableId, VariableResult, VariableStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scores further than this many standard deviations from the mean are outliers
pub const OUTLIER_SIGMA: f64 = 2.0;

/// One document's contribution to a projection
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentScore {
    pub score: f64,
    pub date: Option<DateTime<Utc>>,
    /// Why the document could not be scored; it still counts, as 0
    pub failure: Option<String>,
}

impl DocumentScore {
    pub fn scored(score: f64, date: Option<DateTime<Utc>>) -> Self {
        Self {
            score,
            date,
            failure: None,
        }
    }

    pub fn failed(reason: impl Into<String>, date: Option<DateTime<Utc>>) -> Self {
        Self {
            score: 0.0,
            date,
            failure: Some(reason.into()),
        }
    }
}

/// Per-status document counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub excellent: usize,
    pub good: usize,
    pub needs_improvement: usize,
    pub poor: usize,
}

impl Distribution {
    fn add(&mut self, status: VariableStatus) {
        match status {
            VariableStatus::Excellent => self.excellent += 1,
            VariableStatus::Good => self.good += 1,
            VariableStatus::NeedsImprovement => self.needs_improvement += 1,
            VariableStatus::Poor => self.poor += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.excellent + self.good + self.needs_improvement + self.poor
    }
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "excellent {}, good {}, needs improvement {}, poor {}",
            self.excellent, self.good, self.needs_improvement, self.poor
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub id: VariableId,
    /// Every document handed in, unscorable ones included
    pub sample_size: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub distribution: Distribution,
    pub outliers: usize,
    pub failures: usize,
    pub trend: Trend,
}

/// Project per-document scores for `id` onto corpus statistics
pub fn project(id: VariableId, scores: &[DocumentScore]) -> Projection {
    let spec = thresholds::lookup(id);
    let n = scores.len();
    let values: Vec<f64> = scores
        .iter()
        .map(|s| crate::clamp_score(s.score, spec.max_score))
        .collect();
    let mean = if n == 0 {
        0.0
    } else {
        values.iter().sum::<f64>() / n as f64
    };
    let std_dev = if n == 0 {
        0.0
    } else {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64).sqrt()
    };

    let mut distribution = Distribution::default();
    for v in &values {
        distribution.add(spec.resolve(*v));
    }
    let outliers = if std_dev > 0.0 {
        values
            .iter()
            .filter(|v| (*v - mean).abs() > OUTLIER_SIGMA * std_dev)
            .count()
    } else {
        0
    };
    let dated: Vec<(DateTime<Utc>, f64)> = scores
        .iter()
        .zip(&values)
        .filter_map(|(s, v)| s.date.map(|d| (d, *v)))
        .collect();

    Projection {
        id,
        sample_size: n,
        mean,
        std_dev,
        distribution,
        outliers,
        failures: scores.iter().filter(|s| s.failure.is_some()).count(),
        trend: infer_trend(&dated),
    }
}

impl Projection {
    /// The corpus-mode variable result: the mean becomes the score
    pub fn into_result(self) -> VariableResult {
        if self.sample_size == 0 {
            return VariableResult::insufficient_data(self.id, "corpus is empty");
        }
        let mut evidence = vec![
            EvidenceItem::metric("Sample size", self.sample_size),
            EvidenceItem::metric("Mean score", format!("{:.2}", self.mean)),
            EvidenceItem::metric("Standard deviation", format!("{:.2}", self.std_dev)),
            EvidenceItem::metric("Distribution", self.distribution),
            EvidenceItem::metric("Outliers (>2σ)", self.outliers),
            EvidenceItem::note(self.trend.description.clone())
                .with_label("Trend")
                .with_confidence(self.trend.confidence),
        ];
        if self.failures > 0 {
            evidence.push(EvidenceItem::note(format!(
                "{} of {} documents could not be scored and count as 0",
                self.failures, self.sample_size
            )));
        }
        VariableResult::scored(self.id, round2(self.mean), evidence)
    }
}
