//! Trend inference over dated per-document scores
//!
//! Dated scores are sorted chronologically and split at the midpoint. The
//! direction comes from the percent change between the older and newer
//! halves' means; changes within the stable band are reported as stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fewer dated documents than this produce a stable trend with zero confidence
pub const MIN_TREND_SAMPLES: usize = 3;
/// Percent change inside which scores count as stable
pub const STABLE_BAND_PERCENT: f64 = 10.0;
/// Dated documents needed for full confidence
pub const FULL_CONFIDENCE_SAMPLES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "increasing"),
            TrendDirection::Decreasing => write!(f, "decreasing"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub direction: TrendDirection,
    /// `None` when there is no trend or the older half averaged zero
    pub percent_change: Option<f64>,
    /// min(dated documents / 10, 1)
    pub confidence: f64,
    pub description: String,
}

/// Infer a trend from `(date, score)` pairs in any order
pub fn infer_trend(points: &[(DateTime<Utc>, f64)]) -> Trend {
    let n = points.len();
    if n < MIN_TREND_SAMPLES {
        return Trend {
            direction: TrendDirection::Stable,
            percent_change: None,
            confidence: 0.0,
            description: format!(
                "Not enough dated documents for a trend ({} of {} needed)",
                n, MIN_TREND_SAMPLES
            ),
        };
    }

    let confidence = (n as f64 / FULL_CONFIDENCE_SAMPLES as f64).min(1.0);
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let (older, newer) = sorted.split_at(n / 2);
    let older_mean = mean(older);
    let newer_mean = mean(newer);

    if older_mean == 0.0 {
        let direction = if newer_mean > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Stable
        };
        return Trend {
            direction,
            percent_change: None,
            confidence,
            description: format!(
                "Scores are {} from a zero baseline \
                 (older half avg 0.00, newer half avg {:.2}, {} dated documents)",
                direction, newer_mean, n
            ),
        };
    }

    let change = (newer_mean - older_mean) / older_mean * 100.0;
    let direction = if change.abs() < STABLE_BAND_PERCENT {
        TrendDirection::Stable
    } else if change > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };
    Trend {
        direction,
        percent_change: Some(change),
        confidence,
        description: format!(
            "Scores are {} ({:+.0}%: older half avg {:.2}, newer half avg {:.2}, \
             {} dated documents)",
            direction, change, older_mean, newer_mean, n
        ),
    }
}

fn mean(points: &[(DateTime<Utc>, f64)]) -> f64 {
    if points.is_empty() {
        0.0
    } else {
        points.iter().map(|(_, s)| s).sum::<f64>() / points.len() as f64
    }
}
