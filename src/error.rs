//! Contract-violation errors
//!
//! Environmental problems (missing data, unreachable ports) are never errors
//! here; they become evidence notes. Only broken invariants are reported.

use crate::{round2, Category, CategoryScore, OverallScore, VariableId, VariableResult};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("{variable} scored {score} outside [0, {max}]")]
    ScoreOutOfBounds {
        variable: VariableId,
        score: f64,
        max: f64,
    },
    #[error("{category} total {total} does not equal the sum of its variables ({sum})")]
    TotalMismatch {
        category: Category,
        total: f64,
        sum: f64,
    },
    #[error("{variable} reported under {found} but belongs to {expected}")]
    MisplacedVariable {
        variable: VariableId,
        found: Category,
        expected: Category,
    },
    #[error("overall {overall} does not equal the rounded category sum ({expected})")]
    OverallMismatch { overall: f64, expected: f64 },
}

pub type ScoringResult<T> = Result<T, ScoringError>;

pub fn check_variable(result: &VariableResult) -> ScoringResult<()> {
    if result.is_within_bounds() {
        Ok(())
    } else {
        Err(ScoringError::ScoreOutOfBounds {
            variable: result.id,
            score: result.actual_score,
            max: result.max_score,
        })
    }
}

pub fn check_category(score: &CategoryScore) -> ScoringResult<()> {
    for v in &score.variables {
        check_variable(v)?;
        if v.id.category() != score.category {
            return Err(ScoringError::MisplacedVariable {
                variable: v.id,
                found: score.category,
                expected: v.id.category(),
            });
        }
    }
    let sum = score.variable_sum();
    if score.total_score != sum {
        return Err(ScoringError::TotalMismatch {
            category: score.category,
            total: score.total_score,
            sum,
        });
    }
    Ok(())
}

pub fn check_overall(score: &OverallScore) -> ScoringResult<()> {
    let mut sum = 0.0;
    for category in score.categories.iter() {
        check_category(category)?;
        sum += category.total_score;
    }
    let expected = round2(sum);
    if score.overall != expected {
        return Err(ScoringError::OverallMismatch {
            overall: score.overall,
            expected,
        });
    }
    Ok(())
}

/// Fail loudly on a violated invariant: panic in debug and test builds,
/// log at error level in release builds.
pub fn enforce(check: ScoringResult<()>) {
    if let Err(e) = check {
        if cfg!(debug_assertions) {
            panic!("scoring contract violation: {}", e);
        }
        tracing::error!(error = %e, "scoring contract violation");
    }
}
