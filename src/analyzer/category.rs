//! Category aggregation
//!
//! Groups variable results by category and recomputes totals from the
//! variable scores every time; totals are never patched after the fact. In
//! single-document mode the corpus-only variables are left out and reported
//! through `unavailableVariables` and `missedPoints`.

use crate::analyzer::thresholds;
use crate::error::{check_category, enforce};
use crate::{
    Category, CategoryScore, CategoryScores, Rating, ScoringMode, VariableId, VariableResult,
};
use std::collections::BTreeMap;

pub struct CategoryAggregator {
    mode: ScoringMode,
}

impl CategoryAggregator {
    pub fn new(mode: ScoringMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    /// Aggregate one category, taking its variables out of `results`.
    /// A variable with no result is reported as not evaluated.
    pub fn aggregate(
        &self,
        category: Category,
        results: &mut BTreeMap<VariableId, VariableResult>,
    ) -> CategoryScore {
        let mut variables = Vec::new();
        let mut unavailable = Vec::new();
        for id in category.variables() {
            let result = results.remove(id);
            if self.mode == ScoringMode::SingleDocument && id.is_corpus_only() {
                unavailable.push(*id);
                continue;
            }
            variables.push(result.unwrap_or_else(|| {
                VariableResult::insufficient_data(*id, "variable was not evaluated")
            }));
        }
        let unavailable = match self.mode {
            ScoringMode::SingleDocument => Some(unavailable),
            ScoringMode::Corpus => None,
        };
        let score = build_category(category, variables, unavailable);
        enforce(check_category(&score));
        score
    }

    /// Aggregate all four categories from one flat list of results
    pub fn aggregate_all(&self, results: Vec<VariableResult>) -> CategoryScores {
        let mut by_id: BTreeMap<VariableId, VariableResult> =
            results.into_iter().map(|r| (r.id, r)).collect();
        CategoryScores {
            experience: self.aggregate(Category::Experience, &mut by_id),
            expertise: self.aggregate(Category::Expertise, &mut by_id),
            authoritativeness: self.aggregate(Category::Authoritativeness, &mut by_id),
            trustworthiness: self.aggregate(Category::Trustworthiness, &mut by_id),
        }
    }
}

/// Build a category score from its variables. `unavailable` is `Some` only
/// in single-document mode; missed points are derived from it.
pub fn build_category(
    category: Category,
    variables: Vec<VariableResult>,
    unavailable: Option<Vec<VariableId>>,
) -> CategoryScore {
    let total_score: f64 = variables.iter().map(|v| v.actual_score).sum();
    let max_score = category.max_score();
    let percentage = if max_score > 0.0 {
        total_score / max_score * 100.0
    } else {
        0.0
    };
    let missed_points = unavailable.as_ref().map(|ids| {
        ids.iter()
            .map(|id| thresholds::lookup(*id).max_score)
            .sum::<f64>()
    });
    CategoryScore {
        category,
        variables,
        total_score,
        max_score,
        percentage,
        status: Rating::from_percentage(percentage),
        unavailable_variables: unavailable,
        missed_points,
    }
}
