//! Score composition: overall score, status, benchmark and recommendations

use crate::error::{check_overall, enforce};
use crate::{
    round2, BenchmarkComparison, BenchmarkPosition, BenchmarkRange, Category, CategoryScores,
    OverallScore, Rating, ScoringMode, VariableStatus,
};

/// Typical range for published content
pub const INDUSTRY_AVERAGE: BenchmarkRange = BenchmarkRange {
    min: 55.0,
    max: 70.0,
};
/// Scores at or above this are in the top tier
pub const TOP_PERFORMER_MIN: f64 = 85.0;

const MAX_RECOMMENDATIONS: usize = 5;

/// Composes category scores into the final result
pub struct ScoreComposer;

impl ScoreComposer {
    /// Compose the overall score. The category totals are summed and rounded
    /// to two decimals exactly once, here.
    pub fn compose(
        categories: CategoryScores,
        mode: ScoringMode,
        posts_analyzed: Option<usize>,
    ) -> OverallScore {
        let sum: f64 = categories.iter().map(|c| c.total_score).sum();
        let overall = round2(sum);
        let degradation_note = match mode {
            ScoringMode::SingleDocument => Self::degradation_note(&categories),
            ScoringMode::Corpus => None,
        };
        let score = OverallScore {
            overall,
            status: Rating::from_overall(overall),
            mode,
            benchmark_comparison: Self::benchmark(overall),
            degradation_note,
            posts_analyzed,
            categories,
        };
        enforce(check_overall(&score));
        score
    }

    fn degradation_note(categories: &CategoryScores) -> Option<String> {
        let missed: f64 = categories.iter().filter_map(|c| c.missed_points).sum();
        if missed <= 0.0 {
            return None;
        }
        let ceiling = Category::ALL.iter().map(|c| c.max_score()).sum::<f64>() - missed;
        Some(format!(
            "Single-document analysis: {} points from corpus-only variables cannot be measured, \
             so the effective ceiling is {}/100. Score a set of related documents for a complete assessment.",
            missed, ceiling
        ))
    }

    pub fn benchmark(overall: f64) -> BenchmarkComparison {
        let position = if overall >= TOP_PERFORMER_MIN {
            BenchmarkPosition::TopPerformer
        } else if overall > INDUSTRY_AVERAGE.max {
            BenchmarkPosition::AboveAverage
        } else if overall >= INDUSTRY_AVERAGE.min {
            BenchmarkPosition::Average
        } else {
            BenchmarkPosition::BelowAverage
        };
        let summary = match position {
            BenchmarkPosition::TopPerformer => format!(
                "{:.2} is in the top-performer range ({:.0}+)",
                overall, TOP_PERFORMER_MIN
            ),
            BenchmarkPosition::AboveAverage => format!(
                "{:.2} is above the industry average ({:.0}-{:.0})",
                overall, INDUSTRY_AVERAGE.min, INDUSTRY_AVERAGE.max
            ),
            BenchmarkPosition::Average => format!(
                "{:.2} is within the industry average ({:.0}-{:.0})",
                overall, INDUSTRY_AVERAGE.min, INDUSTRY_AVERAGE.max
            ),
            BenchmarkPosition::BelowAverage => format!(
                "{:.2} is below the industry average ({:.0}-{:.0})",
                overall, INDUSTRY_AVERAGE.min, INDUSTRY_AVERAGE.max
            ),
        };
        BenchmarkComparison {
            industry_average: INDUSTRY_AVERAGE,
            top_performer_min: TOP_PERFORMER_MIN,
            position,
            summary,
        }
    }

    /// Get a description of the rating
    pub fn status_description(status: Rating) -> &'static str {
        match status {
            Rating::Excellent => "Excellent - strong, well-evidenced credibility signals",
            Rating::Good => "Good - credible, with room for improvement",
            Rating::Fair => "Fair - basic signals present but several are weak",
            Rating::Poor => "Poor - few credibility signals were found",
        }
    }

    /// Recommendations for the weakest variables, lowest share of ceiling first
    pub fn recommendations(score: &OverallScore) -> Vec<String> {
        let mut weak: Vec<_> = score
            .categories
            .iter()
            .flat_map(|c| c.variables.iter())
            .filter(|v| matches!(v.status, VariableStatus::NeedsImprovement | VariableStatus::Poor))
            .filter_map(|v| {
                v.recommendation
                    .as_ref()
                    .map(|r| (v.actual_score / v.max_score, v.name.as_str(), r.as_str()))
            })
            .collect();
        weak.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut recs: Vec<String> = weak
            .into_iter()
            .take(MAX_RECOMMENDATIONS)
            .map(|(_, name, rec)| format!("{}: {}", name, rec))
            .collect();

        if score.mode == ScoringMode::SingleDocument {
            recs.push(
                "Score a set of related documents to measure consistency, focus, cadence and freshness rate"
                    .to_string(),
            );
        }
        if recs.is_empty() {
            recs.push("Credibility signals are in good shape. Keep content updated.".to_string());
        }
        recs
    }
}
