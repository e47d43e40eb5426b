//! Performance aggregation over a session's evaluations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::QuestionCatalog;
use crate::model::{Category, Difficulty, Evaluation};

/// Overall totals across every evaluation in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTotals {
    /// Sum of final scores, rounded for display.
    pub total_score: f64,
    /// Sum of the questions' maximum scores.
    pub max_possible_score: u32,
    /// `100 * total / max`, or 0 when no questions were scored.
    pub percentage_score: f64,
    pub average_accuracy: f64,
    pub average_explanation: f64,
    pub average_efficiency: f64,
}

impl PerformanceTotals {
    fn empty() -> Self {
        Self {
            total_score: 0.0,
            max_possible_score: 0,
            percentage_score: 0.0,
            average_accuracy: 0.0,
            average_explanation: 0.0,
            average_efficiency: 0.0,
        }
    }
}

/// Compute overall totals from a session's evaluations.
pub fn totals(evaluations: &[Evaluation]) -> PerformanceTotals {
    if evaluations.is_empty() {
        return PerformanceTotals::empty();
    }

    let total: f64 = evaluations.iter().map(|e| e.score).sum();
    let max_possible: u32 = evaluations.iter().map(|e| e.max_score).sum();
    let percentage = if max_possible > 0 {
        total / f64::from(max_possible) * 100.0
    } else {
        0.0
    };
    let n = evaluations.len() as f64;

    PerformanceTotals {
        total_score: round2(total),
        max_possible_score: max_possible,
        percentage_score: round1(percentage),
        average_accuracy: round3(evaluations.iter().map(|e| e.accuracy_score).sum::<f64>() / n),
        average_explanation: round3(
            evaluations.iter().map(|e| e.explanation_score).sum::<f64>() / n,
        ),
        average_efficiency: round3(
            evaluations.iter().map(|e| e.efficiency_score).sum::<f64>() / n,
        ),
    }
}

/// Mean final score per question category. Categories with no observations
/// are omitted.
pub fn by_category(
    asked: &[String],
    evaluations: &[Evaluation],
    catalog: &QuestionCatalog,
) -> BTreeMap<Category, f64> {
    group_means(asked, evaluations, catalog, |q| q.category)
}

/// Mean final score per difficulty tier. Tiers with no observations are
/// omitted.
pub fn by_difficulty(
    asked: &[String],
    evaluations: &[Evaluation],
    catalog: &QuestionCatalog,
) -> BTreeMap<Difficulty, f64> {
    group_means(asked, evaluations, catalog, |q| q.difficulty)
}

fn group_means<K: Ord + Copy>(
    asked: &[String],
    evaluations: &[Evaluation],
    catalog: &QuestionCatalog,
    key: impl Fn(&crate::model::Question) -> K,
) -> BTreeMap<K, f64> {
    let mut grouped: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for (question_id, evaluation) in asked.iter().zip(evaluations.iter()) {
        if let Some(question) = catalog.by_id(question_id) {
            grouped.entry(key(question)).or_default().push(evaluation.score);
        }
    }
    grouped
        .into_iter()
        .map(|(k, scores)| {
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            (k, round1(mean))
        })
        .collect()
}

/// Classify overall percentage into a proficiency tier.
pub fn proficiency(percentage: f64) -> Difficulty {
    if percentage >= 80.0 {
        Difficulty::Advanced
    } else if percentage >= 60.0 {
        Difficulty::Intermediate
    } else {
        Difficulty::Basic
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
