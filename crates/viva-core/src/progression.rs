//! Adaptive difficulty progression and session termination policy.
//!
//! Both policies smooth over the trailing window of recent evaluations so a
//! single outlier answer never changes the session's course.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::{Difficulty, Evaluation};

/// Mean final score over the last `window` evaluations, `None` when fewer
/// than `min_observations` are available.
fn trailing_average(
    evaluations: &[Evaluation],
    window: usize,
    min_observations: usize,
) -> Option<f64> {
    let start = evaluations.len().saturating_sub(window);
    let recent = &evaluations[start..];
    if recent.len() < min_observations {
        return None;
    }
    Some(recent.iter().map(|e| e.score).sum::<f64>() / recent.len() as f64)
}

/// Thresholds driving tier transitions, on the 0-10 score scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DifficultyPolicy {
    /// Advance basic -> intermediate at this trailing average.
    pub basic_to_intermediate: f64,
    /// Advance intermediate -> advanced at this trailing average.
    pub intermediate_to_advanced: f64,
    /// Regress intermediate -> basic below this trailing average.
    pub regression: f64,
    /// How many recent evaluations the trailing window covers.
    pub window: usize,
    /// Transitions require at least this many evaluations in the window.
    pub min_observations: usize,
    /// Master switch; when false the tier never changes.
    pub adaptive: bool,
}

impl Default for DifficultyPolicy {
    fn default() -> Self {
        Self {
            basic_to_intermediate: 7.0,
            intermediate_to_advanced: 8.0,
            regression: 5.0,
            window: 3,
            min_observations: 2,
            adaptive: true,
        }
    }
}

impl DifficultyPolicy {
    /// Decide the tier after a new evaluation. Returns the current tier
    /// unchanged when no threshold is met.
    ///
    /// There is no regression rule from advanced: a candidate who reaches the
    /// top tier stays there even if scores collapse.
    pub fn next_tier(&self, current: Difficulty, evaluations: &[Evaluation]) -> Difficulty {
        if !self.adaptive {
            return current;
        }
        let Some(avg) = trailing_average(evaluations, self.window, self.min_observations) else {
            return current;
        };

        let next = match current {
            Difficulty::Basic if avg >= self.basic_to_intermediate => Difficulty::Intermediate,
            Difficulty::Intermediate if avg >= self.intermediate_to_advanced => {
                Difficulty::Advanced
            }
            Difficulty::Intermediate if avg < self.regression => Difficulty::Basic,
            _ => current,
        };

        if next != current {
            info!(from = %current, to = %next, trailing_avg = avg, "difficulty transition");
        }
        next
    }
}

/// Decides, after each answer, whether the session should end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TerminationPolicy {
    /// Never end before this many questions have been asked.
    pub min_questions: usize,
    /// Always end once this many questions have been asked.
    pub max_questions: usize,
    /// End early when the trailing average falls below this score.
    pub struggling_threshold: f64,
    /// Trailing window for the struggling cutoff.
    pub window: usize,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self {
            min_questions: 5,
            max_questions: 7,
            struggling_threshold: 3.0,
            window: 3,
        }
    }
}

impl TerminationPolicy {
    pub fn should_end(&self, questions_asked: usize, evaluations: &[Evaluation]) -> bool {
        if questions_asked < self.min_questions {
            return false;
        }
        if questions_asked >= self.max_questions {
            return true;
        }
        // Enough signal to call a struggling session early.
        if let Some(avg) = trailing_average(evaluations, self.window, 1) {
            if avg < self.struggling_threshold {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EvaluationSource;

    fn eval(score: f64) -> Evaluation {
        Evaluation {
            question_id: "q".into(),
            answer: "a".into(),
            score,
            max_score: 10,
            accuracy_score: 0.5,
            explanation_score: 0.5,
            efficiency_score: 0.5,
            feedback: String::new(),
            strengths: vec![],
            improvement_areas: vec![],
            source: EvaluationSource::Judged,
        }
    }

    #[test]
    fn single_evaluation_never_transitions() {
        let policy = DifficultyPolicy::default();
        let evals = vec![eval(10.0)];
        assert_eq!(
            policy.next_tier(Difficulty::Basic, &evals),
            Difficulty::Basic
        );
    }

    #[test]
    fn basic_advances_at_seven() {
        let policy = DifficultyPolicy::default();
        let evals = vec![eval(9.0), eval(9.0)];
        assert_eq!(
            policy.next_tier(Difficulty::Basic, &evals),
            Difficulty::Intermediate
        );
        let low = vec![eval(6.0), eval(6.5)];
        assert_eq!(policy.next_tier(Difficulty::Basic, &low), Difficulty::Basic);
    }

    #[test]
    fn intermediate_advances_and_regresses() {
        let policy = DifficultyPolicy::default();
        let high = vec![eval(8.0), eval(8.5), eval(9.0)];
        assert_eq!(
            policy.next_tier(Difficulty::Intermediate, &high),
            Difficulty::Advanced
        );
        let low = vec![eval(4.0), eval(4.5), eval(3.0)];
        assert_eq!(
            policy.next_tier(Difficulty::Intermediate, &low),
            Difficulty::Basic
        );
        let mid = vec![eval(6.0), eval(6.5), eval(7.0)];
        assert_eq!(
            policy.next_tier(Difficulty::Intermediate, &mid),
            Difficulty::Intermediate
        );
    }

    #[test]
    fn window_uses_only_last_three() {
        let policy = DifficultyPolicy::default();
        // Early low scores fall out of the window.
        let evals = vec![eval(1.0), eval(1.0), eval(9.0), eval(9.0), eval(9.0)];
        assert_eq!(
            policy.next_tier(Difficulty::Basic, &evals),
            Difficulty::Intermediate
        );
    }

    #[test]
    fn advanced_never_moves() {
        let policy = DifficultyPolicy::default();
        let collapse = vec![eval(0.0), eval(1.0), eval(0.5)];
        assert_eq!(
            policy.next_tier(Difficulty::Advanced, &collapse),
            Difficulty::Advanced
        );
    }

    #[test]
    fn adaptive_off_freezes_tier() {
        let policy = DifficultyPolicy {
            adaptive: false,
            ..Default::default()
        };
        let evals = vec![eval(10.0), eval(10.0), eval(10.0)];
        assert_eq!(
            policy.next_tier(Difficulty::Basic, &evals),
            Difficulty::Basic
        );
    }

    #[test]
    fn never_ends_before_minimum() {
        let policy = TerminationPolicy::default();
        let evals: Vec<Evaluation> = (0..4).map(|_| eval(0.0)).collect();
        assert!(!policy.should_end(4, &evals));
    }

    #[test]
    fn always_ends_at_maximum() {
        let policy = TerminationPolicy::default();
        let evals: Vec<Evaluation> = (0..7).map(|_| eval(10.0)).collect();
        assert!(policy.should_end(7, &evals));
    }

    #[test]
    fn struggling_cutoff_scenario() {
        // Last three of five score 1.0, 2.0, 2.0: mean 1.67 < 3.0.
        let policy = TerminationPolicy::default();
        let evals = vec![eval(5.0), eval(5.0), eval(1.0), eval(2.0), eval(2.0)];
        assert!(policy.should_end(5, &evals));
    }

    #[test]
    fn healthy_session_continues_past_minimum() {
        let policy = TerminationPolicy::default();
        let evals: Vec<Evaluation> = (0..5).map(|_| eval(8.0)).collect();
        assert!(!policy.should_end(5, &evals));
    }
}
