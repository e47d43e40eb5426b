//! Answer evaluation: rule-based signals blended with the external judge.
//!
//! `Evaluator::evaluate` is total. A judge failure degrades to the fixed
//! neutral evaluation, and an internal scoring fault degrades to a distinct
//! pipeline fallback, so the session always advances.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::judge::{Judge, Judgment, JudgmentRequest};
use crate::model::{Answer, Category, Evaluation, EvaluationSource, Question};

/// Excel function names accepted as partial credit when no full formula is
/// present in a formula/function answer.
const KNOWN_FUNCTIONS: &str =
    "SUM|MAX|MIN|AVERAGE|VLOOKUP|INDEX|MATCH|COUNT|IF|CONCATENATE";

/// Weights for combining the component scores. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub accuracy: f64,
    pub explanation: f64,
    pub efficiency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            accuracy: 0.4,
            explanation: 0.3,
            efficiency: 0.3,
        }
    }
}

impl ScoreWeights {
    fn validate(&self) -> Result<(), EngineError> {
        let sum = self.accuracy + self.explanation + self.efficiency;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(EngineError::InvalidWeights(sum));
        }
        Ok(())
    }
}

/// Evaluates candidate answers against questions.
pub struct Evaluator {
    judge: Arc<dyn Judge>,
    weights: ScoreWeights,
    judge_timeout: Duration,
    formula_re: Regex,
    function_re: Regex,
}

impl Evaluator {
    pub fn new(
        judge: Arc<dyn Judge>,
        weights: ScoreWeights,
        judge_timeout: Duration,
    ) -> Result<Self, EngineError> {
        weights.validate()?;
        // Both patterns are fixed; compilation cannot fail at runtime.
        let formula_re = Regex::new(r"=[A-Z][A-Z0-9]*\([^)]+\)").expect("valid formula pattern");
        let function_re =
            Regex::new(&format!(r"\b({KNOWN_FUNCTIONS})\b")).expect("valid function pattern");
        Ok(Self {
            judge,
            weights,
            judge_timeout,
            formula_re,
            function_re,
        })
    }

    /// Score one answer. Never fails outward.
    pub async fn evaluate(&self, question: &Question, answer: &Answer) -> Evaluation {
        let keyword_score = self.keyword_signal(question, &answer.response);
        let formula_score = self.formula_signal(question, &answer.response);

        let request = JudgmentRequest {
            question: question.text.clone(),
            category: question.category,
            difficulty: question.difficulty,
            response: answer.response.clone(),
            expected_answers: question.expected_answers.clone(),
            keywords: question.keywords.clone(),
        };

        let judgment = match tokio::time::timeout(self.judge_timeout, self.judge.judge(&request))
            .await
        {
            Ok(Ok(judgment)) => judgment,
            Ok(Err(e)) => {
                warn!(question = %question.id, error = %e, "judge call failed, using neutral fallback");
                return neutral_fallback_evaluation(question, answer);
            }
            Err(_) => {
                warn!(
                    question = %question.id,
                    timeout_secs = self.judge_timeout.as_secs(),
                    "judge call timed out, using neutral fallback"
                );
                return neutral_fallback_evaluation(question, answer);
            }
        };

        match self.combine(question, answer, keyword_score, formula_score, &judgment) {
            Some(evaluation) => {
                debug!(
                    question = %question.id,
                    score = evaluation.score,
                    "evaluated answer"
                );
                evaluation
            }
            None => {
                warn!(question = %question.id, "scoring pipeline fault, using pipeline fallback");
                pipeline_fallback_evaluation(question, answer)
            }
        }
    }

    /// Fraction of the question's keywords present in the response, with
    /// tolerance for `=`-prefixed formula variants and a small bonus for
    /// elaborated answers.
    fn keyword_signal(&self, question: &Question, response: &str) -> f64 {
        if question.keywords.is_empty() {
            return 0.5;
        }

        let response_lower = response.to_lowercase();
        let mut matches = 0usize;

        for keyword in &question.keywords {
            let keyword_lower = keyword.to_lowercase();
            if response_lower.contains(&keyword_lower) {
                matches += 1;
            } else if let Some(stripped) = keyword_lower.strip_prefix('=') {
                if response_lower.contains(stripped) {
                    matches += 1;
                }
            } else if response_lower.contains(&format!("={keyword_lower}")) {
                matches += 1;
            }
        }

        let mut score = (matches as f64 / question.keywords.len() as f64).min(1.0);
        if score > 0.8 && response.split_whitespace().count() > 10 {
            score = (score * 1.1).min(1.0);
        }
        score
    }

    /// Formula equivalence signal; only meaningful for formula/function
    /// questions, `None` otherwise.
    fn formula_signal(&self, question: &Question, response: &str) -> Option<f64> {
        if !matches!(question.category, Category::Formula | Category::Function) {
            return None;
        }

        let formulas: Vec<&str> = self
            .formula_re
            .find_iter(response)
            .map(|m| m.as_str())
            .collect();

        if formulas.is_empty() {
            // Partial credit for naming a known function without full syntax.
            if self.function_re.is_match(&response.to_uppercase()) {
                return Some(0.7);
            }
            return Some(0.0);
        }

        for formula in &formulas {
            for expected in &question.expected_answers {
                if formulas_equivalent(formula, expected) {
                    return Some(1.0);
                }
            }
        }

        // Syntactically valid formulas that match nothing expected.
        Some(0.6)
    }

    fn combine(
        &self,
        question: &Question,
        answer: &Answer,
        keyword_score: f64,
        formula_score: Option<f64>,
        judgment: &Judgment,
    ) -> Option<Evaluation> {
        let keyword = clamp_unit(keyword_score);
        let accuracy = match formula_score {
            Some(formula) => {
                clamp_unit(formula) * 0.6 + clamp_unit(judgment.accuracy) * 0.3 + keyword * 0.1
            }
            None => clamp_unit(judgment.accuracy) * 0.7 + keyword * 0.3,
        };
        let explanation = clamp_unit(judgment.explanation);
        let efficiency = clamp_unit(judgment.efficiency);

        let max_score = f64::from(question.max_score);
        let raw = (accuracy * self.weights.accuracy
            + explanation * self.weights.explanation
            + efficiency * self.weights.efficiency)
            * max_score;
        let adjusted = apply_difficulty_adjustment(raw, question);
        let score = adjusted.clamp(0.0, max_score);

        if !score.is_finite() || !accuracy.is_finite() {
            return None;
        }

        Some(Evaluation {
            question_id: question.id.clone(),
            answer: answer.response.clone(),
            score: round2(score),
            max_score: question.max_score,
            accuracy_score: round3(accuracy),
            explanation_score: round3(explanation),
            efficiency_score: round3(efficiency),
            feedback: judgment.feedback.clone(),
            strengths: judgment.strengths.clone(),
            improvement_areas: judgment.improvement_areas.clone(),
            source: EvaluationSource::Judged,
        })
    }
}

/// Slight score adjustments by tier: a little generosity on basic questions,
/// a floor for non-zero attempts at advanced ones.
fn apply_difficulty_adjustment(score: f64, question: &Question) -> f64 {
    use crate::model::Difficulty;
    match question.difficulty {
        Difficulty::Basic => (score * 1.05).min(f64::from(question.max_score)),
        Difficulty::Advanced if score > 0.0 => score.max(2.0),
        _ => score,
    }
}

/// Normalize a formula for comparison: uppercase, no whitespace, `..` range
/// separators rewritten as `:`. Idempotent.
pub fn normalize_formula(formula: &str) -> String {
    formula
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
        .replace("..", ":")
}

/// Whether two formulas are equivalent after normalization.
pub fn formulas_equivalent(a: &str, b: &str) -> bool {
    normalize_formula(a) == normalize_formula(b)
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// The fixed evaluation substituted when the judge cannot be consulted.
/// Neutral component scores, so the weighted score is half the maximum.
fn neutral_fallback_evaluation(question: &Question, answer: &Answer) -> Evaluation {
    let fallback = Judgment::neutral_fallback();
    Evaluation {
        question_id: question.id.clone(),
        answer: answer.response.clone(),
        score: round2(0.5 * f64::from(question.max_score)),
        max_score: question.max_score,
        accuracy_score: fallback.accuracy,
        explanation_score: fallback.explanation,
        efficiency_score: fallback.efficiency,
        feedback: fallback.feedback,
        strengths: fallback.strengths,
        improvement_areas: fallback.improvement_areas,
        source: EvaluationSource::JudgeFallback,
    }
}

/// The distinct fallback for an internal fault in the scoring pipeline.
fn pipeline_fallback_evaluation(question: &Question, answer: &Answer) -> Evaluation {
    Evaluation {
        question_id: question.id.clone(),
        answer: answer.response.clone(),
        score: 5.0,
        max_score: question.max_score,
        accuracy_score: 0.5,
        explanation_score: 0.5,
        efficiency_score: 0.5,
        feedback: "I had some difficulty evaluating this response. The answer shows effort, \
                   but please try to be more specific about your approach."
            .to_string(),
        strengths: vec![
            "Attempted the question".to_string(),
            "Provided a response".to_string(),
        ],
        improvement_areas: vec![
            "Could be more specific".to_string(),
            "Include more technical details".to_string(),
        ],
        source: EvaluationSource::PipelineFallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use async_trait::async_trait;
    use chrono::Utc;

    struct FixedJudge(Judgment);

    #[async_trait]
    impl Judge for FixedJudge {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn judge(&self, _request: &JudgmentRequest) -> anyhow::Result<Judgment> {
            Ok(self.0.clone())
        }
    }

    struct FailingJudge;

    #[async_trait]
    impl Judge for FailingJudge {
        fn name(&self) -> &str {
            "failing"
        }
        async fn judge(&self, _request: &JudgmentRequest) -> anyhow::Result<Judgment> {
            anyhow::bail!("judge unavailable")
        }
    }

    fn judgment(accuracy: f64, explanation: f64, efficiency: f64) -> Judgment {
        Judgment {
            accuracy,
            explanation,
            efficiency,
            feedback: "Solid answer.".into(),
            strengths: vec!["Correct function".into()],
            improvement_areas: vec![],
        }
    }

    fn question(category: Category, difficulty: Difficulty, keywords: &[&str]) -> Question {
        Question {
            id: "q1".into(),
            text: "Sum the range A1:A10".into(),
            category,
            difficulty,
            expected_answers: vec!["=SUM(A1:A10)".into()],
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            max_score: 10,
            time_limit_secs: None,
            hints: vec![],
        }
    }

    fn answer(text: &str) -> Answer {
        Answer {
            question_id: "q1".into(),
            response: text.into(),
            timestamp: Utc::now(),
        }
    }

    fn evaluator(judge: impl Judge + 'static) -> Evaluator {
        Evaluator::new(
            Arc::new(judge),
            ScoreWeights::default(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn invalid_weights_rejected() {
        let weights = ScoreWeights {
            accuracy: 0.5,
            explanation: 0.3,
            efficiency: 0.3,
        };
        match Evaluator::new(Arc::new(FailingJudge), weights, Duration::from_secs(5)) {
            Err(EngineError::InvalidWeights(sum)) => assert!((sum - 1.1).abs() < 1e-9),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("weights summing to 1.1 were accepted"),
        }
    }

    #[test]
    fn keyword_signal_neutral_without_keywords() {
        let ev = evaluator(FailingJudge);
        let q = question(Category::Chart, Difficulty::Basic, &[]);
        assert_eq!(ev.keyword_signal(&q, "anything at all"), 0.5);
    }

    #[test]
    fn keyword_signal_scenario_a() {
        // Keywords ["SUM", "range"] against an elaborated response: both match,
        // bonus fires, still capped at 1.0.
        let ev = evaluator(FailingJudge);
        let q = question(Category::Formula, Difficulty::Basic, &["SUM", "range"]);
        let score = ev.keyword_signal(&q, "I would use =SUM(A1:A10) as the range formula");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn keyword_signal_equals_prefix_variants() {
        let ev = evaluator(FailingJudge);
        // Keyword carries the '=' but the response omits it.
        let q = question(Category::Formula, Difficulty::Basic, &["=SUM"]);
        assert_eq!(ev.keyword_signal(&q, "just SUM it"), 1.0);
        // Keyword omits the '=' but the response writes the formula form.
        let q = question(Category::Formula, Difficulty::Basic, &["max"]);
        assert_eq!(ev.keyword_signal(&q, "try =MAX(B1:B15)"), 1.0);
    }

    #[test]
    fn keyword_signal_is_monotonic() {
        let ev = evaluator(FailingJudge);
        let q = question(
            Category::Formula,
            Difficulty::Basic,
            &["SUM", "range", "total"],
        );
        let without = ev.keyword_signal(&q, "use SUM over the range");
        let with = ev.keyword_signal(&q, "use SUM over the range for the total");
        assert!(with >= without);
    }

    #[test]
    fn keyword_bonus_needs_elaboration() {
        let ev = evaluator(FailingJudge);
        let q = question(Category::Formula, Difficulty::Basic, &["SUM"]);
        // Full match but short answer: no bonus to apply, score already 1.0.
        assert_eq!(ev.keyword_signal(&q, "SUM"), 1.0);
    }

    #[test]
    fn formula_signal_absent_for_other_categories() {
        let ev = evaluator(FailingJudge);
        let q = question(Category::Chart, Difficulty::Basic, &[]);
        assert_eq!(ev.formula_signal(&q, "=SUM(A1:A10)"), None);
    }

    #[test]
    fn formula_signal_exact_match_scenario_a() {
        let ev = evaluator(FailingJudge);
        let q = question(Category::Formula, Difficulty::Basic, &[]);
        let score = ev.formula_signal(&q, "I would use =SUM(A1:A10) as the range formula");
        assert_eq!(score, Some(1.0));
    }

    #[test]
    fn formula_signal_function_name_only() {
        let ev = evaluator(FailingJudge);
        let q = question(Category::Function, Difficulty::Basic, &[]);
        assert_eq!(ev.formula_signal(&q, "I'd reach for vlookup here"), Some(0.7));
    }

    #[test]
    fn formula_signal_no_formula_content() {
        let ev = evaluator(FailingJudge);
        let q = question(Category::Formula, Difficulty::Basic, &[]);
        assert_eq!(ev.formula_signal(&q, "click around until it works"), Some(0.0));
    }

    #[test]
    fn formula_signal_valid_but_wrong() {
        let ev = evaluator(FailingJudge);
        let q = question(Category::Formula, Difficulty::Basic, &[]);
        assert_eq!(ev.formula_signal(&q, "=COUNT(B1:B5)"), Some(0.6));
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_formula("= sum(a1 .. a10)");
        let twice = normalize_formula(&once);
        assert_eq!(once, twice);
        assert_eq!(once, "=SUM(A1:A10)");
    }

    #[test]
    fn range_separators_equivalent() {
        assert!(formulas_equivalent("=SUM(A1:A10)", "=SUM(A1..A10)"));
        assert!(formulas_equivalent("= SUM( A1:A10 )", "=sum(a1:a10)"));
        assert!(!formulas_equivalent("=SUM(A1:A10)", "=SUM(A1:A9)"));
    }

    #[tokio::test]
    async fn evaluate_combines_formula_and_judge() {
        let ev = evaluator(FixedJudge(judgment(0.9, 0.8, 0.7)));
        let q = question(Category::Formula, Difficulty::Intermediate, &["SUM", "range"]);
        let eval = ev
            .evaluate(&q, &answer("I would use =SUM(A1:A10) as the range formula"))
            .await;

        // accuracy = 0.6*1.0 + 0.3*0.9 + 0.1*1.0 = 0.97
        assert_eq!(eval.accuracy_score, 0.97);
        assert_eq!(eval.explanation_score, 0.8);
        assert_eq!(eval.efficiency_score, 0.7);
        // score = (0.97*0.4 + 0.8*0.3 + 0.7*0.3) * 10 = 8.38, intermediate: no adjustment
        assert_eq!(eval.score, 8.38);
        assert_eq!(eval.source, EvaluationSource::Judged);
    }

    #[tokio::test]
    async fn evaluate_without_formula_signal() {
        let ev = evaluator(FixedJudge(judgment(0.8, 0.6, 0.6)));
        let q = question(Category::Chart, Difficulty::Intermediate, &["chart", "Insert"]);
        let eval = ev.evaluate(&q, &answer("Insert a chart from the ribbon")).await;

        // accuracy = 0.7*0.8 + 0.3*1.0 = 0.86
        assert_eq!(eval.accuracy_score, 0.86);
        // score = (0.86*0.4 + 0.6*0.3 + 0.6*0.3) * 10 = 7.04
        assert_eq!(eval.score, 7.04);
    }

    #[tokio::test]
    async fn basic_tier_gets_small_boost_capped_at_max() {
        let ev = evaluator(FixedJudge(judgment(1.0, 1.0, 1.0)));
        let q = question(Category::Formula, Difficulty::Basic, &["SUM", "range"]);
        let eval = ev
            .evaluate(&q, &answer("The formula =SUM(A1:A10) adds every value in the range"))
            .await;
        // Perfect components boosted by 1.05 would exceed 10; capped at max.
        assert!(eval.score <= 10.0);
        assert!(eval.score > 9.9);
    }

    #[tokio::test]
    async fn advanced_tier_floors_nonzero_attempts() {
        let ev = evaluator(FixedJudge(judgment(0.05, 0.05, 0.05)));
        let q = question(Category::Chart, Difficulty::Advanced, &[]);
        let eval = ev.evaluate(&q, &answer("not sure")).await;
        assert!(eval.score >= 2.0);
    }

    #[tokio::test]
    async fn judge_scores_clamped_before_weighting() {
        let ev = evaluator(FixedJudge(judgment(3.0, -1.0, 0.5)));
        let q = question(Category::Chart, Difficulty::Intermediate, &[]);
        let eval = ev.evaluate(&q, &answer("a chart answer")).await;
        assert!(eval.accuracy_score <= 1.0);
        assert_eq!(eval.explanation_score, 0.0);
        assert!(eval.score >= 0.0 && eval.score <= 10.0);
    }

    #[tokio::test]
    async fn failing_judge_yields_neutral_fallback() {
        let ev = evaluator(FailingJudge);
        let q = question(Category::Formula, Difficulty::Basic, &["SUM"]);
        let eval = ev.evaluate(&q, &answer("=SUM(A1:A10)")).await;

        assert_eq!(eval.source, EvaluationSource::JudgeFallback);
        assert_eq!(eval.score, 5.0);
        assert_eq!(eval.accuracy_score, 0.5);
        assert_eq!(eval.strengths, vec!["Attempted the question".to_string()]);
    }

    #[tokio::test]
    async fn slow_judge_times_out_to_fallback() {
        struct SlowJudge;

        #[async_trait]
        impl Judge for SlowJudge {
            fn name(&self) -> &str {
                "slow"
            }
            async fn judge(&self, _request: &JudgmentRequest) -> anyhow::Result<Judgment> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Judgment::neutral_fallback())
            }
        }

        let ev = Evaluator::new(
            Arc::new(SlowJudge),
            ScoreWeights::default(),
            Duration::from_millis(50),
        )
        .unwrap();
        let q = question(Category::Chart, Difficulty::Basic, &[]);
        let eval = ev.evaluate(&q, &answer("anything")).await;
        assert_eq!(eval.source, EvaluationSource::JudgeFallback);
    }
}
