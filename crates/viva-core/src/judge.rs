//! The judgment-collaborator contract.
//!
//! The engine scores answers by blending rule-based signals with an external
//! judgment model. This module defines the request/response shapes and the
//! async trait that `viva-judge` adapters implement. The engine never depends
//! on how a concrete judge formats its responses; decoding lives in the
//! adapter crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{Category, Difficulty};

/// Everything a judge needs to assess one answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgmentRequest {
    /// The question prompt.
    pub question: String,
    /// Skill area of the question.
    pub category: Category,
    /// Difficulty tier of the question.
    pub difficulty: Difficulty,
    /// The candidate's response text.
    pub response: String,
    /// Reference answers for the question.
    #[serde(default)]
    pub expected_answers: Vec<String>,
    /// Keywords the rule-based signal looks for.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Component scores and feedback returned by a judge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judgment {
    /// Technical correctness in [0, 1].
    pub accuracy: f64,
    /// Quality of reasoning and explanation in [0, 1].
    pub explanation: f64,
    /// Optimality of the approach in [0, 1].
    pub efficiency: f64,
    /// Free-text feedback.
    pub feedback: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvement_areas: Vec<String>,
}

impl Judgment {
    /// The fixed neutral judgment substituted when the collaborator cannot be
    /// consulted successfully. The session continues uninterrupted.
    pub fn neutral_fallback() -> Self {
        Self {
            accuracy: 0.5,
            explanation: 0.5,
            efficiency: 0.5,
            feedback: "Thanks for your answer. Keep explaining your reasoning as we go."
                .to_string(),
            strengths: vec!["Attempted the question".to_string()],
            improvement_areas: vec!["Could provide more detail".to_string()],
        }
    }
}

/// Trait for external judgment models that score free-text answers.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Human-readable judge name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Assess one answer. Errors are recovered by the evaluator with the
    /// neutral fallback, so implementations should surface failures honestly
    /// rather than guessing.
    async fn judge(&self, request: &JudgmentRequest) -> anyhow::Result<Judgment>;
}
