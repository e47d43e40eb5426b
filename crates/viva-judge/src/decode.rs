//! Decoding of model replies into structured judgments.
//!
//! Models are asked for bare JSON but routinely wrap it in markdown code
//! fences, so fences are stripped before parsing. Anything that still fails
//! to parse or carries out-of-range component scores is rejected; the
//! evaluator upstream turns that rejection into its neutral fallback.

use serde::Deserialize;

use viva_core::judge::Judgment;

use crate::error::JudgeError;

/// The JSON document a judge model is asked to produce.
#[derive(Debug, Deserialize)]
struct WireJudgment {
    accuracy_score: f64,
    explanation_score: f64,
    efficiency_score: f64,
    // Models echo an overall score; the engine recomputes it from the
    // components, so the echoed value is ignored.
    #[serde(default)]
    #[allow(dead_code)]
    overall_score: f64,
    feedback: String,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvement_areas: Vec<String>,
}

/// Remove a surrounding markdown code fence, if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a model reply into a `Judgment`.
pub fn parse_judgment(text: &str) -> Result<Judgment, JudgeError> {
    let body = strip_code_fences(text);
    let wire: WireJudgment = serde_json::from_str(body)
        .map_err(|e| JudgeError::Unparseable(format!("invalid JSON: {e}")))?;

    for (name, value) in [
        ("accuracy_score", wire.accuracy_score),
        ("explanation_score", wire.explanation_score),
        ("efficiency_score", wire.efficiency_score),
    ] {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(JudgeError::Unparseable(format!(
                "{name} out of range: {value}"
            )));
        }
    }

    Ok(Judgment {
        accuracy: wire.accuracy_score,
        explanation: wire.explanation_score,
        efficiency: wire.efficiency_score,
        feedback: wire.feedback,
        strengths: wire.strengths,
        improvement_areas: wire.improvement_areas,
    })
}
