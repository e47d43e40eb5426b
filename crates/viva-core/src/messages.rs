//! Plain-text message rendering for interviewer turns.
//!
//! The engine is transport-agnostic; these functions produce the text the
//! caller shows the candidate, whatever the surface.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::metrics::{proficiency, PerformanceTotals};
use crate::model::{Category, Difficulty, Evaluation, Question};

/// Opening message for a new session.
pub fn welcome(candidate_name: Option<&str>, min_questions: usize, max_questions: usize) -> String {
    let greeting = match candidate_name {
        Some(name) => format!("Hi {name}!"),
        None => "Hello there!".to_string(),
    };
    format!(
        "{greeting} Welcome to your skills assessment.\n\n\
         You'll get {min_questions}-{max_questions} questions covering a range of skills. \
         Difficulty adapts to your performance as we go. Take your time, and explain \
         your reasoning; understanding matters as much as the right answer. \
         If you get stuck, reply \"hint\". Let's start with a fundamental question."
    )
}

/// Present a question with its position and tier.
pub fn present_question(question: &Question, number: usize, max_questions: usize) -> String {
    let mut msg = format!(
        "Question {number} of up to {max_questions} ({} difficulty):\n\n{}",
        question.difficulty, question.text
    );
    if let Some(limit) = question.time_limit_secs {
        let _ = write!(msg, "\n\nSuggested time: {} minutes.", limit.div_ceil(60));
    }
    msg
}

/// Feedback block for one evaluated answer.
pub fn feedback(evaluation: &Evaluation, question_number: usize) -> String {
    let mut msg = format!(
        "Question {question_number} feedback:\n\n{}\n\nScore: {:.1}/{}",
        evaluation.feedback, evaluation.score, evaluation.max_score
    );
    if !evaluation.strengths.is_empty() {
        let _ = write!(msg, "\nStrengths: {}", evaluation.strengths.join("; "));
    }
    if !evaluation.improvement_areas.is_empty() {
        let _ = write!(
            msg,
            "\nAreas to improve: {}",
            evaluation.improvement_areas.join("; ")
        );
    }
    msg
}

/// Reveal a question's hints without scoring anything.
pub fn hint_reply(question: &Question) -> String {
    if question.hints.is_empty() {
        return "No hints available for this one. Give it your best attempt.".to_string();
    }
    let mut msg = String::from("Here's a nudge:\n");
    for hint in &question.hints {
        let _ = writeln!(msg, "  - {hint}");
    }
    msg.push_str("\nAnswer when you're ready.");
    msg
}

/// Reply to free-form conversation outside the answer flow.
pub fn conversational_reply(completed: bool) -> String {
    if completed {
        "This session is complete. Thanks again for participating; feel free to export \
         your transcript or start a new session."
            .to_string()
    } else {
        "Happy to clarify. Ask away, or answer the current question when you're ready."
            .to_string()
    }
}

/// Closing summary rendered from the aggregator's output.
pub fn summary(
    totals: &PerformanceTotals,
    skill_breakdown: &BTreeMap<Category, f64>,
    difficulty_breakdown: &BTreeMap<Difficulty, f64>,
    questions_answered: usize,
    duration_mins: f64,
) -> String {
    let mut msg = String::from("Session complete. Here's your performance summary:\n\n");
    let _ = writeln!(
        msg,
        "Overall: {:.1}/{} ({:.1}%) across {} questions in {:.1} minutes.",
        totals.total_score,
        totals.max_possible_score,
        totals.percentage_score,
        questions_answered,
        duration_mins
    );
    let _ = writeln!(
        msg,
        "Component averages: accuracy {:.2}, explanation {:.2}, efficiency {:.2}.",
        totals.average_accuracy, totals.average_explanation, totals.average_efficiency
    );

    if !skill_breakdown.is_empty() {
        msg.push_str("\nBy skill area:\n");
        for (category, mean) in skill_breakdown {
            let _ = writeln!(msg, "  {category}: {mean:.1}/10");
        }
    }
    if !difficulty_breakdown.is_empty() {
        msg.push_str("\nBy difficulty:\n");
        for (tier, mean) in difficulty_breakdown {
            let _ = writeln!(msg, "  {tier}: {mean:.1}/10");
        }
    }

    let _ = write!(
        msg,
        "\nAssessed proficiency level: {}. Thank you for your time and effort!",
        proficiency(totals.percentage_score)
    );
    msg
}
