//! Core data model types for viva.
//!
//! These are the fundamental types the entire viva system uses to represent
//! questions, answers, evaluations, and interview sessions.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Question difficulty tiers, ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// All tiers in ascending order.
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Basic,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Basic => write!(f, "basic"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Difficulty::Basic),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Skill areas a question can probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Formula,
    Function,
    DataAnalysis,
    Chart,
    PivotTable,
    Macro,
    ConditionalFormatting,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Formula => write!(f, "formula"),
            Category::Function => write!(f, "function"),
            Category::DataAnalysis => write!(f, "data_analysis"),
            Category::Chart => write!(f, "chart"),
            Category::PivotTable => write!(f, "pivot_table"),
            Category::Macro => write!(f, "macro"),
            Category::ConditionalFormatting => write!(f, "conditional_formatting"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "formula" => Ok(Category::Formula),
            "function" => Ok(Category::Function),
            "data_analysis" | "data-analysis" => Ok(Category::DataAnalysis),
            "chart" => Ok(Category::Chart),
            "pivot_table" | "pivot-table" => Ok(Category::PivotTable),
            "macro" => Ok(Category::Macro),
            "conditional_formatting" | "conditional-formatting" => {
                Ok(Category::ConditionalFormatting)
            }
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// A single interview question. Immutable after catalog load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the catalog.
    pub id: String,
    /// The prompt shown to the candidate.
    pub text: String,
    /// Skill area this question probes.
    pub category: Category,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Acceptable reference answers, used for formula equivalence checks.
    #[serde(default)]
    pub expected_answers: Vec<String>,
    /// Terms the keyword signal looks for in the response.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Maximum attainable score.
    #[serde(default = "default_max_score")]
    pub max_score: u32,
    /// Suggested time limit in seconds.
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
    /// Optional hints for struggling candidates.
    #[serde(default)]
    pub hints: Vec<String>,
}

fn default_max_score() -> u32 {
    10
}

/// A candidate's answer to one question. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The question this answers.
    pub question_id: String,
    /// Raw response text.
    pub response: String,
    /// When the answer was received.
    pub timestamp: DateTime<Utc>,
}

/// Which path produced an evaluation.
///
/// Fallback use is an observable outcome, not a swallowed exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSource {
    /// The judge responded and its scores were combined normally.
    #[default]
    Judged,
    /// The judge call failed or timed out; the neutral judgment was used.
    JudgeFallback,
    /// The scoring pipeline itself faulted; the fixed 5.0/10 record was used.
    PipelineFallback,
}

/// The scored outcome of one answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// The question this evaluation belongs to.
    pub question_id: String,
    /// The answer text that was evaluated.
    pub answer: String,
    /// Final weighted score, scaled to `max_score`.
    pub score: f64,
    /// Maximum attainable score for the question.
    pub max_score: u32,
    /// Accuracy component in [0, 1].
    pub accuracy_score: f64,
    /// Explanation-quality component in [0, 1].
    pub explanation_score: f64,
    /// Efficiency component in [0, 1].
    pub efficiency_score: f64,
    /// Free-text feedback for the candidate.
    pub feedback: String,
    /// What the answer did well.
    #[serde(default)]
    pub strengths: Vec<String>,
    /// Where the answer could improve.
    #[serde(default)]
    pub improvement_areas: Vec<String>,
    /// Which pipeline path produced this record.
    #[serde(default)]
    pub source: EvaluationSource,
}

/// Mutable state of one interview session.
///
/// Invariant: `answers.len() <= questions_asked.len() <= evaluations.len() + 1`;
/// a question may be outstanding, but an answer and its evaluation are always
/// appended together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Opaque unique session identifier.
    pub session_id: Uuid,
    /// Candidate label, if provided at start.
    pub candidate_name: Option<String>,
    /// Identifiers of questions asked so far, in order. Append-only.
    pub questions_asked: Vec<String>,
    /// Answers, index-aligned with `questions_asked`. Append-only.
    pub answers: Vec<Answer>,
    /// Evaluations, index-aligned with `answers`. Append-only.
    pub evaluations: Vec<Evaluation>,
    /// Current difficulty tier for question selection.
    pub current_difficulty: Difficulty,
    /// When the session started.
    pub start_time: DateTime<Utc>,
    /// When the session ended, once completed.
    pub end_time: Option<DateTime<Utc>>,
    /// Whether the session has ended.
    pub completed: bool,
}

impl SessionState {
    pub fn new(candidate_name: Option<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            candidate_name,
            questions_asked: Vec::new(),
            answers: Vec::new(),
            evaluations: Vec::new(),
            current_difficulty: Difficulty::Basic,
            start_time: Utc::now(),
            end_time: None,
            completed: false,
        }
    }

    /// True when a question has been asked but not yet answered.
    pub fn awaiting_answer(&self) -> bool {
        !self.completed && self.questions_asked.len() > self.answers.len()
    }
}

/// Who produced a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Interviewer,
    Candidate,
}

/// One dialogue turn in a session transcript. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl TranscriptMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }
}

/// A full session record: scored state plus the dialogue transcript.
///
/// This is the unit held by the session store and the canonical JSON export
/// shape; it must round-trip through serde without loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub state: SessionState,
    pub transcript: Vec<TranscriptMessage>,
}

impl Session {
    pub fn new(candidate_name: Option<String>) -> Self {
        Self {
            state: SessionState::new(candidate_name),
            transcript: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Basic.to_string(), "basic");
        assert_eq!(Difficulty::Advanced.to_string(), "advanced");
        assert_eq!("basic".parse::<Difficulty>().unwrap(), Difficulty::Basic);
        assert_eq!(
            "Intermediate".parse::<Difficulty>().unwrap(),
            Difficulty::Intermediate
        );
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn category_display_and_parse() {
        assert_eq!(Category::PivotTable.to_string(), "pivot_table");
        assert_eq!(
            "pivot-table".parse::<Category>().unwrap(),
            Category::PivotTable
        );
        assert_eq!(
            "conditional_formatting".parse::<Category>().unwrap(),
            Category::ConditionalFormatting
        );
        assert!("trivia".parse::<Category>().is_err());
    }

    #[test]
    fn question_serde_defaults() {
        let json = r#"{
            "id": "q1",
            "text": "What does SUM do?",
            "category": "function",
            "difficulty": "basic"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.max_score, 10);
        assert!(q.keywords.is_empty());
        assert!(q.time_limit_secs.is_none());
    }

    #[test]
    fn new_session_is_awaiting_nothing() {
        let session = Session::new(Some("Ada".into()));
        assert!(!session.state.awaiting_answer());
        assert_eq!(session.state.current_difficulty, Difficulty::Basic);
        assert!(!session.state.completed);
    }

    #[test]
    fn session_serde_roundtrip() {
        let mut session = Session::new(None);
        session.state.questions_asked.push("q1".into());
        session
            .transcript
            .push(TranscriptMessage::new(Role::Interviewer, "Question 1"));

        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back.state.session_id, session.state.session_id);
        assert_eq!(back.state.questions_asked, vec!["q1".to_string()]);
        assert_eq!(back.transcript.len(), 1);
        assert_eq!(back.transcript[0].role, Role::Interviewer);
    }

    #[test]
    fn evaluation_source_defaults_to_judged() {
        let json = r#"{
            "question_id": "q1",
            "answer": "=SUM(A1:A10)",
            "score": 8.5,
            "max_score": 10,
            "accuracy_score": 0.9,
            "explanation_score": 0.8,
            "efficiency_score": 0.85,
            "feedback": "Good"
        }"#;
        let eval: Evaluation = serde_json::from_str(json).unwrap();
        assert_eq!(eval.source, EvaluationSource::Judged);
    }
}
