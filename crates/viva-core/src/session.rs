//! Session engine: owns session state and sequences catalog, evaluator,
//! difficulty controller, and termination policy per incoming event.
//!
//! The store maps session ids to per-session mutexes, so two requests naming
//! the same session serialize while unrelated sessions proceed independently.
//! The store lock itself is only ever held for lookup and insert, never
//! across the judge call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::catalog::QuestionCatalog;
use crate::error::EngineError;
use crate::judge::Judge;
use crate::messages;
use crate::metrics;
use crate::model::{Answer, Difficulty, Role, Session, TranscriptMessage};
use crate::progression::{DifficultyPolicy, TerminationPolicy};
use crate::scoring::{Evaluator, ScoreWeights};
use crate::selector::select_question;

/// Tunables for the interview engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Score combination weights.
    pub weights: ScoreWeights,
    /// Difficulty progression thresholds.
    pub difficulty: DifficultyPolicy,
    /// Session termination rules.
    pub termination: TerminationPolicy,
    /// Bound on each judge call.
    pub judge_timeout: Duration,
    /// Seed for question selection; random when absent.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            difficulty: DifficultyPolicy::default(),
            termination: TerminationPolicy::default(),
            judge_timeout: Duration::from_secs(30),
            seed: None,
        }
    }
}

/// Outcome of starting a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartOutcome {
    pub session_id: Uuid,
    pub opening_message: String,
}

/// Outcome of submitting a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOutcome {
    /// The interviewer's reply: feedback plus the next question, or the
    /// closing summary.
    pub message: String,
    /// Whether the session is now complete.
    pub completed: bool,
    /// Running percentage score, once at least one answer was evaluated.
    pub current_percentage: Option<f64>,
}

/// Pure read of a session's progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub questions_asked: usize,
    pub current_difficulty: Difficulty,
    pub completed: bool,
    pub total_score: Option<f64>,
    pub percentage_score: Option<f64>,
}

/// Shared store of live sessions with per-session mutual exclusion.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn create(&self, session: Session) -> Arc<Mutex<Session>> {
        let id = session.state.session_id;
        let handle = Arc::new(Mutex::new(session));
        self.inner.write().await.insert(id, Arc::clone(&handle));
        handle
    }

    async fn get(&self, id: Uuid) -> Result<Arc<Mutex<Session>>, EngineError> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(EngineError::SessionNotFound(id))
    }

    async fn remove(&self, id: Uuid) -> Result<(), EngineError> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(EngineError::SessionNotFound(id))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// The interview session engine.
pub struct InterviewEngine {
    catalog: Arc<QuestionCatalog>,
    evaluator: Evaluator,
    config: EngineConfig,
    store: SessionStore,
    rng: std::sync::Mutex<StdRng>,
}

impl InterviewEngine {
    pub fn new(
        catalog: Arc<QuestionCatalog>,
        judge: Arc<dyn Judge>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let evaluator = Evaluator::new(judge, config.weights, config.judge_timeout)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            catalog,
            evaluator,
            config,
            store: SessionStore::new(),
            rng: std::sync::Mutex::new(rng),
        })
    }

    /// Create a session and immediately pose the first question.
    pub async fn start_session(&self, candidate_name: Option<String>) -> StartOutcome {
        let mut session = Session::new(candidate_name.clone());
        let session_id = session.state.session_id;

        let welcome = messages::welcome(
            candidate_name.as_deref(),
            self.config.termination.min_questions,
            self.config.termination.max_questions,
        );
        session
            .transcript
            .push(TranscriptMessage::new(Role::Interviewer, welcome.clone()));

        let continuation = match self.ask_next_question(&mut session) {
            Some(presentation) => presentation,
            // Empty catalog: nothing to ask, close immediately.
            None => self.end_session(&mut session),
        };
        session
            .transcript
            .push(TranscriptMessage::new(Role::Interviewer, continuation.clone()));

        let opening = format!("{welcome}\n\n{continuation}");

        self.store.create(session).await;
        info!(session = %session_id, candidate = ?candidate_name, "started session");

        StartOutcome {
            session_id,
            opening_message: opening,
        }
    }

    /// Process a candidate message: evaluate it when a question is
    /// outstanding, otherwise treat it as free-form conversation.
    pub async fn submit_response(
        &self,
        session_id: Uuid,
        text: &str,
    ) -> Result<SubmitOutcome, EngineError> {
        let handle = self.store.get(session_id).await?;
        let mut session = handle.lock().await;

        session
            .transcript
            .push(TranscriptMessage::new(Role::Candidate, text));

        let message = if session.state.awaiting_answer() {
            if text.trim().eq_ignore_ascii_case("hint") {
                // Hint requests are never scored.
                let reply = self.hint_reply(&session);
                session
                    .transcript
                    .push(TranscriptMessage::new(Role::Interviewer, reply.clone()));
                reply
            } else {
                self.evaluate_and_continue(&mut session, text).await
            }
        } else {
            // Free-form conversation: no scored state changes.
            let reply = messages::conversational_reply(session.state.completed);
            session
                .transcript
                .push(TranscriptMessage::new(Role::Interviewer, reply.clone()));
            reply
        };

        let current_percentage = if session.state.evaluations.is_empty() {
            None
        } else {
            Some(metrics::totals(&session.state.evaluations).percentage_score)
        };

        Ok(SubmitOutcome {
            message,
            completed: session.state.completed,
            current_percentage,
        })
    }

    /// Pure read of session progress.
    pub async fn get_status(&self, session_id: Uuid) -> Result<SessionStatus, EngineError> {
        let handle = self.store.get(session_id).await?;
        let session = handle.lock().await;
        let state = &session.state;

        let (total_score, percentage_score) = if state.evaluations.is_empty() {
            (None, None)
        } else {
            let totals = metrics::totals(&state.evaluations);
            (Some(totals.total_score), Some(totals.percentage_score))
        };

        Ok(SessionStatus {
            session_id,
            questions_asked: state.questions_asked.len(),
            current_difficulty: state.current_difficulty,
            completed: state.completed,
            total_score,
            percentage_score,
        })
    }

    /// Serialize the full session record as pretty JSON. The snapshot
    /// round-trips losslessly through `serde_json`.
    pub async fn export_transcript(&self, session_id: Uuid) -> Result<String, EngineError> {
        let handle = self.store.get(session_id).await?;
        let session = handle.lock().await;
        Ok(serde_json::to_string_pretty(&*session)?)
    }

    /// Drop a session from the store.
    pub async fn remove_session(&self, session_id: Uuid) -> Result<(), EngineError> {
        self.store.remove(session_id).await
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    fn hint_reply(&self, session: &Session) -> String {
        session
            .state
            .questions_asked
            .last()
            .and_then(|id| self.catalog.by_id(id))
            .map(messages::hint_reply)
            .unwrap_or_else(|| messages::conversational_reply(false))
    }

    async fn evaluate_and_continue(&self, session: &mut Session, text: &str) -> String {
        let current_id = session
            .state
            .questions_asked
            .last()
            .cloned()
            .unwrap_or_default();
        let Some(question) = self.catalog.by_id(&current_id).cloned() else {
            // Asked ids come from the catalog, so this only fires if the
            // catalog was swapped under a live session.
            let reply = messages::conversational_reply(false);
            session
                .transcript
                .push(TranscriptMessage::new(Role::Interviewer, reply.clone()));
            return reply;
        };

        let answer = Answer {
            question_id: current_id,
            response: text.to_string(),
            timestamp: Utc::now(),
        };

        // The evaluator is total, so answer and evaluation are always
        // appended together.
        let evaluation = self.evaluator.evaluate(&question, &answer).await;
        let question_number = session.state.questions_asked.len();
        let mut message = messages::feedback(&evaluation, question_number);
        session.state.answers.push(answer);
        session.state.evaluations.push(evaluation);

        session.state.current_difficulty = self
            .config
            .difficulty
            .next_tier(session.state.current_difficulty, &session.state.evaluations);

        let should_end = self
            .config
            .termination
            .should_end(session.state.questions_asked.len(), &session.state.evaluations);

        let continuation = if should_end {
            self.end_session(session)
        } else {
            match self.ask_next_question(session) {
                Some(presentation) => presentation,
                // Catalog exhausted: forced completion overrides the policy.
                None => self.end_session(session),
            }
        };

        message.push_str("\n\n");
        message.push_str(&continuation);
        session
            .transcript
            .push(TranscriptMessage::new(Role::Interviewer, message.clone()));
        message
    }

    /// Select, record, and render the next question. `None` when the catalog
    /// is exhausted.
    fn ask_next_question(&self, session: &mut Session) -> Option<String> {
        let question = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            select_question(
                &self.catalog,
                session.state.current_difficulty,
                &session.state.questions_asked,
                &mut *rng,
            )?
            .clone()
        };

        session.state.questions_asked.push(question.id.clone());
        let number = session.state.questions_asked.len();
        Some(messages::present_question(
            &question,
            number,
            self.config.termination.max_questions,
        ))
    }

    fn end_session(&self, session: &mut Session) -> String {
        let state = &mut session.state;
        state.end_time = Some(Utc::now());
        state.completed = true;

        let totals = metrics::totals(&state.evaluations);
        let skills = metrics::by_category(&state.questions_asked, &state.evaluations, &self.catalog);
        let tiers =
            metrics::by_difficulty(&state.questions_asked, &state.evaluations, &self.catalog);
        let duration_mins = state
            .end_time
            .map(|end| (end - state.start_time).num_seconds() as f64 / 60.0)
            .unwrap_or(0.0);

        info!(
            session = %state.session_id,
            questions = state.questions_asked.len(),
            percentage = totals.percentage_score,
            "completed session"
        );

        messages::summary(
            &totals,
            &skills,
            &tiers,
            state.evaluations.len(),
            duration_mins,
        )
    }
}
