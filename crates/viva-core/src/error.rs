//! Engine error types.
//!
//! Deliberately small: the evaluator is total (it degrades to fallback
//! records instead of failing), so the only errors that cross the engine
//! boundary are client errors and catalog construction problems.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the session engine and catalog.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The caller named a session that does not exist.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// A catalog was loaded with two questions sharing an identifier.
    #[error("duplicate question id: {0}")]
    DuplicateQuestionId(String),

    /// Score weights must sum to 1.0.
    #[error("score weights sum to {0}, expected 1.0")]
    InvalidWeights(f64),

    /// A session snapshot failed to serialize.
    #[error("failed to serialize session: {0}")]
    Serialization(#[from] serde_json::Error),
}
