//! Adaptive question selection.
//!
//! Picks an unasked question at the session's current tier, falling back to
//! the other tiers in a fixed probe order when the tier is exhausted. The
//! random source is injected so tests can force deterministic choices.

use rand::prelude::IndexedRandom;
use rand::Rng;

use crate::catalog::QuestionCatalog;
use crate::model::{Difficulty, Question};

/// Tier probe order when the current tier has no unasked questions left.
const FALLBACK_ORDER: [Difficulty; 3] = [
    Difficulty::Intermediate,
    Difficulty::Basic,
    Difficulty::Advanced,
];

/// Choose the next question, or `None` when every tier is exhausted.
/// Exhaustion is an end-of-catalog signal for the engine, not an error.
pub fn select_question<'a, R: Rng + ?Sized>(
    catalog: &'a QuestionCatalog,
    current: Difficulty,
    asked: &[String],
    rng: &mut R,
) -> Option<&'a Question> {
    let unasked = |tier: Difficulty| -> Vec<&'a Question> {
        catalog
            .by_difficulty(tier)
            .into_iter()
            .filter(|q| !asked.iter().any(|id| id == &q.id))
            .collect()
    };

    let candidates = unasked(current);
    if let Some(q) = candidates.choose(rng) {
        return Some(q);
    }

    for tier in FALLBACK_ORDER {
        if tier == current {
            continue;
        }
        let candidates = unasked(tier);
        if let Some(q) = candidates.choose(rng) {
            return Some(q);
        }
    }

    None
}
