//! viva-core — Interview session engine, scoring, and adaptive difficulty.
//!
//! This crate defines the data model, the question catalog, the answer
//! evaluator, the difficulty/termination policies, and the session engine
//! that the rest of the viva system builds on.

pub mod catalog;
pub mod error;
pub mod judge;
pub mod messages;
pub mod metrics;
pub mod model;
pub mod progression;
pub mod scoring;
pub mod selector;
pub mod session;
