//! viva-judge — LLM judge adapters.
//!
//! Implements the `Judge` trait for the Gemini API and for a deterministic
//! mock, plus configuration loading for the viva CLI.

pub mod config;
pub mod decode;
pub mod error;
pub mod gemini;
pub mod mock;

pub use config::{create_judge, load_config, load_config_from, JudgeConfig, VivaConfig};
pub use error::JudgeError;
pub use gemini::GeminiJudge;
pub use mock::MockJudge;
