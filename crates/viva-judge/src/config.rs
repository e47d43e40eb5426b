//! Configuration loading and judge factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use viva_core::judge::Judge;
use viva_core::progression::{DifficultyPolicy, TerminationPolicy};
use viva_core::scoring::ScoreWeights;
use viva_core::session::EngineConfig;

use crate::gemini::GeminiJudge;
use crate::mock::MockJudge;

/// Configuration for the judge backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JudgeConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
    },
    Mock,
}

impl std::fmt::Debug for JudgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JudgeConfig::Gemini {
                api_key: _,
                model,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("model", model)
                .field("base_url", base_url)
                .finish(),
            JudgeConfig::Mock => f.debug_struct("Mock").finish(),
        }
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        JudgeConfig::Mock
    }
}

/// Interview flow settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewConfig {
    #[serde(default = "default_min_questions")]
    pub min_questions: usize,
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    #[serde(default = "default_struggling_threshold")]
    pub struggling_threshold: f64,
    #[serde(default = "default_adaptive")]
    pub adaptive: bool,
    /// Bound on each judge call, in seconds.
    #[serde(default = "default_judge_timeout")]
    pub judge_timeout_secs: u64,
}

fn default_min_questions() -> usize {
    5
}
fn default_max_questions() -> usize {
    7
}
fn default_struggling_threshold() -> f64 {
    3.0
}
fn default_adaptive() -> bool {
    true
}
fn default_judge_timeout() -> u64 {
    30
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            min_questions: default_min_questions(),
            max_questions: default_max_questions(),
            struggling_threshold: default_struggling_threshold(),
            adaptive: default_adaptive(),
            judge_timeout_secs: default_judge_timeout(),
        }
    }
}

/// Score combination weights as they appear in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_accuracy_weight")]
    pub accuracy: f64,
    #[serde(default = "default_explanation_weight")]
    pub explanation: f64,
    #[serde(default = "default_efficiency_weight")]
    pub efficiency: f64,
}

fn default_accuracy_weight() -> f64 {
    0.4
}
fn default_explanation_weight() -> f64 {
    0.3
}
fn default_efficiency_weight() -> f64 {
    0.3
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            accuracy: default_accuracy_weight(),
            explanation: default_explanation_weight(),
            efficiency: default_efficiency_weight(),
        }
    }
}

/// Top-level viva configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VivaConfig {
    #[serde(default)]
    pub judge: JudgeConfig,
    #[serde(default)]
    pub interview: InterviewConfig,
    #[serde(default)]
    pub weights: WeightsConfig,
    /// Directory of question TOML files; the built-in bank is used when absent.
    #[serde(default)]
    pub questions_dir: Option<PathBuf>,
}

impl VivaConfig {
    /// Map file settings onto the engine configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            weights: ScoreWeights {
                accuracy: self.weights.accuracy,
                explanation: self.weights.explanation,
                efficiency: self.weights.efficiency,
            },
            difficulty: DifficultyPolicy {
                adaptive: self.interview.adaptive,
                ..Default::default()
            },
            termination: TerminationPolicy {
                min_questions: self.interview.min_questions,
                max_questions: self.interview.max_questions,
                struggling_threshold: self.interview.struggling_threshold,
                ..Default::default()
            },
            judge_timeout: Duration::from_secs(self.interview.judge_timeout_secs),
            seed: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_judge_config(config: &JudgeConfig) -> JudgeConfig {
    match config {
        JudgeConfig::Gemini {
            api_key,
            model,
            base_url,
        } => JudgeConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            model: model.clone(),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        JudgeConfig::Mock => JudgeConfig::Mock,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `viva.toml` in the current directory
/// 2. `~/.config/viva/config.toml`
///
/// Environment variable override: `VIVA_GEMINI_KEY`.
pub fn load_config() -> Result<VivaConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<VivaConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("viva.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<VivaConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => VivaConfig::default(),
    };

    // Apply env var override
    if let Ok(key) = std::env::var("VIVA_GEMINI_KEY") {
        config.judge = match config.judge {
            JudgeConfig::Gemini {
                model, base_url, ..
            } => JudgeConfig::Gemini {
                api_key: key,
                model,
                base_url,
            },
            JudgeConfig::Mock => JudgeConfig::Gemini {
                api_key: key,
                model: None,
                base_url: None,
            },
        };
    }

    config.judge = resolve_judge_config(&config.judge);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("viva"))
}

/// Create a judge instance from its configuration.
pub fn create_judge(config: &JudgeConfig) -> Result<Arc<dyn Judge>> {
    match config {
        JudgeConfig::Gemini {
            api_key,
            model,
            base_url,
        } => {
            if api_key.is_empty() {
                anyhow::bail!(
                    "gemini judge requires an API key; set it in viva.toml or VIVA_GEMINI_KEY"
                );
            }
            Ok(Arc::new(GeminiJudge::new(
                api_key,
                model.clone(),
                base_url.clone(),
            )))
        }
        JudgeConfig::Mock => Ok(Arc::new(MockJudge::heuristic())),
    }
}
