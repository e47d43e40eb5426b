//! Gemini API judge implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use viva_core::judge::{Judge, Judgment, JudgmentRequest};

use crate::decode::parse_judgment;
use crate::error::JudgeError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const MAX_OUTPUT_TOKENS: u32 = 2000;
// Low temperature keeps grading consistent across candidates.
const JUDGE_TEMPERATURE: f64 = 0.1;

const SYSTEM_PROMPT: &str = "You are an expert skills assessor conducting a professional \
technical evaluation. Assess answers for accuracy, quality of explanation, and efficiency \
of approach. Be fair, constructive, and consistent.";

/// Judge backed by the Gemini `generateContent` REST API.
pub struct GeminiJudge {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiJudge {
    pub fn new(api_key: &str, model: Option<String>, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            api_key: api_key.to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        }
    }

    fn build_prompt(request: &JudgmentRequest) -> String {
        format!(
            "Assess the candidate's response using this structured approach:\n\n\
             Question: {question}\n\
             Question Type: {category}\n\
             Difficulty Level: {difficulty}\n\
             Candidate's Answer: {answer}\n\
             Expected Answers: {expected}\n\
             Keywords to Look For: {keywords}\n\n\
             ## Evaluation Criteria (Rate 0-1):\n\n\
             1. Accuracy Score: how correct is the technical solution?\n\
             2. Explanation Score: how well did they explain their reasoning?\n\
             3. Efficiency Score: is this the optimal approach?\n\n\
             Required JSON Response Format:\n\
             {{\n\
               \"accuracy_score\": 0.8,\n\
               \"explanation_score\": 0.7,\n\
               \"efficiency_score\": 0.9,\n\
               \"overall_score\": 8.0,\n\
               \"feedback\": \"Detailed constructive feedback...\",\n\
               \"strengths\": [\"Correct approach\", \"Clear explanation\"],\n\
               \"improvement_areas\": [\"Could optimize\", \"Add error handling\"]\n\
             }}\n\n\
             IMPORTANT: Respond with ONLY valid JSON in the format specified.",
            question = request.question,
            category = request.category,
            difficulty = request.difficulty,
            answer = request.response,
            expected = request.expected_answers.join("; "),
            keywords = request.keywords.join(", "),
        )
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[async_trait]
impl Judge for GeminiJudge {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn judge(&self, request: &JudgmentRequest) -> anyhow::Result<Judgment> {
        let body = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: Self::build_prompt(request),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: JUDGE_TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JudgeError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    JudgeError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(JudgeError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::AuthenticationFailed(body).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(JudgeError::ApiError { status, message }.into());
        }

        let api_response: GeminiResponse =
            response.json().await.map_err(|e| JudgeError::ApiError {
                status: 0,
                message: format!("failed to parse response: {e}"),
            })?;

        let text = api_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .unwrap_or_default();

        Ok(parse_judgment(text)?)
    }
}
