/// Generation client, the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the generation endpoint directly.
/// Services depend on the `Generator` trait; `GeminiClient` is the production backend.
///
/// Fallback policy: only HTTP 429 (quota) and transport failures move on to the next
/// model in the chain. Any other HTTP error or malformed success body is terminal.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod normalize;

/// Models tried, in order, after the caller's preferred model.
pub const FALLBACK_MODELS: [&str; 2] = ["gemini-2.0-flash", "gemini-1.5-flash"];
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Error on {model}: {body}")]
    Http {
        model: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected API structure from {model}")]
    UnexpectedStructure { model: String },

    #[error("All models failed. Last error: {last_error}")]
    AllModelsFailed { last_error: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Model selection
// ────────────────────────────────────────────────────────────────────────────

/// The operator-selectable primary models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PreferredModel {
    #[default]
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,
    #[serde(rename = "gemini-exp-1206")]
    GeminiExp1206,
}

impl PreferredModel {
    pub const ALL: [PreferredModel; 3] = [
        PreferredModel::Gemini25Flash,
        PreferredModel::Gemini20Flash,
        PreferredModel::GeminiExp1206,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PreferredModel::Gemini25Flash => "gemini-2.5-flash",
            PreferredModel::Gemini20Flash => "gemini-2.0-flash",
            PreferredModel::GeminiExp1206 => "gemini-exp-1206",
        }
    }
}

impl fmt::Display for PreferredModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown model '{0}'")]
pub struct UnknownModel(pub String);

impl FromStr for PreferredModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PreferredModel::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// Builds the ordered model chain: preferred model first, then the fixed fallbacks.
pub fn build_model_chain(preferred: &str) -> Vec<String> {
    dedup_models(std::iter::once(preferred).chain(FALLBACK_MODELS))
}

/// Removes repeated identifiers, keeping the first occurrence of each.
pub fn dedup_models<'a>(models: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut chain: Vec<String> = Vec::new();
    for model in models {
        if !chain.iter().any(|m| m == model) {
            chain.push(model.to_string());
        }
    }
    chain
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// Text at `candidates[0].content.parts[0].text`, if the reply has that shape.
///
/// Walked on an untyped value so that a well-formed body of the wrong shape is
/// told apart from a body that is not JSON at all.
fn first_candidate_text(reply: &Value) -> Option<String> {
    reply
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

/// The error body, or why it could not be read.
fn body_or_read_error<E: fmt::Display>(body: Result<String, E>) -> String {
    body.unwrap_or_else(|e| format!("<failed to read error body: {e}>"))
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Anything that can turn a prompt into generated text.
///
/// Carried in `AppState` as `Arc<dyn Generator>` so services can be driven by a stub.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        credential: &str,
        preferred_model: &str,
    ) -> Result<String, GenerationError>;
}

/// Gemini `generateContent` client with quota-driven model fallback.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        credential: &str,
        preferred_model: &str,
    ) -> Result<String, GenerationError> {
        let credential = credential.trim();
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let mut last_error = String::new();

        for model in build_model_chain(preferred_model) {
            let response = self
                .client
                .post(self.endpoint(&model))
                .query(&[("key", credential)])
                .json(&body)
                .send()
                .await;

            // Strip the URL: it carries the credential as a query parameter.
            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    let e = e.without_url();
                    warn!(model = %model, "Generation request failed: {e}");
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();
            debug!(model = %model, status = status.as_u16(), "Generation endpoint responded");

            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!(model = %model, "Quota exceeded, falling back to next model");
                continue;
            }

            if !status.is_success() {
                let body = body_or_read_error(response.text().await.map_err(|e| e.without_url()));
                return Err(GenerationError::Http {
                    model,
                    status: status.as_u16(),
                    body,
                });
            }

            let bytes = match response.bytes().await {
                Ok(b) => b,
                Err(e) => {
                    let e = e.without_url();
                    warn!(model = %model, "Failed to read generation response: {e}");
                    last_error = e.to_string();
                    continue;
                }
            };

            let reply: Value = match serde_json::from_slice(&bytes) {
                Ok(v) => v,
                Err(e) => {
                    warn!(model = %model, "Generation response is not JSON: {e}");
                    last_error = e.to_string();
                    continue;
                }
            };

            let Some(mut text) = first_candidate_text(&reply) else {
                return Err(GenerationError::UnexpectedStructure { model });
            };

            if model != preferred_model {
                info!(preferred = preferred_model, used = %model, "Served by fallback model");
                text.push_str(&format!(
                    "\n\n(Note: Switched to {model} due to quota limits)"
                ));
            }

            return Ok(text);
        }

        Err(GenerationError::AllModelsFailed { last_error })
    }
}
