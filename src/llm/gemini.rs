//! Reqwest-backed Gemini completion client.
//!
//! Calls the `generateContent` REST method with a single user turn and
//! returns the concatenated text parts of the first candidate.

use crate::error::{AssistantError, AssistantResult};
use crate::llm::CompletionService;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Model selection and transport settings.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    /// Base URL, without the `/v1beta/...` path
    pub endpoint: String,
    pub timeout: Duration,
}

impl GeminiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub struct GeminiClient {
    client: Client,
    url: String,
    api_key: String,
    temperature: f32,
}

impl GeminiClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is blank or the HTTP client cannot be built.
    pub fn new(settings: GeminiSettings) -> AssistantResult<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(AssistantError::invalid_input(
                "Gemini API key is empty: set GEMINI_API_KEY or pass --gemini-api-key",
            ));
        }
        let client = Client::builder().timeout(settings.timeout).build()?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            settings.endpoint.trim_end_matches('/'),
            settings.model
        );
        Ok(Self {
            client,
            url,
            api_key: settings.api_key,
            temperature: settings.temperature,
        })
    }
}

impl CompletionService for GeminiClient {
    async fn complete(&self, prompt: &str) -> AssistantResult<String> {
        let body = GenerateContentRequest::new(prompt, self.temperature);
        debug!(url = %self.url, prompt_chars = prompt.len(), "Sending completion request");

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let detail = String::from_utf8_lossy(&bytes);
            warn!(status = %status, "Completion request rejected");
            return Err(AssistantError::upstream(format!(
                "HTTP {}: {}",
                status,
                detail.trim()
            )));
        }

        parse_answer(&bytes)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, temperature: f32) -> Self {
        Self {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig { temperature },
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Text of the first candidate; an empty answer is an upstream error.
fn parse_answer(body: &[u8]) -> AssistantResult<String> {
    let decoded: GenerateContentResponse = serde_json::from_slice(body).map_err(|e| {
        AssistantError::upstream(format!("invalid generateContent payload: {}", e))
    })?;

    let text = decoded
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AssistantError::upstream("completion returned no text"));
    }
    Ok(text)
}
