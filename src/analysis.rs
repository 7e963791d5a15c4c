//! Writing analysis backed by the Gemini `generateContent` API.
//!
//! # Configuration
//!
//! - `GEMINI_API_KEY` (or `API_KEY`): API key, required to analyze
//! - `GEMINI_ENDPOINT`: API base URL (default: the public v1beta endpoint)
//!
//! The model name comes from the user config. The response is passed through
//! as-is; nothing beyond its JSON shape is validated.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Message shown to the user whenever analysis fails
pub const FAILED_MESSAGE: &str = "Failed to analyze text. Please try again.";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("API key not set (GEMINI_API_KEY or API_KEY)")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("response contained no text")]
    EmptyResponse,

    #[error("invalid JSON response from AI: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub value: String,
}

/// Structured summary of a finished text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub summary: String,
    pub sentiment: String,
    pub stats: Vec<Stat>,
    pub interesting_words: Vec<String>,
}

/// Anything that can turn a finished text into an [`Analysis`]
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: &str) -> AnalysisResult<Analysis>;
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: std::env::var("GEMINI_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            model: DEFAULT_MODEL.to_string(),
            api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .ok()
                .filter(|k| !k.is_empty()),
            timeout_secs: 60,
        }
    }
}

impl AnalysisConfig {
    /// Environment-derived config for the given model
    pub fn from_env(model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..Self::default()
        }
    }

    pub fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

pub fn build_prompt(text: &str) -> String {
    format!(
        "Analyze the following text purely for statistical and encouraging insights. \
Do not judge quality, grammar, or spelling. Provide a short, positive, one-sentence summary. \
Identify the overall sentiment (e.g., Positive, Neutral, Negative, Mixed). \
Provide interesting stats like word count, unique word count, and average word length. \
Identify up to 5 interesting or powerful adjectives or verbs used. \
Your entire response MUST be in the specified JSON format.

Text to analyze:
---
{text}
---
"
    )
}

fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "A short, positive, one-sentence summary of the text's essence."
            },
            "sentiment": {
                "type": "STRING",
                "description": "The overall sentiment of the text."
            },
            "stats": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "value": { "type": "STRING" }
                    },
                    "required": ["name", "value"]
                },
                "description": "An array of statistical data about the text."
            },
            "interestingWords": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "An array of up to 5 interesting words from the text."
            }
        },
        "required": ["summary", "sentiment", "stats", "interestingWords"]
    })
}

pub fn build_request(text: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": build_prompt(text) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pull the model's JSON text out of a `generateContent` response body
pub fn parse_response(body: &str) -> AnalysisResult<Analysis> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let text: String = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    Ok(serde_json::from_str(&text)?)
}

/// Blocking Gemini client
pub struct GeminiClient {
    config: AnalysisConfig,
    http: Client,
}

impl GeminiClient {
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}

impl Analyzer for GeminiClient {
    fn analyze(&self, text: &str) -> AnalysisResult<Analysis> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AnalysisError::MissingApiKey)?;

        info!(model = %self.config.model, chars = text.len(), "requesting analysis");
        let response = self
            .http
            .post(self.config.url())
            .header("x-goog-api-key", api_key)
            .json(&build_request(text))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        debug!(status = status.as_u16(), bytes = body.len(), "analysis response");

        if !status.is_success() {
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}
