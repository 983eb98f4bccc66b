//! Reasoning service client.
//!
//! All language-model calls go through [`ReasoningService`]. The production
//! implementation talks to the OpenAI Chat Completions API and asks for a
//! JSON object response; turning that text into a report is the
//! normalizer's job, not the client's.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Sampling temperature for analysis calls. Kept low so repeated analyses
/// of the same site stay close to each other.
pub const ANALYSIS_TEMPERATURE: f32 = 0.3;

/// Failures of a single reasoning call.
#[derive(Debug, thiserror::Error)]
pub enum ReasoningError {
    /// No API key was configured.
    #[error("reasoning service is not configured")]
    NotConfigured,

    /// Transport failure, including client-side timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the body.
        message: String,
    },

    /// The service answered without any content.
    #[error("reasoning service returned empty content")]
    EmptyContent,

    /// The call did not finish within the allowed time.
    #[error("reasoning call timed out after {0:?}")]
    Timeout(Duration),
}

/// A structured-completion capability.
#[async_trait]
pub trait ReasoningService: Send + Sync + std::fmt::Debug {
    /// Sends one system + user prompt pair and returns the raw text of the
    /// answer, which the prompt asks to be a JSON object.
    ///
    /// # Errors
    ///
    /// Returns a [`ReasoningError`] on any transport or API failure.
    async fn complete_json(&self, system: &str, prompt: &str) -> Result<String, ReasoningError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenAI Chat Completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.model)
            .field("configured", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Creates a client. Without an API key every call fails with
    /// [`ReasoningError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns [`ReasoningError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ReasoningError> {
        Ok(Self {
            client: super::http_client(timeout)?,
            api_key,
            model: model.into(),
        })
    }
}

#[async_trait]
impl ReasoningService for OpenAiClient {
    async fn complete_json(&self, system: &str, prompt: &str) -> Result<String, ReasoningError> {
        let api_key = self.api_key.as_deref().ok_or(ReasoningError::NotConfigured)?;

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: ANALYSIS_TEMPERATURE,
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ReasoningError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ReasoningError::EmptyContent)?;

        tracing::debug!(model = %self.model, bytes = content.len(), "reasoning call succeeded");
        Ok(content)
    }
}
