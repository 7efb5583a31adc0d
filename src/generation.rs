//! Chat model trait, the OpenAI chat completions client, and answer
//! generation from an assembled context.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{QaError, Result};

/// The OpenAI chat completions API endpoint.
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The exact string the model is instructed to emit when the context does not
/// contain the answer.
pub const NO_ANSWER_SENTINEL: &str = "Answer not available in the provided context.";

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Message role: `system` or `user`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Sampling parameters for a chat completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatParams {
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum output tokens.
    pub max_output_tokens: u32,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self { temperature: 0.2, max_output_tokens: 800 }
    }
}

/// A hosted chat model behind a unified async interface.
///
/// One non-streaming, synchronous-in-spirit request per call; no retry or
/// backoff anywhere.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send messages to the model and return the generated text, trimmed.
    async fn complete(&self, messages: &[ChatMessage], params: &ChatParams) -> Result<String>;
}

/// Build the fixed system + user message pair for context-bound answering.
///
/// The system message instructs the model to answer strictly from the
/// context and to emit [`NO_ANSWER_SENTINEL`] verbatim otherwise.
pub fn qa_messages(context: &str, question: &str) -> Vec<ChatMessage> {
    let system = format!(
        "You are a helpful assistant that answers questions strictly using the provided \
         CONTEXT. If the answer is not contained in the context, reply exactly: \
         \"{NO_ANSWER_SENTINEL}\""
    );
    let user = format!(
        "CONTEXT:\n{context}\n\nQUESTION:\n{question}\n\n\
         Answer concisely and include relevant details from the context."
    );
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Answer a question strictly from the given context.
pub async fn answer(
    chat: &dyn ChatModel,
    context: &str,
    question: &str,
    params: &ChatParams,
) -> Result<String> {
    let messages = qa_messages(context, question);
    let text = chat.complete(&messages, params).await?;
    Ok(text.trim().to_string())
}

/// A [`ChatModel`] backed by the OpenAI chat completions API.
pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiChat {
    /// Create a new client with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(QaError::Chat {
                provider: "OpenAI".into(),
                message: "API key must not be empty".into(),
            });
        }
        Ok(Self { client: reqwest::Client::new(), api_key, model: model.into() })
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    n: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, messages: &[ChatMessage], params: &ChatParams) -> Result<String> {
        debug!(
            provider = "OpenAI",
            model = %self.model,
            temperature = params.temperature,
            max_tokens = params.max_output_tokens,
            "chat completion request"
        );

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_output_tokens,
            n: 1,
        };

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "OpenAI", error = %e, "chat request failed");
                QaError::Chat { provider: "OpenAI".into(), message: format!("request failed: {e}") }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "OpenAI", %status, "chat API error");
            return Err(QaError::Chat {
                provider: "OpenAI".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(provider = "OpenAI", error = %e, "failed to parse chat response");
            QaError::Chat {
                provider: "OpenAI".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| QaError::Chat {
                provider: "OpenAI".into(),
                message: "API returned no choices".into(),
            })?;

        Ok(text.trim().to_string())
    }
}
