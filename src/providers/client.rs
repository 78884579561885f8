//! Chat-completions wire client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ProviderConfig, ProviderError};

/// Minimal chat-completions client for OpenAI-compatible endpoints.
///
/// One client wraps one [`ProviderConfig`] and a pooled `reqwest` client;
/// clone-free sharing goes through `Arc<ChatClient>` so concurrent workers
/// reuse connections.
pub struct ChatClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl ChatClient {
    /// Build a client for the given provider.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::HttpClient`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(ProviderError::HttpClient)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Request one completion for `prompt`.
    ///
    /// The prompt is sent as the user message under a fixed assistant system
    /// message; the first choice's content comes back verbatim.
    ///
    /// # Errors
    ///
    /// [`ProviderError::Transport`] for connection failures,
    /// [`ProviderError::Status`] for non-success responses (the body is
    /// preserved so quota and auth detail survive),
    /// [`ProviderError::Decode`] for unparseable payloads, and
    /// [`ProviderError::EmptyCompletion`] when the provider answers with no
    /// usable text.
    #[tracing::instrument(skip(self, prompt), fields(model = %self.config.model))]
    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a helpful assistant",
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let payload: ChatResponse = response.json().await.map_err(ProviderError::Decode)?;
        let content = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        tracing::debug!(chars = content.chars().count(), "completion received");
        Ok(content)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}
