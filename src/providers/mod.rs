//! OpenAI-compatible completion providers.
//!
//! [`ProviderConfig`] selects and tunes a chat-completions endpoint,
//! [`ChatClient`] speaks the wire protocol, and the worker types adapt the
//! client to the executor and reducer seams. Presets exist for OpenAI and
//! DeepSeek; any endpoint that serves the same API shape works through
//! [`ProviderConfig::with_api_base`].

mod client;
mod workers;

pub use client::ChatClient;
pub use workers::{ChunkSummaryWorker, SummaryMergeWorker};

use miette::Diagnostic;
use thiserror::Error;

use crate::config::DEFAULT_MAX_TOKENS;

/// Connection and sampling settings for one provider endpoint.
///
/// # Examples
///
/// ```
/// use sumweave::providers::ProviderConfig;
///
/// let config = ProviderConfig::openai("sk-test").with_model("gpt-4o");
/// assert_eq!(config.api_base, "https://api.openai.com/v1");
/// assert_eq!(config.model, "gpt-4o");
/// ```
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ProviderConfig {
    /// OpenAI preset: `gpt-4o-mini` at temperature 0.7.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// DeepSeek preset: `deepseek-chat` at temperature 1.0.
    pub fn deepseek(api_key: impl Into<String>) -> Self {
        Self {
            api_base: "https://api.deepseek.com/v1".to_string(),
            api_key: api_key.into(),
            model: "deepseek-chat".to_string(),
            temperature: 1.0,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Read provider selection and credentials from the environment.
    ///
    /// `SUMWEAVE_PROVIDER` picks the preset (`openai` by default); the
    /// matching `OPENAI_API_KEY` / `DEEPSEEK_API_KEY` must be set, and
    /// `OPENAI_API_BASE` / `DEEPSEEK_API_BASE` override the endpoint.
    /// A `.env` file in the working directory is loaded first when present.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingApiKey`] when the selected provider's
    /// key variable is unset and [`ProviderError::UnknownProvider`] for an
    /// unrecognized `SUMWEAVE_PROVIDER` value.
    pub fn from_env() -> Result<Self, ProviderError> {
        let _ = dotenvy::dotenv();

        let provider =
            std::env::var("SUMWEAVE_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        match provider.as_str() {
            "openai" => {
                let api_key = std::env::var("OPENAI_API_KEY")
                    .map_err(|_| ProviderError::MissingApiKey {
                        var: "OPENAI_API_KEY",
                    })?;
                let mut config = Self::openai(api_key);
                if let Ok(api_base) = std::env::var("OPENAI_API_BASE") {
                    config.api_base = api_base;
                }
                Ok(config)
            }
            "deepseek" => {
                let api_key = std::env::var("DEEPSEEK_API_KEY")
                    .map_err(|_| ProviderError::MissingApiKey {
                        var: "DEEPSEEK_API_KEY",
                    })?;
                let mut config = Self::deepseek(api_key);
                if let Ok(api_base) = std::env::var("DEEPSEEK_API_BASE") {
                    config.api_base = api_base;
                }
                Ok(config)
            }
            other => Err(ProviderError::UnknownProvider {
                name: other.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Errors from provider configuration or the completion endpoint.
#[derive(Debug, Error, Diagnostic)]
pub enum ProviderError {
    #[error("missing API key: set {var}")]
    #[diagnostic(
        code(sumweave::providers::missing_api_key),
        help("Export the variable or put it in a .env file next to the binary.")
    )]
    MissingApiKey { var: &'static str },

    #[error("unknown provider: {name}")]
    #[diagnostic(
        code(sumweave::providers::unknown_provider),
        help("Supported SUMWEAVE_PROVIDER values are \"openai\" and \"deepseek\".")
    )]
    UnknownProvider { name: String },

    #[error("failed to build HTTP client: {0}")]
    #[diagnostic(code(sumweave::providers::http_client))]
    HttpClient(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    #[diagnostic(code(sumweave::providers::transport))]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider returned status {status}: {body}")]
    #[diagnostic(
        code(sumweave::providers::status),
        help("Quota and auth failures surface here; the body carries the provider's detail.")
    )]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("completion was empty")]
    #[diagnostic(code(sumweave::providers::empty_completion))]
    EmptyCompletion,

    #[error("malformed completion payload: {0}")]
    #[diagnostic(code(sumweave::providers::decode))]
    Decode(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_preset_matches_published_defaults() {
        let config = ProviderConfig::openai("sk-test");
        assert_eq!(config.api_base, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 4096);
    }

    #[test]
    fn deepseek_preset_matches_published_defaults() {
        let config = ProviderConfig::deepseek("sk-test");
        assert_eq!(config.api_base, "https://api.deepseek.com/v1");
        assert_eq!(config.model, "deepseek-chat");
        assert_eq!(config.temperature, 1.0);
    }

    #[test]
    fn overrides_replace_preset_fields() {
        let config = ProviderConfig::openai("sk-test")
            .with_api_base("http://localhost:8080/v1")
            .with_model("local-model")
            .with_temperature(0.2)
            .with_max_tokens(512);
        assert_eq!(config.api_base, "http://localhost:8080/v1");
        assert_eq!(config.model, "local-model");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 512);
    }
}
