//! HTTP text generator for delegated mapping synthesis
//!
//! Supports two API formats:
//! - **OpenAI-compatible** (default): OpenAI, Ollama, vLLM, LiteLLM and friends
//! - **Anthropic**: messages API with `x-api-key` auth
//!
//! Set `CASE_DW_LLM_PROVIDER=anthropic` to switch provider.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::synthesizer::{DEFAULT_MODEL, GenerationError, TextGenerator};

/// Environment variable selecting the provider
pub const ENV_LLM_PROVIDER: &str = "CASE_DW_LLM_PROVIDER";

/// Environment variable overriding the model
pub const ENV_LLM_MODEL: &str = "CASE_DW_LLM_MODEL";

/// Environment variable overriding the endpoint URL
pub const ENV_LLM_API_URL: &str = "CASE_DW_LLM_API_URL";

/// Environment variable overriding the request timeout, in seconds
pub const ENV_LLM_TIMEOUT_SECS: &str = "CASE_DW_LLM_TIMEOUT_SECS";

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Supported API providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAI,
    Anthropic,
}

/// LLM connection settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub api_url: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub provider: LlmProvider,
}

impl LlmConfig {
    /// Load config from environment. Returns `None` if no API key is set.
    ///
    /// - `anthropic` provider reads `ANTHROPIC_API_KEY`
    /// - otherwise `OPENAI_API_KEY`; the model comes from `OPENAI_MODEL`
    ///   or `CASE_DW_LLM_MODEL`
    pub fn from_env() -> Option<Self> {
        let provider_str = std::env::var(ENV_LLM_PROVIDER)
            .unwrap_or_default()
            .to_lowercase();

        let (provider, api_key, default_model, default_url) = match provider_str.as_str() {
            "anthropic" => (
                LlmProvider::Anthropic,
                std::env::var("ANTHROPIC_API_KEY").ok()?,
                "claude-sonnet-4-20250514".to_string(),
                "https://api.anthropic.com/v1/messages".to_string(),
            ),
            _ => (
                LlmProvider::OpenAI,
                std::env::var("OPENAI_API_KEY").ok()?,
                std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
                "https://api.openai.com/v1/chat/completions".to_string(),
            ),
        };

        if api_key.trim().is_empty() {
            return None;
        }

        Some(Self {
            api_key,
            model: std::env::var(ENV_LLM_MODEL).unwrap_or(default_model),
            api_url: std::env::var(ENV_LLM_API_URL).unwrap_or(default_url),
            max_tokens: 2048,
            timeout: Duration::from_secs(
                std::env::var(ENV_LLM_TIMEOUT_SECS)
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            provider,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: Option<String>,
}

/// Blocking HTTP generator with a bounded timeout
pub struct HttpTextGenerator {
    client: Client,
    config: LlmConfig,
}

impl HttpTextGenerator {
    pub fn new(config: LlmConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn send<T: Serialize>(
        &self,
        request: &T,
        auth: (&str, String),
    ) -> Result<reqwest::blocking::Response, GenerationError> {
        let mut builder = self
            .client
            .post(&self.config.api_url)
            .header(auth.0, auth.1)
            .header("content-type", "application/json");
        if self.config.provider == LlmProvider::Anthropic {
            builder = builder.header("anthropic-version", "2023-06-01");
        }
        let response = builder.json(request).send().map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn call_openai(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let request = OpenAIRequest {
            model,
            max_tokens: self.config.max_tokens,
            temperature: 0.1,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };
        let response = self.send(
            &request,
            ("authorization", format!("Bearer {}", self.config.api_key)),
        )?;
        let msg: OpenAIResponse = response
            .json()
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        Ok(msg
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect::<Vec<_>>()
            .join(""))
    }

    fn call_anthropic(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let request = AnthropicRequest {
            model,
            max_tokens: self.config.max_tokens,
            temperature: 0.1,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };
        let response = self.send(&request, ("x-api-key", self.config.api_key.clone()))?;
        let msg: AnthropicResponse = response
            .json()
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        Ok(msg
            .content
            .into_iter()
            .filter_map(|b| b.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}

impl TextGenerator for HttpTextGenerator {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let text = match self.config.provider {
            LlmProvider::OpenAI => self.call_openai(model, prompt)?,
            LlmProvider::Anthropic => self.call_anthropic(model, prompt)?,
        };
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> LlmConfig {
        LlmConfig {
            api_key: "sk-test".to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_url: url.to_string(),
            max_tokens: 16,
            timeout: Duration::from_millis(500),
            provider: LlmProvider::OpenAI,
        }
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        // Port 9 (discard) on localhost is closed on test machines
        let generator =
            HttpTextGenerator::new(config("http://127.0.0.1:9/v1/chat/completions")).unwrap();
        assert!(generator.generate(DEFAULT_MODEL, "hi").is_err());
    }

    #[test]
    fn test_openai_request_shape() {
        let request = OpenAIRequest {
            model: "m",
            max_tokens: 8,
            temperature: 0.1,
            messages: vec![ChatMessage {
                role: "user".into(),
                content: "p".into(),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
