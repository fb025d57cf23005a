//! Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
use serde::Deserialize;
use thiserror::Error;

use crate::config::LlmConfig;

/// Environment variable holding the chat endpoint API key.
pub const LLM_API_KEY_VAR: &str = "LLM_API_KEY";

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("missing API key: set {LLM_API_KEY_VAR}")]
    MissingApiKey,

    #[error("chat endpoint returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A model that turns a system prompt plus user message into a completion.
pub trait ChatModel: Send + Sync {
    fn complete(&self, model: &str, system: &str, user: &str) -> Result<String, LlmError>;
}

pub struct ChatClient {
    client: reqwest::blocking::Client,
    api_base: String,
    api_key: String,
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl ChatClient {
    #[must_use]
    pub fn new(llm: &LlmConfig, api_key: String) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_base: llm.api_base.trim_end_matches('/').to_string(),
            api_key,
            temperature: llm.temperature,
        }
    }

    /// Construct from config, reading the API key from the environment.
    pub fn from_env(llm: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(LLM_API_KEY_VAR).map_err(|_| LlmError::MissingApiKey)?;
        Ok(Self::new(llm, api_key))
    }
}

impl ChatModel for ChatClient {
    fn complete(&self, model: &str, system: &str, user: &str) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": self.temperature,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Malformed("response contained no choices".to_string()))
    }
}
