/// Blocking client for an OpenAI-compatible `/embeddings` endpoint.
use serde::Deserialize;

use super::{Embedder, EmbedderError};
use crate::config::ModelConfig;

/// Environment variable holding the embedding service API key. Optional;
/// self-hosted endpoints often run without auth.
pub const EMBED_API_KEY_VAR: &str = "EMBED_API_KEY";

pub struct RemoteEmbedder {
    client: reqwest::blocking::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

impl RemoteEmbedder {
    #[must_use]
    pub fn new(model: &ModelConfig, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_base: model.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: model.name.clone(),
            dimensions: model.dimensions,
        }
    }

    /// Construct from config, reading the API key from the environment.
    #[must_use]
    pub fn from_env(model: &ModelConfig) -> Self {
        Self::new(model, std::env::var(EMBED_API_KEY_VAR).ok())
    }
}

impl Embedder for RemoteEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let mut vectors = self.embed_batch(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| EmbedderError::CountMismatch(0, 1))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let mut request = self
            .client
            .post(format!("{}/embeddings", self.api_base))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .map_err(|e| EmbedderError::InferenceFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbedderError::InferenceFailed(format!(
                "embedding endpoint returned {status}"
            )));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| EmbedderError::InferenceFailed(e.to_string()))?;

        if parsed.data.len() != texts.len() {
            return Err(EmbedderError::CountMismatch(parsed.data.len(), texts.len()));
        }

        // The service may return items out of order
        parsed.data.sort_by_key(|item| item.index);

        let mut vectors = Vec::with_capacity(parsed.data.len());
        for item in parsed.data {
            if item.embedding.len() != self.dimensions {
                return Err(EmbedderError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: item.embedding.len(),
                });
            }
            vectors.push(item.embedding);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
