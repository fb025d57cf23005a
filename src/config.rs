/// Configuration module for finassist.
///
/// Handles loading, validating, and providing default configuration values.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ── Default value functions ──────────────────────────────────────────

fn default_db_path() -> String {
    "./vectors.db".to_string()
}

fn default_top_k() -> usize {
    20
}

fn default_upsert_batch_size() -> usize {
    100
}

fn default_forecast_months() -> usize {
    3
}

fn default_model_name() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_embed_api_base() -> String {
    "http://127.0.0.1:8080/v1".to_string()
}

fn default_llm_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_answer_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_chat_model() -> String {
    "llama3-8b-8192".to_string()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_ocr_dpi() -> u32 {
    200
}

fn default_ocr_language() -> String {
    "eng".to_string()
}

fn default_ocr_workers() -> usize {
    4
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,

    #[serde(default = "default_forecast_months")]
    pub forecast_months: usize,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub ocr: OcrConfig,
}

/// Embedding model settings for the remote embedding service.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    #[serde(default = "default_embed_api_base")]
    pub api_base: String,
}

/// Chat-completion endpoint settings. The API key is read from the
/// `LLM_API_KEY` environment variable, never from the config file.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,

    #[serde(default = "default_answer_model")]
    pub answer_model: String,

    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_dpi")]
    pub dpi: u32,

    #[serde(default = "default_ocr_language")]
    pub language: String,

    /// Size of the worker pool used to OCR pages of one document.
    #[serde(default = "default_ocr_workers")]
    pub workers: usize,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            top_k: default_top_k(),
            upsert_batch_size: default_upsert_batch_size(),
            forecast_months: default_forecast_months(),
            model: ModelConfig::default(),
            llm: LlmConfig::default(),
            ocr: OcrConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            dimensions: default_dimensions(),
            api_base: default_embed_api_base(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_llm_api_base(),
            answer_model: default_answer_model(),
            chat_model: default_chat_model(),
            temperature: default_temperature(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            dpi: default_ocr_dpi(),
            language: default_ocr_language(),
            workers: default_ocr_workers(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`.
    /// If the file does not exist, returns a default config and optionally
    /// generates a template file.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "config.json"
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            // Generate template only for the default path
            if path == "config.json" {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.top_k > 0, "top_k must be positive");
        anyhow::ensure!(
            self.upsert_batch_size > 0,
            "upsert_batch_size must be positive"
        );
        anyhow::ensure!(
            self.forecast_months > 0,
            "forecast_months must be positive"
        );
        anyhow::ensure!(
            self.model.dimensions > 0,
            "model.dimensions must be positive"
        );
        anyhow::ensure!(self.ocr.dpi > 0, "ocr.dpi must be positive");
        anyhow::ensure!(self.ocr.workers > 0, "ocr.workers must be positive");
        anyhow::ensure!(
            (0.0..=2.0).contains(&self.llm.temperature),
            "llm.temperature must be within [0, 2]"
        );
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.top_k, 20);
        assert_eq!(config.upsert_batch_size, 100);
        assert_eq!(config.forecast_months, 3);
        assert_eq!(config.model.dimensions, 384);
        assert_eq!(config.model.name, "all-MiniLM-L6-v2");
        assert_eq!(config.llm.answer_model, "llama3-70b-8192");
        assert_eq!(config.llm.chat_model, "llama3-8b-8192");
        assert!((config.llm.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.ocr.dpi, 200);
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{"top_k": 10, "db_path": "./test.db"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.top_k, 10);
        assert_eq!(config.db_path, "./test.db");
        // Other fields should have defaults
        assert_eq!(config.upsert_batch_size, 100);
        assert_eq!(config.model.dimensions, 384);
    }

    #[test]
    fn test_validate_ok() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_top_k() {
        let mut config = Config::default();
        config.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_temperature() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.top_k, config.top_k);
        assert_eq!(parsed.db_path, config.db_path);
        assert_eq!(parsed.model.name, config.model.name);
        assert_eq!(parsed.llm.api_base, config.llm.api_base);
    }
}
