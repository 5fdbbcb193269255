//! OpenAI client configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use casebot_core::config::{env_or, request_timeout_from_env, validate_url, DEFAULT_REQUEST_TIMEOUT_SECS};
use casebot_core::{Error, RetryConfig, Result, EMBEDDING_DIMENSION};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Configuration for the OpenAI client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub api_base: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub temperature: f32,
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl OpenAIConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            Error::Configuration("OPENAI_API_KEY environment variable not found".to_string())
        })?;

        let api_base: String = env_or("OPENAI_API_BASE", DEFAULT_API_BASE.to_string())?;
        validate_url("OPENAI_API_BASE", &api_base)?;

        let max_attempts: u32 = env_or("LLM_MAX_RETRIES", RetryConfig::default().max_attempts)?;
        if max_attempts == 0 {
            return Err(Error::Configuration("LLM_MAX_RETRIES must be at least 1".to_string()));
        }

        Ok(Self {
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            chat_model: env_or("LLM_MODEL", DEFAULT_CHAT_MODEL.to_string())?,
            embedding_model: env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL.to_string())?,
            embedding_dimension: EMBEDDING_DIMENSION,
            temperature: env_or("LLM_TEMPERATURE", 0.0)?,
            timeout: request_timeout_from_env()?,
            retry: RetryConfig {
                max_attempts,
                ..RetryConfig::default()
            },
        })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: EMBEDDING_DIMENSION,
            temperature: 0.0,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry: RetryConfig::default(),
        }
    }

    /// Point the client at another OpenAI-compatible endpoint
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}
