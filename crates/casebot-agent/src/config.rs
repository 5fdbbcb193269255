//! Agent configuration

use std::time::Duration;

use casebot_core::config::{env_opt, env_or, request_timeout_from_env, validate_url, DEFAULT_REQUEST_TIMEOUT_SECS};
use casebot_core::{Error, Result};

pub const DEFAULT_MAX_STEPS: usize = 8;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a healthcare assistant with access to a \
database of medical case reports and an email tool. Search the case reports with vector_search \
before answering medical questions and base your answer on what you find. Always confirm the \
recipient address with the user before calling send_email. Use earlier messages in the \
conversation for context.";

/// Settings for the tool-calling agent and its built-in tools
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model invocations allowed per run
    pub max_steps: usize,
    pub system_prompt: String,
    /// Notification endpoint used by `send_email`
    pub email_api_url: Option<String>,
    pub timeout: Duration,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let max_steps: usize = env_or("AGENT_MAX_STEPS", DEFAULT_MAX_STEPS)?;
        if max_steps == 0 {
            return Err(Error::Configuration("AGENT_MAX_STEPS must be at least 1".to_string()));
        }

        let email_api_url = env_opt("EMAIL_API_URL");
        if let Some(url) = &email_api_url {
            validate_url("EMAIL_API_URL", url)?;
        }

        Ok(Self {
            max_steps,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            email_api_url,
            timeout: request_timeout_from_env()?,
        })
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn with_email_api_url(mut self, url: impl Into<String>) -> Self {
        self.email_api_url = Some(url.into());
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            email_api_url: None,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
