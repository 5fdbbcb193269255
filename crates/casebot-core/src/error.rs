//! Error types for casebot

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the casebot system
#[derive(Error, Debug)]
pub enum Error {
    /// Vector store unreachable or failing. The RAG pipeline degrades on this
    /// one instead of propagating it.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("LLM provider error: {0}")]
    Provider(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Agent did not finish within {0} model steps")]
    StepLimitExceeded(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Whether the error came from talking to the language model, as opposed
    /// to bad input or local configuration.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Error::Provider(_) | Error::Network(_) | Error::Timeout(_) | Error::Serialization(_)
        )
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::Provider("rate limited".to_string()).to_string(),
            "LLM provider error: rate limited"
        );
        assert_eq!(
            Error::StepLimitExceeded(8).to_string(),
            "Agent did not finish within 8 model steps"
        );
    }

    #[test]
    fn test_provider_failure_classification() {
        assert!(Error::Provider("x".into()).is_provider_failure());
        assert!(Error::Timeout("x".into()).is_provider_failure());
        assert!(!Error::InvalidInput("x".into()).is_provider_failure());
        assert!(!Error::Retrieval("x".into()).is_provider_failure());
    }
}
