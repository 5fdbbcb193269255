//! Email notification tool

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{info, warn};

use casebot_core::{Error, Result, Tool};

use crate::config::AgentConfig;

pub const DEFAULT_SUBJECT: &str = "Message from Vector Search App";

/// Body posted to the notification service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailPayload {
    pub to: String,
    pub subject: String,
    pub message: String,
    pub html: String,
}

impl EmailPayload {
    /// Interpret tool arguments.
    ///
    /// Accepts the structured object, an object wrapping a JSON string under
    /// `input_data`, or a bare string. Anything that does not parse as a JSON
    /// object becomes the message body.
    pub fn from_args(args: &Value) -> Self {
        let fields = match args {
            Value::Object(map) => match map.get("input_data") {
                Some(Value::String(raw)) => Self::parse_raw(raw),
                _ => map.clone(),
            },
            Value::String(raw) => Self::parse_raw(raw),
            other => Self::message_only(other.to_string()),
        };

        Self {
            to: Self::field(&fields, "to").unwrap_or_default(),
            subject: Self::field(&fields, "subject").unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            message: Self::field(&fields, "message").unwrap_or_default(),
            html: Self::field(&fields, "html").unwrap_or_default(),
        }
    }

    fn parse_raw(raw: &str) -> Map<String, Value> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            _ => Self::message_only(raw.to_string()),
        }
    }

    fn message_only(message: String) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("message".to_string(), Value::String(message));
        map
    }

    fn field(fields: &Map<String, Value>, key: &str) -> Option<String> {
        match fields.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Sends an email through an HTTP notification endpoint
pub struct SendEmailTool {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl SendEmailTool {
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build email client: {}", e)))?;
        Ok(Self { endpoint, client })
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        Self::new(config.email_api_url.clone(), config.timeout)
    }
}

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        "send_email"
    }

    fn description(&self) -> &str {
        "Send an email notification. Arguments: to, subject, message, html (optional). \
         The user must provide the recipient email address."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "to": {"type": "string", "description": "Recipient email address"},
                "subject": {"type": "string", "description": "Email subject"},
                "message": {"type": "string", "description": "Plain text body"},
                "html": {"type": "string", "description": "Optional HTML body"}
            },
            "required": ["to", "message"]
        })
    }

    async fn execute(&self, args: Value) -> String {
        let payload = EmailPayload::from_args(&args);
        if payload.to.trim().is_empty() {
            return "Error sending email: recipient is required".to_string();
        }

        let Some(endpoint) = &self.endpoint else {
            return "Error sending email: no email endpoint configured".to_string();
        };

        match self.client.post(endpoint).json(&payload).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                info!(to = %payload.to, "email sent");
                format!(
                    "Email sent successfully to {} with subject: '{}'",
                    payload.to, payload.subject
                )
            }
            Ok(response) => {
                warn!(status = %response.status(), "email endpoint rejected request");
                format!(
                    "Failed to send email. Status code: {}",
                    response.status().as_u16()
                )
            }
            Err(e) => format!("Error sending email: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_args() {
        let payload = EmailPayload::from_args(&json!({
            "to": "dr.lee@example.com",
            "message": "Three knee pain cases found."
        }));

        assert_eq!(
            payload,
            EmailPayload {
                to: "dr.lee@example.com".to_string(),
                subject: DEFAULT_SUBJECT.to_string(),
                message: "Three knee pain cases found.".to_string(),
                html: String::new(),
            }
        );
    }

    #[test]
    fn test_input_data_wrapper() {
        let payload = EmailPayload::from_args(&json!({
            "input_data": "{\"to\": \"a@b.org\", \"subject\": \"Findings\", \"message\": \"hi\"}"
        }));

        assert_eq!(payload.to, "a@b.org");
        assert_eq!(payload.subject, "Findings");
        assert_eq!(payload.message, "hi");
    }

    #[test]
    fn test_unparseable_string_becomes_message() {
        let payload = EmailPayload::from_args(&json!("please email me the summary"));

        assert_eq!(payload.to, "");
        assert_eq!(payload.message, "please email me the summary");
        assert_eq!(payload.subject, DEFAULT_SUBJECT);
    }

    #[test]
    fn test_json_string_with_non_object_becomes_message() {
        let payload = EmailPayload::from_args(&json!({"input_data": "[1, 2]"}));
        assert_eq!(payload.message, "[1, 2]");
    }

    #[tokio::test]
    async fn test_missing_endpoint() {
        let tool = SendEmailTool::new(None, Duration::from_secs(1)).unwrap();
        let output = tool.execute(json!({"to": "a@b.org", "message": "hi"})).await;
        assert_eq!(output, "Error sending email: no email endpoint configured");
    }
}
