//! OpenAI chat completions and embeddings client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use casebot_core::{
    ChatMessage, ChatResponse, Embedder, Error, LLMProvider, Result, Role, ToolCall,
    ToolDefinition,
};

use crate::config::OpenAIConfig;

/// OpenAI (or compatible endpoint) client
pub struct OpenAIClient {
    config: OpenAIConfig,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: Role,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

fn function_kind() -> String {
    "function".to_string()
}

/// Outcome of a single HTTP attempt
enum Failure {
    Transient(Error),
    Fatal(Error),
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        let tool_calls = message.has_tool_calls().then(|| {
            message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.clone(),
                    kind: function_kind(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.encoded_arguments(),
                    },
                })
                .collect()
        });

        let content = if message.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(message.content.clone())
        };

        Self {
            role: message.role,
            content,
            tool_calls,
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

impl From<WireMessage> for ChatMessage {
    fn from(message: WireMessage) -> Self {
        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall::from_raw_arguments(call.id, call.function.name, &call.function.arguments))
            .collect();

        ChatMessage::assistant_with_tools(message.content.unwrap_or_default(), tool_calls)
    }
}

impl OpenAIClient {
    /// Create a new client from configuration
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env()?)
    }

    /// Set the chat model
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.config.chat_model = model_id.into();
        self
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// POST a JSON body, retrying transient failures with exponential backoff
    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let url = format!("{}/{}", self.config.api_base, path);
        let retry = &self.config.retry;
        let mut attempt = 1;

        loop {
            match self.send_once(&url, body).await {
                Ok(parsed) => return Ok(parsed),
                Err(Failure::Transient(err)) if attempt < retry.max_attempts => {
                    let delay = retry.backoff(attempt);
                    warn!(error = %err, attempt, ?delay, "transient provider error, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(Failure::Transient(err)) | Err(Failure::Fatal(err)) => return Err(err),
            }
        }
    }

    async fn send_once<B, R>(&self, url: &str, body: &B) -> std::result::Result<R, Failure>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Failure::Transient(Error::Timeout(e.to_string()))
                } else {
                    Failure::Transient(Error::Network(e.to_string()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let err = Error::Provider(format!(
                "OpenAI API request failed with status {}: {}",
                status, error_text
            ));
            return Err(if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                Failure::Transient(err)
            } else {
                Failure::Fatal(err)
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| Failure::Fatal(Error::Serialization(e.to_string())))
    }
}

#[async_trait]
impl LLMProvider for OpenAIClient {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<ChatResponse> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature: self.config.temperature,
            tools: tools
                .iter()
                .map(|tool| WireTool {
                    kind: "function",
                    function: WireFunction {
                        name: &tool.name,
                        description: &tool.description,
                        parameters: &tool.parameters,
                    },
                })
                .collect(),
        };

        debug!(
            model = %self.config.chat_model,
            messages = messages.len(),
            tools = tools.len(),
            "sending chat completion request"
        );

        let completion: ChatCompletion = self.post_json("chat/completions", &request).await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Provider("No choices in OpenAI response".to_string()))?;

        Ok(ChatResponse {
            message: choice.message.into(),
            finish_reason: choice.finish_reason,
            tokens_used: completion.usage.map(|u| u.total_tokens),
        })
    }

    fn model_id(&self) -> &str {
        &self.config.chat_model
    }
}

#[async_trait]
impl Embedder for OpenAIClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            input: text,
            dimensions: self.config.embedding_dimension,
        };

        let response: EmbeddingResponse = self.post_json("embeddings", &request).await?;
        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Provider("No embedding in OpenAI response".to_string()))?;

        if embedding.len() != self.config.embedding_dimension {
            return Err(Error::Provider(format!(
                "Expected a {}-dimension embedding, got {}",
                self.config.embedding_dimension,
                embedding.len()
            )));
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assistant_tool_call_message_serialization() {
        let message = ChatMessage::assistant_with_tools(
            "",
            vec![ToolCall::new("call_1", "vector_search", json!({"query": "knee pain"}))],
        );

        let wire = serde_json::to_value(WireMessage::from(&message)).unwrap();
        assert_eq!(
            wire,
            json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "vector_search", "arguments": "{\"query\":\"knee pain\"}"}
                }]
            })
        );
    }

    #[test]
    fn test_raw_string_arguments_sent_back_verbatim() {
        let message = ChatMessage::assistant_with_tools(
            "",
            vec![
                ToolCall::from_raw_arguments("call_2", "send_email", "not json"),
                ToolCall::from_raw_arguments("call_3", "vector_search", "\"knee\""),
            ],
        );
        let wire = WireMessage::from(&message);
        let calls = wire.tool_calls.unwrap();
        assert_eq!(calls[0].function.arguments, "not json");
        assert_eq!(calls[1].function.arguments, "\"knee\"");
    }

    #[test]
    fn test_tool_result_message_serialization() {
        let wire = serde_json::to_value(WireMessage::from(&ChatMessage::tool_result("call_1", "3 documents"))).unwrap();
        assert_eq!(
            wire,
            json!({"role": "tool", "content": "3 documents", "tool_call_id": "call_1"})
        );
    }

    #[test]
    fn test_response_message_parses_tool_calls() {
        let wire: WireMessage = serde_json::from_value(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_7",
                "type": "function",
                "function": {"name": "vector_search", "arguments": "{\"query\": \"trauma\"}"}
            }]
        }))
        .unwrap();

        let message = ChatMessage::from(wire);
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "");
        assert_eq!(message.tool_calls[0].arguments, json!({"query": "trauma"}));
    }
}
