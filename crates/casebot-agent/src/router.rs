//! Tool-calling loop
//!
//! The router alternates between asking the model for its next move and
//! executing the tools it requested:
//!
//! 1. Send the system prompt, the conversation and the tool definitions
//! 2. If the reply requests tools, run them in order and append each result
//! 3. Repeat until a reply carries no tool calls, or the step limit is hit

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use casebot_core::{ChatMessage, ChatSession, Error, LLMProvider, Result, ToolCall};

use crate::config::AgentConfig;
use crate::registry::ToolRegistry;

/// One visible event of a run, in the order it happened
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentStep {
    /// Text the model produced alongside or instead of tool calls
    ModelResponse { content: String },
    ToolCall { name: String, arguments: Value },
    ToolResult { name: String, output: String },
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct AgentRun {
    /// Content of the final, tool-free model reply
    pub answer: String,
    /// Transcript including the input history, without the system prompt
    pub messages: Vec<ChatMessage>,
    pub steps: Vec<AgentStep>,
    pub model_calls: usize,
}

enum RouterState {
    AwaitingModel,
    ExecutingTools(Vec<ToolCall>),
}

/// Drives the model through tool calls until it produces an answer
pub struct ToolRouter<L: LLMProvider + ?Sized> {
    llm: Arc<L>,
    registry: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl<L: LLMProvider + ?Sized> ToolRouter<L> {
    pub fn new(llm: Arc<L>, registry: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        Self {
            llm,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn request(&self, messages: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut request = Vec::with_capacity(messages.len() + 1);
        request.push(ChatMessage::system(self.config.system_prompt.clone()));
        request.extend_from_slice(messages);
        request
    }

    /// Run the loop over an existing conversation ending in a user message
    pub async fn run(&self, history: &[ChatMessage]) -> Result<AgentRun> {
        let definitions = self.registry.get_tool_definitions();
        let mut messages = history.to_vec();
        let mut steps = Vec::new();
        let mut model_calls = 0;
        let mut state = RouterState::AwaitingModel;

        loop {
            state = match state {
                RouterState::AwaitingModel => {
                    if model_calls >= self.config.max_steps {
                        return Err(Error::StepLimitExceeded(self.config.max_steps));
                    }
                    model_calls += 1;

                    let response = self.llm.chat(&self.request(&messages), &definitions).await?;
                    let message = response.message;
                    debug!(
                        step = model_calls,
                        tool_calls = message.tool_calls.len(),
                        "model responded"
                    );

                    if !message.content.trim().is_empty() {
                        steps.push(AgentStep::ModelResponse {
                            content: message.content.clone(),
                        });
                    }

                    if message.has_tool_calls() {
                        let calls = message.tool_calls.clone();
                        messages.push(message);
                        RouterState::ExecutingTools(calls)
                    } else {
                        let answer = message.content.clone();
                        messages.push(message);
                        info!(model_calls, "agent finished");
                        return Ok(AgentRun {
                            answer,
                            messages,
                            steps,
                            model_calls,
                        });
                    }
                }
                RouterState::ExecutingTools(calls) => {
                    for call in calls {
                        steps.push(AgentStep::ToolCall {
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                        });

                        let output = self.registry.execute(&call.name, call.arguments).await;
                        debug!(tool = %call.name, chars = output.len(), "tool finished");

                        steps.push(AgentStep::ToolResult {
                            name: call.name,
                            output: output.clone(),
                        });
                        messages.push(ChatMessage::tool_result(call.id, output));
                    }
                    RouterState::AwaitingModel
                }
            };
        }
    }

    /// Run one user turn of a chat session.
    ///
    /// Only the user input and the final answer are kept in the session; tool
    /// traffic lives in the returned [`AgentRun`]. On failure the session gets
    /// an apology message and the error is returned.
    pub async fn run_in_session(&self, input: &str, session: &mut ChatSession) -> Result<AgentRun> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidInput("message must not be empty".to_string()));
        }

        let mut history: Vec<ChatMessage> = session.turns().cloned().collect();
        history.push(ChatMessage::user(input));
        session.push(ChatMessage::user(input));

        match self.run(&history).await {
            Ok(run) => {
                session.push(ChatMessage::assistant(run.answer.clone()));
                Ok(run)
            }
            Err(e) => {
                session.push(ChatMessage::assistant(format!(
                    "Sorry, I encountered an error: {}",
                    e
                )));
                Err(e)
            }
        }
    }
}
