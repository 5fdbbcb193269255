//! Scripted doubles for the provider and store traits, for use in tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::llm::{ChatResponse, LLMProvider};
use crate::types::{ChatMessage, ToolCall, ToolDefinition};
use crate::vector_store::{SearchConfig, SearchResult, VectorDocument, VectorStore};
use crate::{Error, Result};

/// One request seen by [`ScriptedLLM`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

enum Script {
    Reply(ChatMessage),
    Fail(String),
}

/// LLM that replays queued responses in order and records every request.
///
/// Once the queue is exhausted it keeps answering with the fallback text,
/// which defaults to echoing the last user message.
pub struct ScriptedLLM {
    script: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<RecordedRequest>>,
    fallback: Option<String>,
}

impl ScriptedLLM {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            fallback: None,
        }
    }

    /// Always answer with the same text
    pub fn answering(text: &str) -> Self {
        Self {
            fallback: Some(text.to_string()),
            ..Self::new()
        }
    }

    /// Queue a plain assistant reply
    pub fn then_reply(self, text: &str) -> Self {
        self.push(Script::Reply(ChatMessage::assistant(text)))
    }

    /// Queue a reply requesting tools
    pub fn then_call_tools(self, tool_calls: Vec<ToolCall>) -> Self {
        self.push(Script::Reply(ChatMessage::assistant_with_tools("", tool_calls)))
    }

    /// Queue a provider failure
    pub fn then_fail(self, reason: &str) -> Self {
        self.push(Script::Fail(reason.to_string()))
    }

    fn push(self, step: Script) -> Self {
        self.script.lock().unwrap().push_back(step);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for ScriptedLLM {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMProvider for ScriptedLLM {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            tools: tools.to_vec(),
        });

        let next = self.script.lock().unwrap().pop_front();
        let message = match next {
            Some(Script::Reply(message)) => message,
            Some(Script::Fail(reason)) => return Err(Error::Provider(reason)),
            None => {
                let text = self.fallback.clone().unwrap_or_else(|| {
                    messages
                        .iter()
                        .rev()
                        .find(|m| m.role == crate::types::Role::User)
                        .map(|m| format!("echo: {}", m.content))
                        .unwrap_or_default()
                });
                ChatMessage::assistant(text)
            }
        };

        let finish_reason = if message.has_tool_calls() { "tool_calls" } else { "stop" };
        Ok(ChatResponse {
            message,
            finish_reason: Some(finish_reason.to_string()),
            tokens_used: None,
        })
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

/// Vector store returning a fixed ranking (or a fixed failure) for any query
pub struct StaticStore {
    documents: Vec<VectorDocument>,
    failure: Option<String>,
    searches: Mutex<Vec<String>>,
}

impl StaticStore {
    /// Documents are returned in the given order, truncated to `top_k`
    pub fn with_documents(documents: Vec<(&str, f32)>) -> Self {
        let documents = documents
            .into_iter()
            .enumerate()
            .map(|(i, (content, score))| VectorDocument {
                score: Some(score),
                ..VectorDocument::new(format!("doc_{}", i), content)
            })
            .collect();
        Self {
            documents,
            failure: None,
            searches: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_documents(Vec::new())
    }

    /// Every search fails with a retrieval error
    pub fn unreachable(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::empty()
        }
    }

    /// Queries searched so far
    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for StaticStore {
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn store(&self, document: VectorDocument) -> Result<String> {
        Ok(document.id)
    }

    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        Ok(documents.into_iter().map(|d| d.id).collect())
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<SearchResult> {
        self.searches.lock().unwrap().push(query.to_string());
        if let Some(reason) = &self.failure {
            return Err(Error::Retrieval(reason.clone()));
        }
        let documents: Vec<VectorDocument> =
            self.documents.iter().take(config.top_k).cloned().collect();
        let total = documents.len();
        Ok(SearchResult { documents, total })
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.len())
    }

    fn collection_name(&self) -> &str {
        "static"
    }

    fn is_connected(&self) -> bool {
        self.failure.is_none()
    }
}
