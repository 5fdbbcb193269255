//! Per-user chat session state

use crate::memory::ConversationMemory;
use crate::types::{ChatMessage, Role};

/// Greeting shown at the start of every RAG chat session
pub const WELCOME_MESSAGE: &str =
    "Hi, I'm a chatbot that can access your vector stores. What would you like to know?";

/// Message history and optional memory of one conversation.
///
/// Owned by the caller and passed by reference into pipeline calls; create one
/// per conversation and call [`ChatSession::clear`] on an explicit reset.
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    memory: Option<Box<dyn ConversationMemory>>,
    greeting: Option<String>,
}

impl ChatSession {
    /// Session without a greeting or memory
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            memory: None,
            greeting: None,
        }
    }

    /// Session that starts with (and resets to) an assistant greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        Self {
            messages: vec![ChatMessage::assistant(greeting.clone())],
            memory: None,
            greeting: Some(greeting),
        }
    }

    /// Attach conversation memory used by stateful pipeline calls
    pub fn with_memory(mut self, memory: Box<dyn ConversationMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages exchanged by the user and assistant, without the greeting
    pub fn turns(&self) -> impl Iterator<Item = &ChatMessage> {
        let skip = usize::from(self.greeting.is_some());
        self.messages
            .iter()
            .skip(skip)
            .filter(|m| matches!(m.role, Role::User | Role::Assistant))
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn memory_mut(&mut self) -> Option<&mut (dyn ConversationMemory + 'static)> {
        self.memory.as_deref_mut()
    }

    pub fn has_memory(&self) -> bool {
        self.memory.is_some()
    }

    /// Drop all messages and memory, keeping the greeting
    pub fn clear(&mut self) {
        self.messages.clear();
        if let Some(greeting) = &self.greeting {
            self.messages.push(ChatMessage::assistant(greeting.clone()));
        }
        if let Some(memory) = self.memory.as_deref_mut() {
            memory.clear();
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use async_trait::async_trait;

    #[derive(Default)]
    struct CountingMemory {
        turns: usize,
    }

    #[async_trait]
    impl ConversationMemory for CountingMemory {
        fn history(&self) -> String {
            format!("{} turns", self.turns)
        }

        async fn save_turn(&mut self, _input: &str, _output: &str) -> Result<()> {
            self.turns += 1;
            Ok(())
        }

        fn clear(&mut self) {
            self.turns = 0;
        }
    }

    #[tokio::test]
    async fn test_clear_resets_to_greeting_and_memory() {
        let mut session = ChatSession::with_greeting(WELCOME_MESSAGE)
            .with_memory(Box::new(CountingMemory::default()));
        session.push(ChatMessage::user("knee pain?"));
        session.push(ChatMessage::assistant("ice it"));
        session.memory_mut().unwrap().save_turn("knee pain?", "ice it").await.unwrap();

        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.turns().count(), 2);
        assert_eq!(session.memory_mut().unwrap().history(), "1 turns");

        session.clear();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].content, WELCOME_MESSAGE);
        assert_eq!(session.turns().count(), 0);
        assert_eq!(session.memory_mut().unwrap().history(), "0 turns");
    }

    #[test]
    fn test_plain_session_clears_to_empty() {
        let mut session = ChatSession::new();
        session.push(ChatMessage::user("hello"));
        assert!(!session.has_memory());
        session.clear();
        assert!(session.messages().is_empty());
    }
}
