//! Conversation memory implementations

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

use casebot_core::{ConversationMemory, LLMProvider, Result};

/// Turns kept by [`BufferMemory::default`]
pub const DEFAULT_BUFFER_TURNS: usize = 10;

fn render_turn(input: &str, output: &str) -> String {
    format!("Human: {}\nAI: {}", input, output)
}

/// Keeps the last `window` turns verbatim
#[derive(Debug, Clone)]
pub struct BufferMemory {
    turns: VecDeque<(String, String)>,
    window: usize,
}

impl BufferMemory {
    pub fn new(window: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            window: window.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for BufferMemory {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_TURNS)
    }
}

#[async_trait]
impl ConversationMemory for BufferMemory {
    fn history(&self) -> String {
        self.turns
            .iter()
            .map(|(input, output)| render_turn(input, output))
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn save_turn(&mut self, input: &str, output: &str) -> Result<()> {
        self.turns.push_back((input.to_string(), output.to_string()));
        while self.turns.len() > self.window {
            self.turns.pop_front();
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.turns.clear();
    }
}

/// Keeps a running summary that the model extends after every turn
pub struct SummaryMemory<L: LLMProvider + ?Sized> {
    llm: Arc<L>,
    summary: String,
}

impl<L: LLMProvider + ?Sized> SummaryMemory<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self {
            llm,
            summary: String::new(),
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    fn summary_prompt(&self, new_lines: &str) -> String {
        let current = if self.summary.is_empty() {
            "(empty)"
        } else {
            self.summary.as_str()
        };
        format!(
            "Progressively summarize the lines of conversation provided, adding onto the \
             previous summary and returning a new summary. Keep names, symptoms and any \
             email addresses mentioned.\n\n\
             Current summary:\n{}\n\n\
             New lines of conversation:\n{}\n\n\
             New summary:",
            current, new_lines
        )
    }
}

#[async_trait]
impl<L: LLMProvider + ?Sized> ConversationMemory for SummaryMemory<L> {
    fn history(&self) -> String {
        self.summary.clone()
    }

    async fn save_turn(&mut self, input: &str, output: &str) -> Result<()> {
        let prompt = self.summary_prompt(&render_turn(input, output));
        match self.llm.generate(&prompt).await {
            Ok(result) => {
                self.summary = result.text.trim().to_string();
                debug!(chars = self.summary.len(), "conversation summary updated");
            }
            Err(e) => warn!(error = %e, "summary update failed, keeping previous summary"),
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.summary.clear();
    }
}
