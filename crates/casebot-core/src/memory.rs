//! Conversation memory trait

use async_trait::async_trait;

use crate::Result;

/// Running record of earlier turns, rendered back into later prompts
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// Text to show the model as the conversation so far. Empty when nothing
    /// has been said yet.
    fn history(&self) -> String;

    /// Record a completed turn
    async fn save_turn(&mut self, input: &str, output: &str) -> Result<()>;

    /// Forget everything
    fn clear(&mut self);
}
