//! Completion client trait definitions
//!
//! Every component that talks to a language model receives a [`SharedClient`]
//! at construction time, so tests can substitute a scripted client.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

use super::types::{ChatMessage, Completion, ToolSpec};

/// A chat-completion service
///
/// Calls are awaited one at a time by the turn engine. Retries and timeouts
/// are the implementation's business; an `Err` means the call is over.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Client name for logs (e.g. "openai", "mock")
    fn name(&self) -> &'static str;

    /// Complete a conversation, offering the given tools to the model
    async fn complete_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<Completion>;

    /// Complete a conversation and return only the text
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        Ok(self.complete_with_tools(messages, &[]).await?.content)
    }
}

/// Type alias for a shared client reference
pub type SharedClient = Arc<dyn CompletionClient>;
