//! Single-call personas: system prompt followed by the conversation.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::llm::{to_chat_messages, ChatMessage, SharedClient};
use crate::persona::types::PersonaLabel;
use crate::types::Message;

use super::PersonaHandler;

/// Handler for the swe, travel, and adhd personas
pub struct PromptHandler {
    label: PersonaLabel,
    system_prompt: &'static str,
    client: SharedClient,
}

impl PromptHandler {
    pub fn new(label: PersonaLabel, system_prompt: &'static str, client: SharedClient) -> Self {
        Self {
            label,
            system_prompt,
            client,
        }
    }
}

#[async_trait]
impl PersonaHandler for PromptHandler {
    async fn respond(&self, history: &[Message]) -> Result<String> {
        let mut messages = vec![ChatMessage::system(self.system_prompt)];
        messages.extend(to_chat_messages(history));

        debug!(persona = %self.label, messages = messages.len(), "Calling completion");
        self.client.complete(&messages).await
    }
}
