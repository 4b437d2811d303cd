//! Conversation turn entry point.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::Result;
use crate::types::{ConversationHistory, Message};

use super::router::PersonaRouter;
use super::threads::ThreadStore;

/// Advances conversations by exactly one assistant message per turn
pub struct ConversationTurnController {
    router: PersonaRouter,
    threads: Arc<dyn ThreadStore>,
}

impl ConversationTurnController {
    pub fn new(router: PersonaRouter, threads: Arc<dyn ThreadStore>) -> Self {
        Self { router, threads }
    }

    /// Append the assistant reply for the latest user message
    pub async fn advance(&self, mut history: ConversationHistory) -> ConversationHistory {
        let reply = self.router.route(&history).await;
        history.push(Message::assistant(reply));
        history
    }

    /// Add `utterance` to a stored thread, answer it, and store the result.
    /// Returns the reply text.
    #[instrument(skip(self, utterance))]
    pub async fn run_turn(&self, thread_id: &str, utterance: &str) -> Result<String> {
        let mut history = self.threads.get(thread_id).await?;
        history.push(Message::user(utterance));

        let history = self.advance(history).await;
        self.threads.put(thread_id, &history).await?;
        info!(messages = history.len(), "Turn complete");

        let reply = history
            .last()
            .map(|message| message.content.clone())
            .unwrap_or_default();
        Ok(reply)
    }
}
