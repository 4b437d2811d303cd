//! One turn: classify, dispatch to a persona, contain handler failures.

use tracing::{error, info, warn};

use crate::persona::{PersonaClassifier, PersonaHandlers};
use crate::types::{last_user_message, Message};

/// Reply when the history holds no user message.
pub const NO_MESSAGE_REPLY: &str = "I didn't receive any message. Could you try again?";

/// Reply when the selected persona fails.
pub const APOLOGY_REPLY: &str =
    "I'm having trouble processing your request. Could you please try again?";

/// Routes turns to persona handlers
pub struct PersonaRouter {
    classifier: PersonaClassifier,
    handlers: PersonaHandlers,
}

impl PersonaRouter {
    pub fn new(classifier: PersonaClassifier, handlers: PersonaHandlers) -> Self {
        Self {
            classifier,
            handlers,
        }
    }

    /// Produce the reply for the latest user message. Never fails.
    pub async fn route(&self, history: &[Message]) -> String {
        if last_user_message(history).is_none() {
            warn!("No user message found");
            return NO_MESSAGE_REPLY.to_string();
        }

        let classification = self.classifier.classify(history).await;
        let persona = classification.label;
        info!(persona = %persona, provenance = %classification.provenance, "Using persona");

        match self.handlers.get(persona).respond(history).await {
            Ok(text) => text,
            Err(e) => {
                error!(persona = %persona, error = %e.format_for_log(), "Error in persona handler");
                APOLOGY_REPLY.to_string()
            }
        }
    }
}
