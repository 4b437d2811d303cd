//! Persona classification
//!
//! One completion call decides which persona handles the latest user
//! utterance. The reply is parsed leniently; when nothing usable comes back
//! (or the call fails) the default persona is used. Classification never
//! fails a turn.

use tracing::{info, warn};

use crate::llm::{ChatMessage, SharedClient};
use crate::types::{last_user_message, Message};

use super::types::{ClassificationResult, PersonaLabel, Provenance};

/// Build the classification prompt for one utterance
fn classification_prompt(utterance: &str) -> String {
    let labels: Vec<&str> = PersonaLabel::all().iter().map(|l| l.slug()).collect();
    format!(
        "You are an agent that has multiple personalities: PM, travel agent, Joker, AI with ADHD, software developer\n\
         Based on the following user query, which personality should handle it?\n\
         Choose one of: {}\n\
         \n\
         User query: {}\n\
         \n\
         Respond with just the personality name (lowercase).",
        labels.join(", "),
        utterance
    )
}

/// Map a raw model reply to a label
///
/// An exact (trimmed, case-insensitive) label wins. Otherwise the first label,
/// in declaration order, found anywhere in the reply is taken. Note that short
/// labels like `pm` can match inside unrelated words.
pub fn parse_label(response: &str) -> Option<ClassificationResult> {
    let normalized = response.trim().to_lowercase();

    if let Some(label) = PersonaLabel::all()
        .iter()
        .find(|label| label.slug() == normalized)
    {
        return Some(ClassificationResult::new(*label, Provenance::Exact));
    }

    PersonaLabel::all()
        .iter()
        .find(|label| normalized.contains(label.slug()))
        .map(|label| ClassificationResult::new(*label, Provenance::Embedded))
}

/// Chooses a persona for each turn
pub struct PersonaClassifier {
    client: SharedClient,
}

impl PersonaClassifier {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }

    /// Classify the most recent user message of `history`
    pub async fn classify(&self, history: &[Message]) -> ClassificationResult {
        match last_user_message(history) {
            Some(utterance) => self.classify_utterance(utterance).await,
            None => {
                warn!("Empty user query, using default persona");
                ClassificationResult::fallback()
            }
        }
    }

    /// Classify a single utterance
    pub async fn classify_utterance(&self, utterance: &str) -> ClassificationResult {
        if utterance.trim().is_empty() {
            warn!("Empty user query, using default persona");
            return ClassificationResult::fallback();
        }

        let messages = [ChatMessage::system(classification_prompt(utterance))];
        let response = match self.client.complete(&messages).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Persona classification failed, using default persona");
                return ClassificationResult::fallback();
            }
        };

        match parse_label(&response) {
            Some(result) => {
                info!(persona = %result.label, provenance = %result.provenance, "Persona detected");
                result
            }
            None => {
                warn!(
                    response = %response,
                    default = %PersonaLabel::DEFAULT,
                    "Could not determine persona from response"
                );
                ClassificationResult::fallback()
            }
        }
    }
}
