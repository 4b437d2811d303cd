//! Persona response strategies.

mod joker;
mod pm;
mod simple;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::SharedClient;
use crate::specification::SpecificationStore;
use crate::types::Message;

use super::{JokeBook, PersonaLabel, PersonaRegistry};

pub use joker::JokerHandler;
pub use pm::PmHandler;
pub use simple::PromptHandler;

/// Maps conversation history to one assistant reply.
#[async_trait]
pub trait PersonaHandler: Send + Sync {
    async fn respond(&self, history: &[Message]) -> Result<String>;
}

/// One handler per persona label.
pub struct PersonaHandlers {
    pm: Box<dyn PersonaHandler>,
    swe: Box<dyn PersonaHandler>,
    travel: Box<dyn PersonaHandler>,
    joker: Box<dyn PersonaHandler>,
    adhd: Box<dyn PersonaHandler>,
}

impl PersonaHandlers {
    /// Standard handlers sharing one client.
    pub fn new(
        client: SharedClient,
        store: Arc<dyn SpecificationStore>,
        jokes: Arc<JokeBook>,
        joke_step_limit: u32,
    ) -> Self {
        let registry = PersonaRegistry::new();
        let prompt = |label| registry.system_prompt(label);

        Self {
            pm: Box::new(PmHandler::new(prompt(PersonaLabel::Pm), client.clone(), store)),
            swe: Box::new(PromptHandler::new(
                PersonaLabel::Swe,
                prompt(PersonaLabel::Swe),
                client.clone(),
            )),
            travel: Box::new(PromptHandler::new(
                PersonaLabel::Travel,
                prompt(PersonaLabel::Travel),
                client.clone(),
            )),
            joker: Box::new(JokerHandler::new(
                prompt(PersonaLabel::Joker),
                client.clone(),
                jokes,
                joke_step_limit,
            )),
            adhd: Box::new(PromptHandler::new(
                PersonaLabel::Adhd,
                prompt(PersonaLabel::Adhd),
                client,
            )),
        }
    }

    /// Replace the handler for `label`.
    #[cfg(test)]
    pub fn with_handler(mut self, label: PersonaLabel, handler: Box<dyn PersonaHandler>) -> Self {
        match label {
            PersonaLabel::Pm => self.pm = handler,
            PersonaLabel::Swe => self.swe = handler,
            PersonaLabel::Travel => self.travel = handler,
            PersonaLabel::Joker => self.joker = handler,
            PersonaLabel::Adhd => self.adhd = handler,
        }
        self
    }

    pub fn get(&self, label: PersonaLabel) -> &dyn PersonaHandler {
        match label {
            PersonaLabel::Pm => self.pm.as_ref(),
            PersonaLabel::Swe => self.swe.as_ref(),
            PersonaLabel::Travel => self.travel.as_ref(),
            PersonaLabel::Joker => self.joker.as_ref(),
            PersonaLabel::Adhd => self.adhd.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::llm::MockClient;
    use crate::specification::FileSpecificationStore;

    #[tokio::test]
    async fn test_every_label_uses_its_own_prompt() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(MockClient::with_fixed_response("ok"));
        let store = Arc::new(FileSpecificationStore::new(dir.path().join("spec.md")));
        let jokes = Arc::new(JokeBook::bundled().unwrap());
        let handlers = PersonaHandlers::new(client.clone(), store, jokes, 5);
        let registry = PersonaRegistry::new();

        for label in PersonaLabel::all() {
            let reply = handlers.get(*label).respond(&[Message::user("hi")]).await.unwrap();
            assert_eq!(reply, "ok");
            let sent = client.last_messages().unwrap();
            assert_eq!(sent[0].content, registry.system_prompt(*label), "{:?}", label);
        }
        assert_eq!(client.call_count(), PersonaLabel::all().len());
    }
}
