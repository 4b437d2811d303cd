//! Product manager persona
//!
//! Each turn has two phases. Phase one talks to the user, steered by the
//! current specification document (or by requirement-gathering instructions
//! when there is none). Phase two, run when a document exists or when the
//! model announces it is ready to write one, asks the model for the full
//! markdown specification and stores it. Phase two can never change or fail
//! the reply produced by phase one.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::llm::{to_chat_messages, ChatMessage, SharedClient};
use crate::specification::{extract_specification, SpecificationStore};
use crate::types::Message;

use super::PersonaHandler;

/// Phrase that triggers the first specification write.
pub const WRITE_TRIGGER: &str = "I'm ready to write a specification";

/// Phrase requested when updating. Phase two does not look for it: an
/// existing document already triggers the writer on every turn.
pub const UPDATE_TRIGGER: &str = "I'm ready to update the specification";

const WRITER_PREAMBLE: &str = "You are an AI Product Manager assistant. You are in a dialog with a user, who wants you to write a specification for their application. User is not technical so you need to explain technical concepts in a simple way.
The history of your conversation is provided below. The user provides details about the project they want to build, and the assistant asks clarifying questions and creates a product specification for building the project. Your ultimate goal is now is to create a valid markdown project specification that accurately describes the user's project which can be used by independent developer to build it.
The final project will contain three parts: frontend, backend, and middleware. Your goal is to write the specifications as clearly as possible so that the team can understand the requirements and implement the three parts of the project. The specification should be as low as possible, commenting on possible code outlines, project architecture, how different components interact, function names and documentation, user stories, and multiple workflows. Don't add any description of the stack or projected timeline or milestones to the specification.";

const WRITER_CLOSING: &str = "Otherwise respond with N/A. Do not include plain text and any introduction like \"Here is the specification:\". Respond in valid markdown specifications only or N/A.";

const RESPOND_STEPS: &str = "After each message from the user, you first respond, either confirming that you understood him and briefly explaining your next steps, or asking for clarifying questions.";

/// Phase-one instructions
fn conversation_instructions(current_spec: Option<&str>) -> String {
    match current_spec {
        None => format!(
            "{RESPOND_STEPS} You have to obtain a full understanding about how to build the user's application.\n\
             What message should we send to the user right now? Respond with the text that will be directly displayed to the user. \
             If you have a full understanding about the user project, please reply with \"{WRITE_TRIGGER}\"."
        ),
        Some(spec) => format!(
            "The current version of the project specification is:\n\n\
             {spec}\n\
             === End of specification ===\n\n\
             User may want to update this specification with additional features or fixes. {RESPOND_STEPS}\n\
             What message should we send to the user right now? Respond with the text that will be directly displayed to the user. \
             If you have a full understanding about specification updates, please reply with \"{UPDATE_TRIGGER}\"."
        ),
    }
}

/// Phase-two system prompt
fn writer_prompt(current_spec: Option<&str>, last_reply: &str) -> String {
    let instruction = match current_spec {
        None => format!(
            "{RESPOND_STEPS}\n\
             Here is your last message:\n\n\
             {last_reply}\n\
             === End of your last message ===\n\n\
             I haven't asked you to write the updated markdown specification yet. \
             If you have a full understanding about the user project, please write a project specification in a valid markdown format."
        ),
        Some(spec) => format!(
            "The current version of the specification is:\n\n\
             {spec}\n\
             === End of specification ===\n\n\
             User may want to update this specification with additional features or fixes. \
             If you update this, try to preserve all parts of the specification that are not related to the current updates.\n\
             Here is your last message:\n\n\
             {last_reply}\n\
             === End of your last message ===\n\n\
             I haven't asked you to write the updated markdown specification yet. \
             If you have a full understanding about the updates that user want to perform with this project, please write an updated project specification in a valid markdown format."
        ),
    };

    format!("{WRITER_PREAMBLE}\n\n{instruction}\n\n{WRITER_CLOSING}")
}

/// Handler for the pm persona
pub struct PmHandler {
    system_prompt: &'static str,
    client: SharedClient,
    store: Arc<dyn SpecificationStore>,
}

impl PmHandler {
    pub fn new(
        system_prompt: &'static str,
        client: SharedClient,
        store: Arc<dyn SpecificationStore>,
    ) -> Self {
        Self {
            system_prompt,
            client,
            store,
        }
    }

    async fn converse(&self, history: &[Message], current_spec: Option<&str>) -> Result<String> {
        let mut messages = vec![
            ChatMessage::system(self.system_prompt),
            ChatMessage::system(conversation_instructions(current_spec)),
        ];
        messages.extend(to_chat_messages(history));

        self.client.complete(&messages).await
    }

    /// Ask for the full document and store it. Returns whether a write happened.
    async fn refresh_specification(
        &self,
        history: &[Message],
        current_spec: Option<&str>,
        reply: &str,
    ) -> Result<bool> {
        let mut messages = vec![ChatMessage::system(writer_prompt(current_spec, reply))];
        messages.extend(to_chat_messages(history));
        messages.push(ChatMessage::assistant(reply));

        let raw = self.client.complete(&messages).await?;
        match extract_specification(&raw) {
            Some(spec) => {
                self.store.write(&spec).await?;
                info!(bytes = spec.len(), "Specification updated");
                Ok(true)
            }
            None => {
                debug!("Writer declined to produce a specification");
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl PersonaHandler for PmHandler {
    async fn respond(&self, history: &[Message]) -> Result<String> {
        let current_spec = self.store.read().await;
        let reply = self.converse(history, current_spec.as_deref()).await?;

        if current_spec.is_some() || reply.contains(WRITE_TRIGGER) {
            if let Err(e) = self
                .refresh_specification(history, current_spec.as_deref(), &reply)
                .await
            {
                error!(error = %e, "Error generating or saving specification");
            }
        }

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::RwLock;

    use super::*;
    use crate::error::Error;
    use crate::llm::{ChatRole, MockClient};

    /// In-memory store that can be told to fail writes
    #[derive(Default)]
    struct MemoryStore {
        doc: RwLock<Option<String>>,
        writes: RwLock<u32>,
        fail_writes: bool,
    }

    impl MemoryStore {
        fn with_doc(doc: &str) -> Self {
            Self {
                doc: RwLock::new(Some(doc.to_string())),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl SpecificationStore for MemoryStore {
        async fn read(&self) -> Option<String> {
            self.doc.read().clone()
        }

        async fn write(&self, content: &str) -> Result<()> {
            if self.fail_writes {
                return Err(Error::Internal("disk full".to_string()));
            }
            *self.writes.write() += 1;
            *self.doc.write() = Some(content.to_string());
            Ok(())
        }

        async fn clear(&self) -> Result<()> {
            *self.doc.write() = None;
            Ok(())
        }
    }

    fn handler(client: &Arc<MockClient>, store: &Arc<MemoryStore>) -> PmHandler {
        PmHandler::new("PM PROMPT", client.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_no_document_no_trigger_is_single_call() {
        let client = Arc::new(MockClient::new());
        client.push_text("What platform should the app run on?");
        let store = Arc::new(MemoryStore::default());

        let reply = handler(&client, &store).respond(&[Message::user("I want an app")]).await.unwrap();
        assert_eq!(reply, "What platform should the app run on?");
        assert_eq!(client.call_count(), 1);
        assert_eq!(*store.writes.read(), 0);

        let sent = client.last_messages().unwrap();
        assert_eq!(sent[0].content, "PM PROMPT");
        assert!(sent[1].content.contains(WRITE_TRIGGER));
        assert_eq!(sent[2].content, "I want an app");
    }

    #[tokio::test]
    async fn test_trigger_writes_fenced_specification() {
        let client = Arc::new(MockClient::new());
        let phase_one = format!("Great, thanks! {}.", WRITE_TRIGGER);
        client.push_text(phase_one.clone());
        client.push_text("```# Todo App\n## Backend\n```");
        let store = Arc::new(MemoryStore::default());

        let history = [Message::user("A todo app, web only")];
        let reply = handler(&client, &store).respond(&history).await.unwrap();

        assert_eq!(reply, phase_one);
        assert_eq!(store.read().await.as_deref(), Some("# Todo App\n## Backend"));

        let writer = &client.requests()[1].messages;
        assert_eq!(writer.len(), 3);
        assert_eq!(writer[0].role, ChatRole::System);
        assert!(writer[0].content.contains("Here is your last message:\n\nGreat, thanks!"));
        assert!(writer[0].content.ends_with("Respond in valid markdown specifications only or N/A."));
        assert_eq!(writer[1].content, "A todo app, web only");
        assert_eq!(writer[2].role, ChatRole::Assistant);
        assert_eq!(writer[2].content, phase_one);
    }

    #[tokio::test]
    async fn test_existing_document_sentinel_leaves_it_unchanged() {
        let client = Arc::new(MockClient::new());
        client.push_text("Got it, anything else?");
        client.push_text("N/A");
        let store = Arc::new(MemoryStore::with_doc("# Existing"));

        let reply = handler(&client, &store).respond(&[Message::user("hello")]).await.unwrap();
        assert_eq!(reply, "Got it, anything else?");
        assert_eq!(client.call_count(), 2);
        assert_eq!(*store.writes.read(), 0);
        assert_eq!(store.read().await.as_deref(), Some("# Existing"));

        let first = client.requests()[0].messages.clone();
        assert!(first[1].content.contains("# Existing\n=== End of specification ==="));
        assert!(first[1].content.contains(UPDATE_TRIGGER));
        let writer = &client.requests()[1].messages;
        assert!(writer[0].content.contains("try to preserve all parts"));
    }

    #[tokio::test]
    async fn test_update_phrase_alone_does_not_trigger_without_document() {
        let client = Arc::new(MockClient::new());
        client.push_text(UPDATE_TRIGGER);
        let store = Arc::new(MemoryStore::default());

        handler(&client, &store).respond(&[Message::user("x")]).await.unwrap();
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_phase_two_failures_do_not_change_reply() {
        let client = Arc::new(MockClient::new());
        client.push_text("Updated plan.");
        client.push_failure("writer timed out");
        let store = Arc::new(MemoryStore::with_doc("# Doc"));
        let reply = handler(&client, &store).respond(&[Message::user("x")]).await.unwrap();
        assert_eq!(reply, "Updated plan.");
        assert_eq!(store.read().await.as_deref(), Some("# Doc"));

        let client = Arc::new(MockClient::new());
        client.push_text("Updated plan.");
        client.push_text("# New doc");
        let store = Arc::new(MemoryStore {
            fail_writes: true,
            ..MemoryStore::with_doc("# Doc")
        });
        let reply = handler(&client, &store).respond(&[Message::user("x")]).await.unwrap();
        assert_eq!(reply, "Updated plan.");
    }

    #[tokio::test]
    async fn test_phase_one_failure_propagates() {
        let client = Arc::new(MockClient::new());
        client.push_failure("down");
        let store = Arc::new(MemoryStore::default());
        assert!(handler(&client, &store).respond(&[Message::user("x")]).await.is_err());
    }
}
