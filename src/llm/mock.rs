//! Mock completion client
//!
//! The `mock` provider answers every call with one canned reply. Tests can
//! additionally script replies, which are served in order before the canned
//! one, and inspect every request the client received.

#[cfg(test)]
use std::collections::VecDeque;

use async_trait::async_trait;
#[cfg(test)]
use parking_lot::RwLock;

use crate::error::{Error, Result};

use super::traits::CompletionClient;
use super::types::{ChatMessage, Completion, ToolSpec};
#[cfg(test)]
use super::types::ToolCall;

/// Reply used by the `mock` provider when no canned response is configured
pub const DEFAULT_MOCK_RESPONSE: &str = "This is a mock response.";

/// One scripted reply
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    ToolCalls(Vec<ToolCall>),
    Fail(String),
}

/// A request as seen by the mock
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tool_names: Vec<String>,
}

/// Canned (and, under test, scripted) implementation of [`CompletionClient`]
#[derive(Debug, Default)]
pub struct MockClient {
    fixed_response: Option<String>,
    #[cfg(test)]
    script: RwLock<VecDeque<MockReply>>,
    #[cfg(test)]
    requests: RwLock<Vec<RecordedRequest>>,
}

impl MockClient {
    /// Client that answers every call with the same text
    pub fn with_fixed_response(text: impl Into<String>) -> Self {
        Self {
            fixed_response: Some(text.into()),
            ..Self::default()
        }
    }

    fn canned(&self) -> Result<Completion> {
        self.fixed_response
            .clone()
            .map(Completion::text)
            .ok_or_else(|| Error::completion_failed("mock", "No scripted reply left"))
    }
}

#[cfg(test)]
impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.script.write().push_back(MockReply::Text(text.into()));
    }

    /// Queue a single tool call with the given id
    pub fn push_tool_call(&self, id: &str, name: &str, arguments: serde_json::Value) {
        self.script.write().push_back(MockReply::ToolCalls(vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }]));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.script.write().push_back(MockReply::Fail(message.into()));
    }

    pub fn call_count(&self) -> usize {
        self.requests.read().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().clone()
    }

    /// Messages of the most recent request
    pub fn last_messages(&self) -> Option<Vec<ChatMessage>> {
        self.requests.read().last().map(|r| r.messages.clone())
    }

    fn scripted(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Option<Result<Completion>> {
        self.requests.write().push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });

        let reply = self.script.write().pop_front()?;
        Some(match reply {
            MockReply::Text(text) => Ok(Completion::text(text)),
            MockReply::ToolCalls(tool_calls) => Ok(Completion {
                content: String::new(),
                tool_calls,
            }),
            MockReply::Fail(message) => Err(Error::completion_failed("mock", message)),
        })
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<Completion> {
        #[cfg(test)]
        if let Some(reply) = self.scripted(messages, tools) {
            return reply;
        }
        #[cfg(not(test))]
        let _ = (messages, tools);

        self.canned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_fixed_response() {
        let client = MockClient::with_fixed_response("fallback");
        client.push_text("first");

        let msgs = [ChatMessage::user("hi")];
        assert_eq!(client.complete(&msgs).await.unwrap(), "first");
        assert_eq!(client.complete(&msgs).await.unwrap(), "fallback");
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_script_fails() {
        let client = MockClient::new();
        let err = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, Error::CompletionFailed { .. }));
    }

    #[tokio::test]
    async fn test_records_tools_and_messages() {
        let client = MockClient::new();
        client.push_tool_call("c1", "get_joke", serde_json::json!({}));
        let tools = [ToolSpec {
            name: "get_joke".to_string(),
            description: String::new(),
            parameters: serde_json::json!({}),
        }];

        let completion = client
            .complete_with_tools(&[ChatMessage::user("joke")], &tools)
            .await
            .unwrap();
        assert!(completion.wants_tools());

        let recorded = client.requests();
        assert_eq!(recorded[0].tool_names, vec!["get_joke"]);
        assert_eq!(client.last_messages().unwrap()[0].content, "joke");
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let client = MockClient::new();
        client.push_failure("boom");
        let err = client.complete(&[]).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
