//! Bounded tool-using sub-agent
//!
//! The agent alternates model calls and tool executions until the model
//! answers without requesting tools. Every model call and every round of
//! tool executions is one step; running out of steps before a final answer
//! is an error, so a run always either finishes or fails in bounded time.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::llm::{to_chat_messages, ChatMessage, SharedClient, ToolCall, ToolSpec};
use crate::types::Message;

// ─────────────────────────────────────────────────────────────────
// Tool
// ─────────────────────────────────────────────────────────────────

/// A function the model may invoke
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the argument object
    fn parameters(&self) -> serde_json::Value;

    async fn call(&self, arguments: &serde_json::Value) -> Result<String>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Trace
// ─────────────────────────────────────────────────────────────────

/// One event produced during a run
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// Text content of an assistant message (possibly empty)
    Assistant(String),
    /// Output of a tool invocation
    ToolResult(String),
}

/// Everything a run produced, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolTrace {
    pub events: Vec<TraceEvent>,
    pub steps: u32,
}

impl ToolTrace {
    /// Tool results and non-empty assistant texts, in production order
    pub fn response_parts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Assistant(text) if !text.is_empty() => Some(text.as_str()),
                TraceEvent::ToolResult(content) => Some(content.as_str()),
                TraceEvent::Assistant(_) => None,
            })
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────────────────────────

/// Drives tools over a completion client under a step ceiling
pub struct ToolAgent {
    client: SharedClient,
    system_prompt: String,
    tools: Vec<Arc<dyn Tool>>,
    step_limit: u32,
}

impl ToolAgent {
    pub fn new(client: SharedClient, system_prompt: impl Into<String>, step_limit: u32) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
            tools: Vec::new(),
            step_limit,
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    fn find_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    fn take_step(&self, trace: &mut ToolTrace) -> Result<()> {
        if trace.steps >= self.step_limit {
            warn!(limit = self.step_limit, "Tool agent hit its step limit");
            return Err(Error::StepLimitExceeded {
                limit: self.step_limit,
            });
        }
        trace.steps += 1;
        Ok(())
    }

    /// Run one tool call. Tool errors become the result text so the model can react.
    async fn execute(&self, call: &ToolCall) -> String {
        let result = match self.find_tool(&call.name) {
            Some(tool) => tool.call(&call.arguments).await,
            None => Err(Error::tool_failed(&call.name, "no such tool is available")),
        };

        result.unwrap_or_else(|e| {
            warn!(tool = %call.name, error = %e, "Tool call failed");
            format!("Error: {}", e)
        })
    }

    /// Run the agent over `history` until the model gives a final answer
    pub async fn run(&self, history: &[Message]) -> Result<ToolTrace> {
        let specs: Vec<ToolSpec> = self.tools.iter().map(|t| t.spec()).collect();

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(to_chat_messages(history));

        let mut trace = ToolTrace::default();

        loop {
            self.take_step(&mut trace)?;
            let completion = self.client.complete_with_tools(&messages, &specs).await?;

            debug!(
                step = trace.steps,
                tool_calls = completion.tool_calls.len(),
                "Tool agent model reply"
            );

            trace
                .events
                .push(TraceEvent::Assistant(completion.content.clone()));

            if !completion.wants_tools() {
                info!(steps = trace.steps, "Tool agent finished");
                return Ok(trace);
            }

            messages.push(ChatMessage::assistant_with_calls(
                completion.content.clone(),
                completion.tool_calls.clone(),
            ));

            self.take_step(&mut trace)?;
            for call in &completion.tool_calls {
                let content = self.execute(call).await;
                debug!(step = trace.steps, tool = %call.name, "Tool executed");

                messages.push(ChatMessage::tool_result(call.id.clone(), content.clone()));
                trace.events.push(TraceEvent::ToolResult(content));
            }
        }
    }
}
