//! Joker persona: a tool-using sub-agent with a joke lookup tool.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::agent::{Tool, ToolAgent};
use crate::error::Result;
use crate::llm::SharedClient;
use crate::persona::jokes::JokeBook;
use crate::types::Message;

use super::PersonaHandler;

/// Reply used when the sub-agent fails or runs out of steps.
pub const BROKEN_GENERATOR_JOKE: &str = "Hmm, my joke generator seems broken. Let me tell you a classic one instead: Why did the chicken cross the road? To get to the other side!";

/// `get_joke(category?)` backed by a [`JokeBook`]
pub struct GetJokeTool {
    jokes: Arc<JokeBook>,
}

impl GetJokeTool {
    pub fn new(jokes: Arc<JokeBook>) -> Self {
        Self { jokes }
    }
}

#[async_trait]
impl Tool for GetJokeTool {
    fn name(&self) -> &str {
        "get_joke"
    }

    fn description(&self) -> &str {
        "Get a random joke. Optionally specify category: puns, dad_jokes, or knock_knock, or empty string for any category."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "The category of joke to get (puns, dad_jokes, knock_knock) or empty string for any category",
                    "default": ""
                }
            },
            "required": []
        })
    }

    async fn call(&self, arguments: &serde_json::Value) -> Result<String> {
        let category = arguments.get("category").and_then(|c| c.as_str());
        debug!(category = ?category, "get_joke called");
        Ok(self.jokes.get_joke(category))
    }
}

/// Handler for the joker persona. Never fails.
pub struct JokerHandler {
    system_prompt: &'static str,
    client: SharedClient,
    jokes: Arc<JokeBook>,
    step_limit: u32,
}

impl JokerHandler {
    pub fn new(
        system_prompt: &'static str,
        client: SharedClient,
        jokes: Arc<JokeBook>,
        step_limit: u32,
    ) -> Self {
        Self {
            system_prompt,
            client,
            jokes,
            step_limit,
        }
    }
}

#[async_trait]
impl PersonaHandler for JokerHandler {
    async fn respond(&self, history: &[Message]) -> Result<String> {
        let agent = ToolAgent::new(self.client.clone(), self.system_prompt, self.step_limit)
            .with_tool(Arc::new(GetJokeTool::new(self.jokes.clone())));

        match agent.run(history).await {
            Ok(trace) => {
                let parts = trace.response_parts();
                if parts.is_empty() {
                    Ok(self.jokes.get_joke(None))
                } else {
                    Ok(parts.join("\n"))
                }
            }
            Err(e) => {
                warn!(error = %e, "Error in joker agent");
                Ok(BROKEN_GENERATOR_JOKE.to_string())
            }
        }
    }
}
