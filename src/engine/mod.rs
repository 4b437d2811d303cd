//! Turn engine: routing, the turn controller, and conversation memory.

mod controller;
mod router;
mod threads;

use std::sync::Arc;

use tracing::info;

use crate::config::AgentConfig;
use crate::error::Result;
use crate::llm::{build_client, SharedClient};
use crate::persona::{JokeBook, PersonaClassifier, PersonaHandlers};
use crate::specification::FileSpecificationStore;

pub use controller::ConversationTurnController;
pub use router::PersonaRouter;
pub use threads::{FileThreadStore, MemoryThreadStore, ThreadStore};

/// Wire a router over `client` using the configured specification path
pub fn build_router(config: &AgentConfig, client: SharedClient) -> Result<PersonaRouter> {
    let store = Arc::new(FileSpecificationStore::new(config.spec_path()));
    let jokes = Arc::new(JokeBook::bundled()?);
    let handlers = PersonaHandlers::new(client.clone(), store, jokes, config.agent.joke_step_limit);

    Ok(PersonaRouter::new(PersonaClassifier::new(client), handlers))
}

/// Build the complete engine described by `config`
pub fn build_controller(
    config: &AgentConfig,
    threads: Arc<dyn ThreadStore>,
) -> Result<ConversationTurnController> {
    let client = build_client(&config.model)?;
    info!(
        provider = client.name(),
        spec_path = %config.spec_path().display(),
        "Engine ready"
    );

    Ok(ConversationTurnController::new(
        build_router(config, client)?,
        threads,
    ))
}
