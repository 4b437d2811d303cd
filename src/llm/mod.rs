//! Language model access
//!
//! This module provides the completion client abstraction used by every
//! persona, plus the OpenAI-compatible and mock implementations.

mod mock;
mod openai;
mod traits;
mod types;

use std::sync::Arc;

use tracing::debug;

use crate::config::ModelSettings;
use crate::error::{Error, Result};

pub use mock::{MockClient, DEFAULT_MOCK_RESPONSE};
pub use openai::OpenAiClient;
pub use traits::*;
pub use types::*;

/// Supported client providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Any OpenAI-compatible HTTP endpoint
    OpenAi,
    /// Canned replies (for testing and offline runs)
    Mock,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Mock => "mock",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "mock" => Some(ProviderKind::Mock),
            _ => None,
        }
    }
}

/// Build the completion client described by `[model]`
pub fn build_client(settings: &ModelSettings) -> Result<SharedClient> {
    let kind = ProviderKind::from_name(&settings.provider).ok_or_else(|| {
        Error::config_field_invalid(
            "model.provider",
            format!("Unknown provider '{}'", settings.provider),
        )
    })?;

    debug!(provider = kind.name(), "Building completion client");

    let client: SharedClient = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiClient::new(settings)?),
        ProviderKind::Mock => Arc::new(MockClient::with_fixed_response(
            settings
                .mock_response
                .clone()
                .unwrap_or_else(|| DEFAULT_MOCK_RESPONSE.to_string()),
        )),
    };

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names() {
        assert_eq!(ProviderKind::from_name("OpenAI"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::from_name("mock"), Some(ProviderKind::Mock));
        assert_eq!(ProviderKind::from_name("vulkan"), None);
        assert_eq!(ProviderKind::Mock.name(), "mock");
    }

    #[tokio::test]
    async fn test_build_mock_client_uses_canned_response() {
        let settings = ModelSettings {
            provider: "mock".to_string(),
            mock_response: Some("canned".to_string()),
            ..Default::default()
        };
        let client = build_client(&settings).unwrap();
        assert_eq!(client.name(), "mock");
        assert_eq!(client.complete(&[ChatMessage::user("hi")]).await.unwrap(), "canned");
    }

    #[test]
    fn test_build_unknown_provider_fails() {
        let settings = ModelSettings {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        assert!(build_client(&settings).is_err());
    }
}
