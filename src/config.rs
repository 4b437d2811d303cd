//! Configuration system for the persona agent
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (PERSONA_AGENT_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Completion providers the agent knows how to build
pub const PROVIDERS: &[&str] = &["openai", "mock"];

/// Upper bound for `[model].max_retries`
const MAX_RETRIES_LIMIT: u32 = 10;

/// Fallback variable consulted when `[model].api_key` is empty
pub const API_KEY_FALLBACK_ENV: &str = "REDPILL_API_KEY";

/// Main agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Completion service settings
    pub model: ModelSettings,

    /// Persona engine settings
    pub agent: EngineSettings,

    /// Logging configuration
    pub logging: LoggingSettings,

    /// Data storage paths
    pub storage: StorageSettings,
}

/// Completion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Which client to build: "openai" or "mock"
    pub provider: String,

    /// API base URL of an OpenAI-compatible endpoint
    pub base_url: String,

    /// API key (falls back to REDPILL_API_KEY when empty)
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retries on transient failures
    pub max_retries: u32,

    /// Sampling temperature (unset = provider default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Canned reply used by the mock provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_response: Option<String>,
}

/// Persona engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Path of the PM persona's specification document
    pub spec_path: String,

    /// Step ceiling for the joker's tool-using sub-agent
    pub joke_step_limit: u32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

/// Storage path settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Base data directory
    pub data_dir: String,

    /// Directory holding one JSON file per conversation thread
    pub threads_dir: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: "https://api.redpill.ai/v1".to_string(),
            api_key: String::new(),
            model: "phala/llama-3.3-70b-instruct".to_string(),
            timeout_secs: 120,
            max_retries: 2,
            temperature: None,
            mock_response: None,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            spec_path: "~/.persona-agent/specification.md".to_string(),
            joke_step_limit: 5,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.persona-agent".to_string(),
            threads_dir: "~/.persona-agent/threads".to_string(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: e.to_string(),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            return if path.exists() {
                Ok(Some(path))
            } else {
                Err(Error::config_not_found(path))
            };
        }

        let search_paths = [
            PathBuf::from("persona-agent.toml"),
            dirs::config_dir()
                .map(|p| p.join("persona-agent").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".persona-agent").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if path.is_file() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PERSONA_AGENT_PROVIDER") {
            self.model.provider = val;
        }
        if let Ok(val) = std::env::var("PERSONA_AGENT_BASE_URL") {
            self.model.base_url = val;
        }
        if let Ok(val) = std::env::var("PERSONA_AGENT_API_KEY") {
            self.model.api_key = val;
        }
        if let Ok(val) = std::env::var("PERSONA_AGENT_MODEL") {
            self.model.model = val;
        }
        if let Ok(val) = std::env::var("PERSONA_AGENT_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.model.timeout_secs = n;
            }
        }
        if let Ok(val) = std::env::var("PERSONA_AGENT_MOCK_RESPONSE") {
            self.model.mock_response = Some(val);
        }
        if self.model.api_key.is_empty() {
            if let Ok(val) = std::env::var(API_KEY_FALLBACK_ENV) {
                self.model.api_key = val;
            }
        }

        if let Ok(val) = std::env::var("PERSONA_AGENT_SPEC_PATH") {
            self.agent.spec_path = val;
        }
        if let Ok(val) = std::env::var("PERSONA_AGENT_JOKE_STEP_LIMIT") {
            if let Ok(n) = val.parse() {
                self.agent.joke_step_limit = n;
            }
        }

        if let Ok(val) = std::env::var("PERSONA_AGENT_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("PERSONA_AGENT_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("PERSONA_AGENT_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("PERSONA_AGENT_DATA_DIR") {
            self.storage.data_dir = val;
        }
        if let Ok(val) = std::env::var("PERSONA_AGENT_THREADS_DIR") {
            self.storage.threads_dir = val;
        }
    }

    /// Expand ~ and environment variables in paths
    fn expand_paths(&mut self) {
        self.agent.spec_path = expand_path(&self.agent.spec_path);
        self.storage.data_dir = expand_path(&self.storage.data_dir);
        self.storage.threads_dir = expand_path(&self.storage.threads_dir);

        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let provider = self.model.provider.to_lowercase();
        if !PROVIDERS.contains(&provider.as_str()) {
            return Err(Error::config_field_invalid(
                "model.provider",
                format!(
                    "Unknown provider '{}'. Must be one of: {}",
                    self.model.provider,
                    PROVIDERS.join(", ")
                ),
            ));
        }

        match url::Url::parse(&self.model.base_url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            _ => {
                return Err(Error::config_field_invalid(
                    "model.base_url",
                    format!("'{}' is not an http(s) URL", self.model.base_url),
                ));
            }
        }

        if self.model.model.trim().is_empty() {
            return Err(Error::config_field_invalid("model.model", "Model cannot be empty"));
        }

        if self.model.max_retries > MAX_RETRIES_LIMIT {
            return Err(Error::config_field_invalid(
                "model.max_retries",
                format!(
                    "max_retries is {} but may be at most {}",
                    self.model.max_retries, MAX_RETRIES_LIMIT
                ),
            ));
        }

        if self.agent.spec_path.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "agent.spec_path",
                "Specification path cannot be empty",
            ));
        }

        if self.agent.joke_step_limit == 0 {
            return Err(Error::config_field_invalid(
                "agent.joke_step_limit",
                "joke_step_limit must be at least 1",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Path of the specification document
    pub fn spec_path(&self) -> PathBuf {
        PathBuf::from(&self.agent.spec_path)
    }

    /// Directory of persisted conversation threads
    pub fn threads_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.threads_dir)
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".persona-agent")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Default configuration content with comments
const DEFAULT_CONFIG: &str = r#"# persona-agent configuration

[model]
# Completion client: "openai" (any OpenAI-compatible endpoint) or "mock"
provider = "openai"

# API base URL
base_url = "https://api.redpill.ai/v1"

# API key (leave empty to use the REDPILL_API_KEY environment variable)
api_key = ""

# Model identifier
model = "phala/llama-3.3-70b-instruct"

# Request timeout in seconds
timeout_secs = 120

# Maximum retries on transient failures
max_retries = 2

[agent]
# Where the PM persona keeps the project specification
spec_path = "~/.persona-agent/specification.md"

# Maximum model steps for the joker's tool-using sub-agent
joke_step_limit = 5

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.persona-agent/logs/agent.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false

[storage]
# Base data directory
data_dir = "~/.persona-agent"

# Conversation threads, one JSON file per thread id
threads_dir = "~/.persona-agent/threads"
"#;
