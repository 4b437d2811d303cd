//! Error types for the persona agent
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for the CLI
//!
//! Most errors never reach the user: the turn engine resolves them locally to
//! fallback text. They surface only from the CLI and configuration paths.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoNotFound = 203,

    // Completion service errors (3xx)
    CompletionFailed = 300,
    CompletionTimeout = 301,
    AuthenticationFailed = 302,

    // Response errors (4xx)
    MalformedResponse = 400,
    Serialization = 401,

    // Agent errors (5xx)
    ToolFailed = 500,
    StepLimitExceeded = 501,
    UnknownPersona = 502,
    ThreadStore = 503,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            500..=599 => 50,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the agent
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Completion Service Errors
    // ─────────────────────────────────────────────────────────────

    /// The completion call failed
    #[error("Completion request to {provider} failed: {message}")]
    CompletionFailed { provider: String, message: String },

    /// The completion call timed out
    #[error("Completion request to {provider} timed out after {timeout_secs}s")]
    CompletionTimeout { provider: String, timeout_secs: u64 },

    /// The completion service rejected our credentials
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The completion service answered with something we cannot use
    #[error("Malformed completion response: {message}")]
    MalformedResponse { message: String },

    // ─────────────────────────────────────────────────────────────
    // Agent Errors
    // ─────────────────────────────────────────────────────────────

    /// A tool invoked by a sub-agent failed
    #[error("Tool '{tool}' failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// A tool-using sub-agent ran out of steps before answering
    #[error("Sub-agent exceeded its step limit of {limit}")]
    StepLimitExceeded { limit: u32 },

    /// Unknown persona label
    #[error("Unknown persona '{0}'. Valid: pm, swe, travel, joker, adhd")]
    UnknownPersona(String),

    /// Conversation thread persistence error
    #[error("Thread store error for '{thread_id}': {message}")]
    ThreadStore { thread_id: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::Json(_) => ErrorCode::Serialization,

            Error::CompletionFailed { .. } => ErrorCode::CompletionFailed,
            Error::CompletionTimeout { .. } => ErrorCode::CompletionTimeout,
            Error::AuthenticationFailed { .. } => ErrorCode::AuthenticationFailed,
            Error::MalformedResponse { .. } => ErrorCode::MalformedResponse,

            Error::ToolFailed { .. } => ErrorCode::ToolFailed,
            Error::StepLimitExceeded { .. } => ErrorCode::StepLimitExceeded,
            Error::UnknownPersona(_) => ErrorCode::UnknownPersona,
            Error::ThreadStore { .. } => ErrorCode::ThreadStore,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'persona-agent config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'persona-agent config validate' to see details."
            ),
            Error::ConfigValidation { .. } | Error::Config(_) => Some(
                "Review the configuration file and fix the invalid values."
            ),
            Error::AuthenticationFailed { .. } => Some(
                "Set [model].api_key or the REDPILL_API_KEY environment variable."
            ),
            Error::CompletionFailed { .. } | Error::CompletionTimeout { .. } => Some(
                "Check that [model].base_url is reachable and the model name is correct."
            ),
            Error::UnknownPersona(_) => Some(
                "Run 'persona-agent persona list' to see the available personas."
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            self.code().as_str(),
            self
        );

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a completion failure for the given provider
    pub fn completion_failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::CompletionFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a tool failure
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
