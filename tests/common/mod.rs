//! Common test utilities and fixtures
//!
//! Every command built here runs against a throwaway home directory with the
//! mock completion provider, so tests never touch the network or real user data.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Isolated environment for running the binary
pub struct Sandbox {
    pub home: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.home.path()
    }

    pub fn spec_path(&self) -> PathBuf {
        self.root().join("specification.md")
    }

    pub fn threads_dir(&self) -> PathBuf {
        self.root().join("threads")
    }

    /// Command with mock provider and all paths inside the sandbox
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("persona-agent").unwrap();
        cmd.current_dir(self.root())
            .env("HOME", self.root())
            .env("XDG_CONFIG_HOME", self.root().join(".config"))
            .env_remove("PERSONA_AGENT_CONFIG")
            .env_remove("PERSONA_AGENT_MOCK_RESPONSE")
            .env_remove("REDPILL_API_KEY")
            .env_remove("RUST_LOG")
            .env("PERSONA_AGENT_PROVIDER", "mock")
            .env("PERSONA_AGENT_SPEC_PATH", self.spec_path())
            .env("PERSONA_AGENT_THREADS_DIR", self.threads_dir())
            .env("PERSONA_AGENT_LOG_LEVEL", "warn");
        cmd
    }

    /// Command whose mock client answers every call with `reply`
    pub fn cmd_replying(&self, reply: &str) -> Command {
        let mut cmd = self.cmd();
        cmd.env("PERSONA_AGENT_MOCK_RESPONSE", reply);
        cmd
    }
}
