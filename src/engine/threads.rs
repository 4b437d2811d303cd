//! Conversation memory keyed by thread id.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{ConversationHistory, Message};

/// Stores the history of each conversation thread
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// History of `thread_id`; empty for a thread never seen before.
    async fn get(&self, thread_id: &str) -> Result<ConversationHistory>;

    /// Replace the history of `thread_id`.
    async fn put(&self, thread_id: &str, history: &[Message]) -> Result<()>;
}

/// Thread ids double as file names, so only a conservative alphabet is allowed.
fn validate_thread_id(thread_id: &str) -> Result<()> {
    let valid = !thread_id.is_empty()
        && thread_id.len() <= 128
        && thread_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(Error::ThreadStore {
            thread_id: thread_id.to_string(),
            message: "Thread id may only contain letters, digits, '-' and '_'".to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────
// In-memory
// ─────────────────────────────────────────────────────────────────

/// Process-local thread store
#[derive(Debug, Default)]
pub struct MemoryThreadStore {
    threads: RwLock<HashMap<String, ConversationHistory>>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn get(&self, thread_id: &str) -> Result<ConversationHistory> {
        validate_thread_id(thread_id)?;
        Ok(self.threads.read().get(thread_id).cloned().unwrap_or_default())
    }

    async fn put(&self, thread_id: &str, history: &[Message]) -> Result<()> {
        validate_thread_id(thread_id)?;
        self.threads
            .write()
            .insert(thread_id.to_string(), history.to_vec());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// JSON files
// ─────────────────────────────────────────────────────────────────

/// On-disk form of one thread
#[derive(Debug, Serialize, Deserialize)]
struct ThreadRecord {
    thread_id: String,
    updated_at: DateTime<Utc>,
    messages: ConversationHistory,
}

/// Thread store writing one JSON file per thread
#[derive(Debug, Clone)]
pub struct FileThreadStore {
    dir: PathBuf,
}

impl FileThreadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, thread_id: &str) -> Result<PathBuf> {
        validate_thread_id(thread_id)?;
        Ok(self.dir.join(format!("{}.json", thread_id)))
    }
}

#[async_trait]
impl ThreadStore for FileThreadStore {
    async fn get(&self, thread_id: &str) -> Result<ConversationHistory> {
        let path = self.path_for(thread_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
            path: path.clone(),
            source: e,
        })?;
        let record: ThreadRecord =
            serde_json::from_str(&content).map_err(|e| Error::ThreadStore {
                thread_id: thread_id.to_string(),
                message: format!("Corrupt thread file {}: {}", path.display(), e),
            })?;

        debug!(thread_id, messages = record.messages.len(), "Thread loaded");
        Ok(record.messages)
    }

    async fn put(&self, thread_id: &str, history: &[Message]) -> Result<()> {
        let path = self.path_for(thread_id)?;
        fs::create_dir_all(&self.dir).map_err(|e| Error::IoWrite {
            path: self.dir.clone(),
            source: e,
        })?;

        let record = ThreadRecord {
            thread_id: thread_id.to_string(),
            updated_at: Utc::now(),
            messages: history.to_vec(),
        };
        let content = serde_json::to_string_pretty(&record)?;
        fs::write(&path, content).map_err(|e| Error::IoWrite {
            path: path.clone(),
            source: e,
        })?;

        debug!(thread_id, messages = history.len(), path = %path.display(), "Thread saved");
        Ok(())
    }
}
