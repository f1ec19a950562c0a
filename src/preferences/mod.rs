//! Preferences - small key/value state persisted outside the core
//!
//! - `sqlite`: `SqlitePreferences`, backed by a local turso database
//! - `memory`: `MemoryPreferences`, for tests and throwaway sessions

mod memory;
mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryPreferences;
pub use sqlite::SqlitePreferences;

pub type PreferenceResult<T> = Result<T, PreferenceError>;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Injected key/value store for user preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> PreferenceResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> PreferenceResult<()>;
    async fn delete(&self, key: &str) -> PreferenceResult<()>;
}
