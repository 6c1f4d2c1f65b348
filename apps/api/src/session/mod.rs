//! Session Store: one serialized `SessionRecord` per live interview.
//!
//! Backed by Redis in production (`RedisSessionStore`). Every record travels as
//! a single JSON blob under the hash field `session_data`; a decode failure is
//! reported as `Corrupt`, never as absence.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::session::SessionRecord;

pub mod key;
#[cfg(test)]
pub mod memory;
pub mod redis_store;

pub use key::derive_session_key;
pub use redis_store::RedisSessionStore;

/// Hash field that holds the serialized record.
pub const SESSION_FIELD: &str = "session_data";

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session {0} not found")]
    NotFound(String),

    #[error("session {0} already exists")]
    AlreadyExists(String),

    #[error("session {0} was modified by another writer")]
    Conflict(String),

    #[error("session {key} holds an undecodable record: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("failed to encode session record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Result of the set/get round trip used by the cache diagnostic endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProbeReport {
    pub set_key: String,
    pub set_value: String,
    pub retrieved_value: Option<String>,
}

/// Storage contract for interview sessions.
///
/// Carried in `AppState` as `Arc<dyn SessionStore>`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a new record. Fails with `AlreadyExists` if the key is live.
    async fn create(&self, key: &str, record: &SessionRecord) -> Result<(), SessionStoreError>;

    async fn read(&self, key: &str) -> Result<SessionRecord, SessionStoreError>;

    /// Compare-and-swap replace: succeeds only if the stored version equals
    /// `record.version`. Returns the new version.
    async fn write(&self, key: &str, record: &SessionRecord) -> Result<u64, SessionStoreError>;

    /// Removes the record. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), SessionStoreError>;

    /// Drops every key in the backing cache.
    async fn flush_all(&self) -> Result<(), SessionStoreError>;

    /// Writes and reads back a fixed test key.
    async fn probe(&self) -> Result<ProbeReport, SessionStoreError>;
}

pub(crate) fn encode(record: &SessionRecord) -> Result<String, SessionStoreError> {
    serde_json::to_string(record).map_err(SessionStoreError::Encode)
}

pub(crate) fn decode(key: &str, raw: &str) -> Result<SessionRecord, SessionStoreError> {
    serde_json::from_str(raw).map_err(|e| SessionStoreError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
