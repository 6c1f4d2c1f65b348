//! In-memory `SessionStore` for tests. Records are kept serialized so the
//! decode path behaves exactly like the Redis adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::session::SessionRecord;
use crate::session::{decode, encode, ProbeReport, SessionStore, SessionStoreError};

#[derive(Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an arbitrary blob, bypassing encoding.
    pub async fn insert_raw(&self, key: &str, raw: &str) {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), raw.to_string());
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, key: &str, record: &SessionRecord) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(key) {
            return Err(SessionStoreError::AlreadyExists(key.to_string()));
        }
        let mut stored = record.clone();
        stored.version = 0;
        entries.insert(key.to_string(), encode(&stored)?);
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<SessionRecord, SessionStoreError> {
        let entries = self.entries.lock().await;
        let raw = entries
            .get(key)
            .ok_or_else(|| SessionStoreError::NotFound(key.to_string()))?;
        decode(key, raw)
    }

    async fn write(&self, key: &str, record: &SessionRecord) -> Result<u64, SessionStoreError> {
        let mut entries = self.entries.lock().await;
        let raw = entries
            .get(key)
            .ok_or_else(|| SessionStoreError::NotFound(key.to_string()))?;
        let current = decode(key, raw)?;
        if current.version != record.version {
            return Err(SessionStoreError::Conflict(key.to_string()));
        }
        let mut next = record.clone();
        next.version += 1;
        entries.insert(key.to_string(), encode(&next)?);
        Ok(next.version)
    }

    async fn delete(&self, key: &str) -> Result<(), SessionStoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn flush_all(&self) -> Result<(), SessionStoreError> {
        self.entries.lock().await.clear();
        Ok(())
    }

    async fn probe(&self) -> Result<ProbeReport, SessionStoreError> {
        Ok(ProbeReport {
            set_key: "test_key".to_string(),
            set_value: "Hello, Redis!".to_string(),
            retrieved_value: Some("Hello, Redis!".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session::{ChatTurn, Role};
    use chrono::Utc;

    fn record() -> SessionRecord {
        SessionRecord::seeded(
            "DS",
            "TECHNICAL",
            "resume".to_string(),
            "rules".to_string(),
            None,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_existing_key() {
        let store = InMemorySessionStore::new();
        store.create("k", &record()).await.unwrap();
        let err = store.create("k", &record()).await.unwrap_err();
        assert!(matches!(err, SessionStoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_read_twice_without_write_is_identical() {
        let store = InMemorySessionStore::new();
        store.create("k", &record()).await.unwrap();
        let first = store.read("k").await.unwrap();
        let second = store.read("k").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let store = InMemorySessionStore::new();
        let err = store.read("nope").await.unwrap_err();
        assert!(matches!(err, SessionStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_distinct_from_absence() {
        let store = InMemorySessionStore::new();
        store.insert_raw("k", "{not json").await;
        let err = store.read("k").await.unwrap_err();
        assert!(matches!(err, SessionStoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_write_bumps_version_and_rejects_stale_writer() {
        let store = InMemorySessionStore::new();
        store.create("k", &record()).await.unwrap();

        let mut a = store.read("k").await.unwrap();
        let mut b = store.read("k").await.unwrap();

        a.chat_history.push(ChatTurn::new(Role::User, "first"));
        assert_eq!(store.write("k", &a).await.unwrap(), 1);

        b.chat_history.push(ChatTurn::new(Role::User, "second"));
        let err = store.write("k", &b).await.unwrap_err();
        assert!(matches!(err, SessionStoreError::Conflict(_)));

        let stored = store.read("k").await.unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.chat_history.last().unwrap().content, "first");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemorySessionStore::new();
        store.create("k", &record()).await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert!(!store.contains("k").await);
    }
}
