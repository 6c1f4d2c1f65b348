use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};
use tracing::{debug, info};

use crate::models::session::SessionRecord;
use crate::session::{
    decode, encode, ProbeReport, SessionStore, SessionStoreError, SESSION_FIELD,
};

const PROBE_KEY: &str = "test_key";
const PROBE_VALUE: &str = "Hello, Redis!";

/// Replaces the record only when the stored `version` matches ARGV[2].
/// Returns 1 on success, 0 on version mismatch, -1 if the key is gone, -2 if the blob is not JSON.
const CAS_SCRIPT: &str = r#"
local current = redis.call('HGET', KEYS[1], ARGV[1])
if not current then
    return -1
end
local ok, decoded = pcall(cjson.decode, current)
if not ok then
    return -2
end
local stored = tonumber(decoded['version']) or 0
if stored ~= tonumber(ARGV[2]) then
    return 0
end
redis.call('HSET', KEYS[1], ARGV[1], ARGV[3])
local ttl = tonumber(ARGV[4])
if ttl > 0 then
    redis.call('EXPIRE', KEYS[1], ttl)
end
return 1
"#;

/// Redis-backed session store. One hash per session, one field holding the JSON record.
#[derive(Clone)]
pub struct RedisSessionStore {
    con: MultiplexedConnection,
    /// Seconds before an untouched session expires. 0 disables expiry.
    ttl_secs: i64,
}

impl RedisSessionStore {
    pub async fn connect(client: &redis::Client, ttl_secs: u64) -> Result<Self, SessionStoreError> {
        let con = client.get_multiplexed_tokio_connection().await?;
        let ttl_secs = expire_seconds(ttl_secs);
        info!("Redis session store connected (ttl: {ttl_secs}s)");
        Ok(Self { con, ttl_secs })
    }

    async fn refresh_ttl(&self, con: &mut MultiplexedConnection, key: &str) -> Result<(), SessionStoreError> {
        if self.ttl_secs > 0 {
            let _: bool = con.expire(key, self.ttl_secs).await?;
        }
        Ok(())
    }
}

/// EXPIRE takes a signed count and deletes the key on a negative one, so
/// out-of-range values saturate instead of wrapping.
fn expire_seconds(ttl_secs: u64) -> i64 {
    i64::try_from(ttl_secs).unwrap_or(i64::MAX)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, key: &str, record: &SessionRecord) -> Result<(), SessionStoreError> {
        let mut stored = record.clone();
        stored.version = 0;
        let blob = encode(&stored)?;

        let mut con = self.con.clone();
        let created: bool = con.hset_nx(key, SESSION_FIELD, blob).await?;
        if !created {
            return Err(SessionStoreError::AlreadyExists(key.to_string()));
        }
        self.refresh_ttl(&mut con, key).await?;

        debug!("Created session {key}");
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<SessionRecord, SessionStoreError> {
        let mut con = self.con.clone();

        let kind: String = redis::cmd("TYPE").arg(key).query_async(&mut con).await?;
        match kind.as_str() {
            "hash" => {}
            "none" => return Err(SessionStoreError::NotFound(key.to_string())),
            other => {
                return Err(SessionStoreError::Corrupt {
                    key: key.to_string(),
                    reason: format!("expected a hash, found {other}"),
                })
            }
        }

        let raw: Option<String> = con.hget(key, SESSION_FIELD).await?;
        let raw = raw.ok_or_else(|| SessionStoreError::NotFound(key.to_string()))?;
        decode(key, &raw)
    }

    async fn write(&self, key: &str, record: &SessionRecord) -> Result<u64, SessionStoreError> {
        let expected = record.version;
        let mut next = record.clone();
        next.version = expected + 1;
        let blob = encode(&next)?;

        let mut con = self.con.clone();
        let outcome: i64 = Script::new(CAS_SCRIPT)
            .key(key)
            .arg(SESSION_FIELD)
            .arg(expected)
            .arg(blob)
            .arg(self.ttl_secs)
            .invoke_async(&mut con)
            .await?;

        match outcome {
            1 => {
                debug!("Wrote session {key} at version {}", next.version);
                Ok(next.version)
            }
            0 => Err(SessionStoreError::Conflict(key.to_string())),
            -1 => Err(SessionStoreError::NotFound(key.to_string())),
            _ => Err(SessionStoreError::Corrupt {
                key: key.to_string(),
                reason: "stored record is not valid JSON".to_string(),
            }),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), SessionStoreError> {
        let mut con = self.con.clone();
        let removed: i64 = con.del(key).await?;
        debug!("Deleted session {key} (removed: {removed})");
        Ok(())
    }

    async fn flush_all(&self) -> Result<(), SessionStoreError> {
        let mut con = self.con.clone();
        let _: () = redis::cmd("FLUSHALL").query_async(&mut con).await?;
        info!("Flushed all keys from Redis");
        Ok(())
    }

    async fn probe(&self) -> Result<ProbeReport, SessionStoreError> {
        let mut con = self.con.clone();
        let _: () = con.set(PROBE_KEY, PROBE_VALUE).await?;
        let retrieved_value: Option<String> = con.get(PROBE_KEY).await?;
        debug!("Redis probe read back {retrieved_value:?}");
        Ok(ProbeReport {
            set_key: PROBE_KEY.to_string(),
            set_value: PROBE_VALUE.to_string(),
            retrieved_value,
        })
    }
}
