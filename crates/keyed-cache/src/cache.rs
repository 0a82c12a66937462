//! The Keyed Cache: a thin wrapper around a Redis-shaped
//! string-keyed store. `GET`/`SET`/`DEL`/`EXISTS`/`KEYS` map directly onto
//! the equivalent Redis commands; `PIPELINE` bundles N `SET`s into a
//! single round-trip with no per-op recovery on partial failure.

use crate::error::CacheError;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Client for the Keyed Cache. Holds a `ConnectionManager`, which
/// transparently reconnects and multiplexes requests over one connection.
#[derive(Clone)]
pub struct KeyedCache {
    conn: ConnectionManager,
}

impl KeyedCache {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }

    /// `GET(k)`.
    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    /// `SET(k, v, no-expiry)`.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    /// `DEL(k...)`, returns the number of keys actually removed.
    pub async fn del(&self, keys: &[&str]) -> Result<u64, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        Ok(conn.del(keys).await?)
    }

    /// `EXISTS(k)`.
    pub async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        Ok(conn.exists(key).await?)
    }

    /// `KEYS(pattern)`. Used only by the stats/clear paths outside this
    /// core; not on the Keyed-Cache Import Pipeline's hot path.
    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.conn.clone();
        Ok(conn.keys(pattern).await?)
    }

    /// `PIPELINE(ops)`: bundles N `SET`s into a single round-trip.
    /// Partial failure of the pipeline surfaces as one error; callers do
    /// not get per-op results to retry individually.
    pub async fn pipeline_set(&self, entries: &[(String, String)]) -> Result<(), CacheError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        for (key, value) in entries {
            pipe.set(key, value).ignore();
        }
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::PipelineFailed(e.to_string()))?;
        Ok(())
    }

    /// `INFO("memory")`: a parseable text report (used by stats outside
    /// this core).
    pub async fn info_memory(&self) -> Result<String, CacheError> {
        let mut conn = self.conn.clone();
        let info: String = redis::cmd("INFO")
            .arg("memory")
            .query_async(&mut conn)
            .await?;
        Ok(info)
    }
}

/// Cache key for an SDE item: `sde:<family>:<key>`.
pub fn family_item_key(family: &str, key: &str) -> String {
    format!("sde:{family}:{key}")
}

/// Cache key for the last-import metadata timestamp.
pub const LAST_IMPORT_KEY: &str = "sde:metadata:last_import";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_item_key_is_namespaced() {
        assert_eq!(family_item_key("agents", "3008416"), "sde:agents:3008416");
    }
}
