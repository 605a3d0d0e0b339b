//! Backing store access
//!
//! The store is a key-value map plus one append-ordered list, reached over a
//! pooled connection. The pool is an explicit handle constructed once at
//! startup and passed into every ingest call; nothing here is process-global,
//! so tests can build an isolated [`MemoryStore`] instead.

mod memory;

pub use memory::*;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use deadpool_redis::redis::cmd;
use deadpool_redis::{Pool, Runtime};
use tracing::debug;

/// The four operations the ingest protocol needs from the backing store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the value stored under `key`; `None` means never ingested.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Map `key` to `value`.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove up to `count` occurrences of `value` from `list`.
    async fn lrem(&self, list: &str, count: isize, value: &str) -> Result<()>;

    /// Append `value` to the end of `list`.
    async fn rpush(&self, list: &str, value: &str) -> Result<()>;
}

/// Redis-backed store over a deadpool connection pool.
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Build the pool from config. `max_active` caps the pool size; deadpool
    /// keeps idle connections up to the same ceiling, so `max_idle` is
    /// validated against it at config load but not enforced separately.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let url = config.url()?;
        debug!("Building Redis pool for {}:{}", config.host, config.port);

        let pool = deadpool_redis::Config::from_url(url.as_str())
            .builder()
            .map_err(|e| Error::Store(e.to_string()))?
            .max_size(config.max_active)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| Error::Store(e.to_string()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.pool.get().await?;
        let value: Option<String> = cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let _: () = cmd("SET").arg(key).arg(value).query_async(&mut conn).await?;
        Ok(())
    }

    async fn lrem(&self, list: &str, count: isize, value: &str) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let _: () = cmd("LREM")
            .arg(list)
            .arg(count)
            .arg(value)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn rpush(&self, list: &str, value: &str) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let _: () = cmd("RPUSH").arg(list).arg(value).query_async(&mut conn).await?;
        Ok(())
    }
}
