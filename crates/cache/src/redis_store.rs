use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::CacheError;
use crate::traits::CacheLayer;

/// Redis-backed cache speaking plain `GET` / `SETEX`.
///
/// The connection is opened on first use. A failed connect leaves the cell
/// empty, so the next call tries again instead of poisoning the cache for
/// the lifetime of the process.
pub struct RedisCache {
    client: redis::Client,
    conn: OnceCell<MultiplexedConnection>,
}

impl RedisCache {
    /// Parse the connection URL. Does not touch the network.
    pub fn new(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let conn = self.client.get_multiplexed_async_connection().await?;
                info!("Redis cache connected");
                Ok::<_, CacheError>(conn)
            })
            .await?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl CacheLayer for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        debug!(key, hit = value.is_some(), "redis GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, seconds).await?;
        debug!(key, seconds, "redis SETEX");
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "redis"
    }
}
