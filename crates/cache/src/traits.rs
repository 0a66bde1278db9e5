use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// Key/value store with per-entry expiry.
///
/// Values are opaque strings (callers store JSON). The trait says nothing
/// about read-through: callers decide when to fall back to the source of
/// truth, see [`crate::read_through`].
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Fetch a live entry. Expired or missing keys yield `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Short backend name for logs (e.g. "redis", "memory").
    fn backend_name(&self) -> &str;
}
