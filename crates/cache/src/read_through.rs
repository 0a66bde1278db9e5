use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::traits::CacheLayer;

/// Cache-or-fetch for catalog-style reads.
///
/// The cache is only an optimization here: a failing or corrupt cache is
/// logged and treated as a miss, and a failed population is logged and
/// ignored. Only errors from `fetch` reach the caller.
pub async fn read_through<T, E, F, Fut>(
    cache: &dyn CacheLayer,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match cache.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                debug!(key, backend = cache.backend_name(), "Cache hit");
                return Ok(value);
            }
            Err(e) => warn!(key, error = %e, "Discarding undecodable cache entry"),
        },
        Ok(None) => info!(key, "Cache miss"),
        Err(e) => warn!(
            key,
            backend = cache.backend_name(),
            error = %e,
            "Cache read failed, falling back to source"
        ),
    }

    let value = fetch().await?;

    match serde_json::to_string(&value) {
        Ok(encoded) => {
            if let Err(e) = cache.set(key, &encoded, ttl).await {
                warn!(key, backend = cache.backend_name(), error = %e, "Cache population failed");
            }
        }
        Err(e) => warn!(key, error = %e, "Value not cacheable"),
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::error::CacheError;
    use crate::memory::MemoryCache;

    const TTL: Duration = Duration::from_secs(600);

    /// Cache whose every operation fails, as if the store were unreachable.
    struct DownCache;

    #[async_trait]
    impl CacheLayer for DownCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
        fn backend_name(&self) -> &str {
            "down"
        }
    }

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        value: u64,
    ) -> impl FnOnce() -> std::future::Ready<Result<u64, String>> {
        let calls = calls.clone();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(value))
        }
    }

    #[tokio::test]
    async fn miss_fetches_and_populates() {
        let cache = MemoryCache::new(8);
        let calls = Arc::new(AtomicUsize::new(0));

        let v = read_through(&cache, "totalWindowSize", TTL, counting_fetch(&calls, 48))
            .await
            .unwrap();
        assert_eq!(v, 48);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get("totalWindowSize").await.unwrap().as_deref(), Some("48"));
    }

    #[tokio::test]
    async fn hit_skips_fetch() {
        let cache = MemoryCache::new(8);
        cache.set("totalWindowSize", "48", TTL).await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let v = read_through(&cache, "totalWindowSize", TTL, counting_fetch(&calls, 99))
            .await
            .unwrap();
        assert_eq!(v, 48);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unreachable_cache_falls_back_to_source() {
        let calls = Arc::new(AtomicUsize::new(0));
        let v = read_through(&DownCache, "networks", TTL, counting_fetch(&calls, 7))
            .await
            .unwrap();
        assert_eq!(v, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn corrupt_entry_is_refetched_and_overwritten() {
        let cache = MemoryCache::new(8);
        cache.set("totalWindowSize", "{not json", TTL).await.unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let v = read_through(&cache, "totalWindowSize", TTL, counting_fetch(&calls, 48))
            .await
            .unwrap();
        assert_eq!(v, 48);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get("totalWindowSize").await.unwrap().as_deref(), Some("48"));
    }

    #[tokio::test]
    async fn fetch_error_propagates_and_nothing_is_cached() {
        let cache = MemoryCache::new(8);
        let result: Result<u64, String> =
            read_through(&cache, "networks", TTL, || async { Err("rpc down".to_string()) }).await;
        assert_eq!(result.unwrap_err(), "rpc down");
        assert!(cache.get("networks").await.unwrap().is_none());
    }
}
