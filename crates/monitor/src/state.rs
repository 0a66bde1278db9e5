//! Persistence for per-job alerting state.
//!
//! Unlike catalog reads, job state is not an optimization: losing a write
//! changes when alerts fire. Store failures therefore surface as
//! [`MonitorError::StateStore`] instead of being logged and ignored.
//!
//! Writes are plain read-modify-write with no compare-and-swap. Two
//! invocations running at once against the same key can lose an update
//! (last write wins).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use keepwatch_cache::{CacheError, CacheLayer};
use keepwatch_core::{JobKey, JobState};

use crate::error::MonitorError;

#[async_trait]
pub trait JobStateStore: Send + Sync {
    /// Stored state for `key`, or a fresh state at `current_block` that is
    /// persisted before returning.
    async fn load_or_init(&self, key: &JobKey, current_block: u64) -> Result<JobState, MonitorError>;

    async fn save(&self, key: &JobKey, state: JobState) -> Result<(), MonitorError>;
}

/// Job state kept in a [`CacheLayer`] under `<jobAddress>-<network>`.
///
/// Every save refreshes the TTL, so state for jobs that stop being observed
/// eventually expires.
pub struct CacheStateStore {
    cache: Arc<dyn CacheLayer>,
    ttl: Duration,
}

impl CacheStateStore {
    pub fn new(cache: Arc<dyn CacheLayer>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    fn store_error(key: &JobKey, source: CacheError) -> MonitorError {
        MonitorError::StateStore {
            key: key.cache_key(),
            source,
        }
    }
}

#[async_trait]
impl JobStateStore for CacheStateStore {
    async fn load_or_init(&self, key: &JobKey, current_block: u64) -> Result<JobState, MonitorError> {
        let cache_key = key.cache_key();
        let raw = self
            .cache
            .get(&cache_key)
            .await
            .map_err(|e| Self::store_error(key, e))?;

        if let Some(raw) = raw {
            match serde_json::from_str::<JobState>(&raw) {
                Ok(state) => return Ok(state),
                Err(e) => warn!(key = %cache_key, error = %e, "Corrupt job state, starting over"),
            }
        }

        let state = JobState::fresh(current_block);
        debug!(key = %cache_key, current_block, "Initializing job state");
        self.save(key, state).await?;
        Ok(state)
    }

    async fn save(&self, key: &JobKey, state: JobState) -> Result<(), MonitorError> {
        let encoded = serde_json::to_string(&state)
            .map_err(|e| Self::store_error(key, CacheError::Serialize(e)))?;
        self.cache
            .set(&key.cache_key(), &encoded, self.ttl)
            .await
            .map_err(|e| Self::store_error(key, e))
    }
}

/// Process-local store; state is lost on restart.
#[derive(Default)]
pub struct MemoryStateStore {
    states: Mutex<HashMap<JobKey, JobState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn states(&self) -> MutexGuard<'_, HashMap<JobKey, JobState>> {
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, key: &JobKey) -> Option<JobState> {
        self.states().get(key).copied()
    }

    /// Seed a state, e.g. to resume from a known point.
    pub fn insert(&self, key: JobKey, state: JobState) {
        self.states().insert(key, state);
    }

    pub fn len(&self) -> usize {
        self.states().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl JobStateStore for MemoryStateStore {
    async fn load_or_init(&self, key: &JobKey, current_block: u64) -> Result<JobState, MonitorError> {
        Ok(*self
            .states()
            .entry(key.clone())
            .or_insert_with(|| JobState::fresh(current_block)))
    }

    async fn save(&self, key: &JobKey, state: JobState) -> Result<(), MonitorError> {
        self.states().insert(key.clone(), state);
        Ok(())
    }
}
