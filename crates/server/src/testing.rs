//! Test doubles shared by the server tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use keepwatch_cache::MemoryCache;
use keepwatch_core::{Network, SequencerSource, SourceError, Window};
use keepwatch_monitor::{CachedCatalog, ConcurrentProbe, JobService, MemoryStateStore};
use keepwatch_notify::LogSink;

/// One network covering the whole cycle, two jobs, chain head at block 100.
#[derive(Default)]
pub struct FixedSource {
    pub workable: HashSet<String>,
    pub down: AtomicBool,
    pub network_reads: AtomicUsize,
}

impl FixedSource {
    pub fn with_workable(job: &str) -> Self {
        Self {
            workable: [job.to_string()].into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn network_reads(&self) -> usize {
        self.network_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SequencerSource for FixedSource {
    async fn networks(&self) -> Result<Vec<Network>, SourceError> {
        self.network_reads.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(SourceError::rpc("numNetworks", "connection refused"));
        }
        Ok(vec![Network::from("network1")])
    }

    async fn master_network(&self) -> Result<Network, SourceError> {
        Ok(Network::from("network1"))
    }

    async fn window(&self, _network: &Network) -> Result<Window, SourceError> {
        Ok(Window::new(0, 10))
    }

    async fn total_window_size(&self) -> Result<u64, SourceError> {
        Ok(10)
    }

    async fn job_addresses(&self) -> Result<Vec<String>, SourceError> {
        Ok(vec!["job1".to_string(), "job2".to_string()])
    }

    async fn workable(&self, job: &str, _network: &Network) -> Result<bool, SourceError> {
        Ok(self.workable.contains(job))
    }

    async fn current_block(&self) -> Result<u64, SourceError> {
        Ok(100)
    }
}

/// Service over `source` with an expire-immediately catalog cache, so every
/// check reads the source.
pub fn service(source: Arc<FixedSource>) -> JobService {
    let catalog = Arc::new(CachedCatalog::new(
        source.clone(),
        Arc::new(MemoryCache::default()),
        Duration::ZERO,
    ));
    JobService::new(
        catalog,
        Arc::new(ConcurrentProbe::new(source.clone())),
        Arc::new(MemoryStateStore::new()),
        source,
        Arc::new(LogSink),
    )
}
