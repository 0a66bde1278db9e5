//! Shared fakes for the monitor integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use keepwatch_cache::{CacheLayer, MemoryCache};
use keepwatch_core::config::MonitorConfig;
use keepwatch_core::{Network, SequencerSource, SourceError, Window};
use keepwatch_monitor::{CacheStateStore, CachedCatalog, ConcurrentProbe, JobService};
use keepwatch_notify::{AlertSink, Notification, NotifyError};

/// Sequencer with a fixed registry and a movable chain head.
#[derive(Default)]
pub struct FakeSequencer {
    pub networks: Vec<(Network, Window)>,
    pub total_window_size: u64,
    pub jobs: Vec<String>,
    pub workable: HashSet<(String, Network)>,
    pub failing: HashSet<(String, Network)>,
    pub block: AtomicU64,
    pub probes: AtomicUsize,
    pub block_reads: AtomicUsize,
}

impl FakeSequencer {
    pub fn set_block(&self, block: u64) {
        self.block.store(block, Ordering::SeqCst);
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SequencerSource for FakeSequencer {
    async fn networks(&self) -> Result<Vec<Network>, SourceError> {
        Ok(self.networks.iter().map(|(n, _)| n.clone()).collect())
    }

    async fn master_network(&self) -> Result<Network, SourceError> {
        self.networks
            .first()
            .map(|(n, _)| n.clone())
            .ok_or_else(|| SourceError::Other("no master".to_string()))
    }

    async fn window(&self, network: &Network) -> Result<Window, SourceError> {
        self.networks
            .iter()
            .find(|(n, _)| n == network)
            .map(|(_, w)| *w)
            .ok_or_else(|| SourceError::rpc("windows", "unknown network"))
    }

    async fn total_window_size(&self) -> Result<u64, SourceError> {
        Ok(self.total_window_size)
    }

    async fn job_addresses(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.jobs.clone())
    }

    async fn workable(&self, job: &str, network: &Network) -> Result<bool, SourceError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let pair = (job.to_string(), network.clone());
        if self.failing.contains(&pair) {
            return Err(SourceError::rpc("workable", "execution reverted"));
        }
        Ok(self.workable.contains(&pair))
    }

    async fn current_block(&self) -> Result<u64, SourceError> {
        self.block_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.block.load(Ordering::SeqCst))
    }
}

/// Sink that remembers every message body.
#[derive(Default)]
pub struct RecordingSink {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(notification.body.clone());
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "recording"
    }
}

/// job1 registered on network1, whose window spans the whole cycle.
pub fn single_job_sequencer(block: u64, can_work: bool) -> FakeSequencer {
    let network = Network::from("network1");
    let mut workable = HashSet::new();
    if can_work {
        workable.insert(("job1".to_string(), network.clone()));
    }
    let seq = FakeSequencer {
        networks: vec![(network, Window::new(0, 48))],
        total_window_size: 48,
        jobs: vec!["job1".to_string()],
        workable,
        ..FakeSequencer::default()
    };
    seq.set_block(block);
    seq
}

pub struct Harness {
    pub service: JobService,
    pub cache: Arc<MemoryCache>,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    pub async fn seed_state(&self, key: &str, json: &str) {
        self.cache
            .set(key, json, Duration::from_secs(3600))
            .await
            .unwrap();
    }

    pub async fn stored_state(&self, key: &str) -> Option<String> {
        self.cache.get(key).await.unwrap()
    }
}

/// Wire the real catalog, probe and cache-backed state store around `source`.
pub fn harness(source: Arc<FakeSequencer>, config: &MonitorConfig) -> Harness {
    let cache = Arc::new(MemoryCache::default());
    let sink = Arc::new(RecordingSink::default());
    let catalog = Arc::new(CachedCatalog::new(
        source.clone(),
        cache.clone(),
        Duration::from_secs(600),
    ));
    let probe = Arc::new(ConcurrentProbe::new(source.clone()));
    let store = Arc::new(CacheStateStore::new(cache.clone(), Duration::from_secs(7 * 24 * 3600)));
    let service = JobService::new(catalog, probe, store, source, sink.clone()).with_config(config);
    Harness {
        service,
        cache,
        sink,
    }
}
