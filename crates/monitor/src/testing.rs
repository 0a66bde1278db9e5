//! In-memory `SequencerSource` for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;

use keepwatch_core::{Network, SequencerSource, SourceError, Window};

#[derive(Default)]
pub struct StubSource {
    networks: Vec<Network>,
    windows: HashMap<Network, Window>,
    master: Option<Network>,
    total_window_size: u64,
    jobs: Vec<String>,
    workable: HashSet<(String, Network)>,
    broken_probes: HashSet<(String, Network)>,
    fail_networks: bool,
    block: AtomicU64,
    pub network_reads: AtomicUsize,
    pub job_reads: AtomicUsize,
    pub probe_calls: AtomicUsize,
    pub block_reads: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network(mut self, id: &str, window: Window) -> Self {
        let network = Network::from(id);
        self.networks.push(network.clone());
        self.windows.insert(network, window);
        self
    }

    /// Registered network whose window read fails.
    pub fn with_unknown_network(mut self, id: &str) -> Self {
        self.networks.push(Network::from(id));
        self
    }

    pub fn with_master(mut self, id: &str) -> Self {
        self.master = Some(Network::from(id));
        self
    }

    pub fn with_total_window_size(mut self, total: u64) -> Self {
        self.total_window_size = total;
        self
    }

    pub fn with_job(mut self, address: &str) -> Self {
        self.jobs.push(address.to_string());
        self
    }

    pub fn workable_on(mut self, job: &str, network: &str) -> Self {
        self.workable.insert((job.to_string(), Network::from(network)));
        self
    }

    pub fn broken_on(mut self, job: &str, network: &str) -> Self {
        self.broken_probes.insert((job.to_string(), Network::from(network)));
        self
    }

    pub fn failing_networks(mut self) -> Self {
        self.fail_networks = true;
        self
    }

    pub fn at_block(self, block: u64) -> Self {
        self.block.store(block, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl SequencerSource for StubSource {
    async fn networks(&self) -> Result<Vec<Network>, SourceError> {
        self.network_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_networks {
            return Err(SourceError::rpc("numNetworks", "connection refused"));
        }
        Ok(self.networks.clone())
    }

    async fn master_network(&self) -> Result<Network, SourceError> {
        self.master
            .clone()
            .ok_or_else(|| SourceError::rpc("getMaster", "execution reverted"))
    }

    async fn window(&self, network: &Network) -> Result<Window, SourceError> {
        self.windows
            .get(network)
            .copied()
            .ok_or_else(|| SourceError::rpc("windows", "execution reverted"))
    }

    async fn total_window_size(&self) -> Result<u64, SourceError> {
        Ok(self.total_window_size)
    }

    async fn job_addresses(&self) -> Result<Vec<String>, SourceError> {
        self.job_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.jobs.clone())
    }

    async fn workable(&self, job: &str, network: &Network) -> Result<bool, SourceError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        let pair = (job.to_string(), network.clone());
        if self.broken_probes.contains(&pair) {
            return Err(SourceError::rpc("workable", "execution reverted"));
        }
        Ok(self.workable.contains(&pair))
    }

    async fn current_block(&self) -> Result<u64, SourceError> {
        self.block_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.block.load(Ordering::SeqCst))
    }
}
