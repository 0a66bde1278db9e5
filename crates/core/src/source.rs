//! Read-only view of the sequencer and its job contracts.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::{Network, Window};

/// Source of truth for networks, windows, jobs and chain height.
///
/// Every method maps onto one or more read-only contract calls; nothing here
/// writes to the chain. Implementations are expected to be cheap to share
/// across tasks.
#[async_trait]
pub trait SequencerSource: Send + Sync {
    /// All registered networks (`numNetworks` + `networkAt(i)`).
    async fn networks(&self) -> Result<Vec<Network>, SourceError>;

    /// The designated master network (`getMaster`).
    async fn master_network(&self) -> Result<Network, SourceError>;

    /// Window assigned to `network` (`windows(network)`).
    async fn window(&self, network: &Network) -> Result<Window, SourceError>;

    /// Cycle length in blocks (`totalWindowSize`).
    async fn total_window_size(&self) -> Result<u64, SourceError>;

    /// Registered job contract addresses (`numJobs` + `jobAt(i)`).
    async fn job_addresses(&self) -> Result<Vec<String>, SourceError>;

    /// Whether `job` is currently workable for `network` (`workable(network)`).
    async fn workable(&self, job: &str, network: &Network) -> Result<bool, SourceError>;

    /// Latest block height.
    async fn current_block(&self) -> Result<u64, SourceError>;
}
