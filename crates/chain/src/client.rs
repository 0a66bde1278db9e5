use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::transports::http::reqwest::Url;
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use futures::future::{join_all, try_join_all};
use tracing::{debug, info, warn};

use keepwatch_core::config::ChainConfig;
use keepwatch_core::{Network, SequencerSource, SourceError, Window};

use crate::contracts::{IJob, ISequencer};
use crate::convert::{network_from_b256, network_to_b256, parse_address, registry_len, to_u64};
use crate::error::ChainError;

pub type HttpProvider = RootProvider<Http<Client>>;

/// Read-only client for the sequencer contract and the jobs it registers.
///
/// Cheap to clone; the underlying HTTP provider is shared.
#[derive(Clone)]
pub struct SequencerClient {
    provider: HttpProvider,
    sequencer: Address,
}

impl SequencerClient {
    /// Validate the endpoint and sequencer address and build the provider.
    ///
    /// No request is sent here; an unreachable node shows up on the first
    /// call instead.
    pub fn connect(config: &ChainConfig) -> Result<Self, ChainError> {
        let url: Url = config
            .rpc_endpoint
            .parse::<Url>()
            .map_err(|e| ChainError::InvalidEndpoint {
                url: config.rpc_endpoint.clone(),
                reason: e.to_string(),
            })?;
        let sequencer = parse_address(&config.sequencer_address).map_err(|e| {
            ChainError::InvalidAddress {
                address: config.sequencer_address.clone(),
                reason: e.to_string(),
            }
        })?;

        let provider = ProviderBuilder::new().on_http(url);
        info!(sequencer = %sequencer, "Sequencer client ready");
        Ok(Self {
            provider,
            sequencer,
        })
    }

    pub fn sequencer_address(&self) -> Address {
        self.sequencer
    }

    fn sequencer(&self) -> ISequencer::ISequencerInstance<Http<Client>, &HttpProvider> {
        ISequencer::new(self.sequencer, &self.provider)
    }

    async fn num_networks(&self) -> Result<u64, SourceError> {
        let raw = self
            .sequencer()
            .numNetworks()
            .call()
            .await
            .map_err(|e| SourceError::rpc("numNetworks", e))?
            ._0;
        registry_len("numNetworks", raw)
    }

    async fn num_jobs(&self) -> Result<u64, SourceError> {
        let raw = self
            .sequencer()
            .numJobs()
            .call()
            .await
            .map_err(|e| SourceError::rpc("numJobs", e))?
            ._0;
        registry_len("numJobs", raw)
    }
}

#[async_trait]
impl SequencerSource for SequencerClient {
    async fn networks(&self) -> Result<Vec<Network>, SourceError> {
        let count = self.num_networks().await?;
        debug!(count, "Fetching networks from the sequencer contract");

        let seq = self.sequencer();
        let calls = (0..count).map(|i| {
            let seq = &seq;
            async move {
                seq.networkAt(U256::from(i))
                    .call()
                    .await
                    .map(|r| network_from_b256(r._0))
                    .map_err(|e| SourceError::rpc("networkAt", e))
            }
        });
        try_join_all(calls).await
    }

    async fn master_network(&self) -> Result<Network, SourceError> {
        let master = self
            .sequencer()
            .getMaster()
            .call()
            .await
            .map_err(|e| SourceError::rpc("getMaster", e))?
            ._0;
        Ok(network_from_b256(master))
    }

    async fn window(&self, network: &Network) -> Result<Window, SourceError> {
        let id = network_to_b256(network)?;
        let w = self
            .sequencer()
            .windows(id)
            .call()
            .await
            .map_err(|e| SourceError::rpc("windows", e))?;
        Ok(Window::new(
            to_u64("window.start", w.start)?,
            to_u64("window.length", w.length)?,
        ))
    }

    async fn total_window_size(&self) -> Result<u64, SourceError> {
        let raw = self
            .sequencer()
            .totalWindowSize()
            .call()
            .await
            .map_err(|e| SourceError::rpc("totalWindowSize", e))?
            ._0;
        to_u64("totalWindowSize", raw)
    }

    /// `numJobs` must succeed; individual `jobAt` failures are dropped.
    async fn job_addresses(&self) -> Result<Vec<String>, SourceError> {
        let count = self.num_jobs().await?;

        let seq = self.sequencer();
        let calls = (0..count).map(|i| {
            let seq = &seq;
            async move { (i, seq.jobAt(U256::from(i)).call().await) }
        });

        let mut jobs = Vec::new();
        for (index, result) in join_all(calls).await {
            match result {
                Ok(r) => jobs.push(format!("{}", r._0)),
                Err(e) => warn!(index, error = %e, "Error reading job address"),
            }
        }
        debug!(count, fetched = jobs.len(), "Fetched job addresses");
        Ok(jobs)
    }

    async fn workable(&self, job: &str, network: &Network) -> Result<bool, SourceError> {
        let address = parse_address(job)?;
        let id = network_to_b256(network)?;
        let result = IJob::new(address, &self.provider)
            .workable(id)
            .call()
            .await
            .map_err(|e| SourceError::rpc("workable", e))?;
        Ok(result.canWork)
    }

    async fn current_block(&self) -> Result<u64, SourceError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| SourceError::rpc("eth_blockNumber", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(rpc: &str, sequencer: &str) -> ChainConfig {
        ChainConfig {
            rpc_endpoint: rpc.to_string(),
            sequencer_address: sequencer.to_string(),
        }
    }

    #[test]
    fn connect_accepts_defaults() {
        let client = SequencerClient::connect(&config(
            keepwatch_core::config::DEFAULT_RPC_PROVIDER,
            keepwatch_core::config::DEFAULT_SEQUENCER_ADDRESS,
        ))
        .unwrap();
        assert_eq!(
            client.sequencer_address(),
            parse_address(keepwatch_core::config::DEFAULT_SEQUENCER_ADDRESS).unwrap()
        );
    }

    #[test]
    fn connect_rejects_bad_endpoint() {
        let err = SequencerClient::connect(&config(
            "not a url",
            keepwatch_core::config::DEFAULT_SEQUENCER_ADDRESS,
        ))
        .err()
        .unwrap();
        assert!(matches!(err, ChainError::InvalidEndpoint { .. }));
    }

    #[test]
    fn connect_rejects_bad_sequencer_address() {
        let err = SequencerClient::connect(&config("http://127.0.0.1:8545", "default"))
            .err()
            .unwrap();
        assert!(matches!(err, ChainError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn workable_rejects_non_address_job() {
        let client = SequencerClient::connect(&config(
            "http://127.0.0.1:1",
            keepwatch_core::config::DEFAULT_SEQUENCER_ADDRESS,
        ))
        .unwrap();
        let err = client
            .workable("job1", &Network::from("network1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn unreachable_node_is_an_rpc_error() {
        let client = SequencerClient::connect(&config(
            "http://127.0.0.1:1",
            keepwatch_core::config::DEFAULT_SEQUENCER_ADDRESS,
        ))
        .unwrap();
        let err = client.current_block().await.unwrap_err();
        assert!(matches!(err, SourceError::Rpc { call: "eth_blockNumber", .. }));
    }
}
