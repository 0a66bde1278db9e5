//! Cached view of the sequencer's network registry.
//!
//! Every read goes through [`read_through`] with the catalog TTL. Entries are
//! cached independently, so two reads in the same invocation can see the
//! registry at different points in time.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use keepwatch_cache::{read_through, CacheLayer};
use keepwatch_core::{Network, SequencerSource, SourceError, Window};

pub const NETWORKS_KEY: &str = "networks";
pub const MASTER_NETWORK_KEY: &str = "masterNetwork";
pub const TOTAL_WINDOW_SIZE_KEY: &str = "totalWindowSize";

pub fn window_key(network: &Network) -> String {
    format!("window-{network}")
}

/// Registry reads the monitor depends on.
#[async_trait]
pub trait NetworkCatalog: Send + Sync {
    async fn list_networks(&self) -> Result<Vec<Network>, SourceError>;
    async fn master(&self) -> Result<Network, SourceError>;
    async fn window(&self, network: &Network) -> Result<Window, SourceError>;
    async fn total_window_size(&self) -> Result<u64, SourceError>;
}

/// [`NetworkCatalog`] backed by a [`SequencerSource`] with a cache in front.
pub struct CachedCatalog {
    source: Arc<dyn SequencerSource>,
    cache: Arc<dyn CacheLayer>,
    ttl: Duration,
}

impl CachedCatalog {
    pub fn new(source: Arc<dyn SequencerSource>, cache: Arc<dyn CacheLayer>, ttl: Duration) -> Self {
        Self { source, cache, ttl }
    }
}

#[async_trait]
impl NetworkCatalog for CachedCatalog {
    async fn list_networks(&self) -> Result<Vec<Network>, SourceError> {
        read_through(self.cache.as_ref(), NETWORKS_KEY, self.ttl, || self.source.networks()).await
    }

    async fn master(&self) -> Result<Network, SourceError> {
        read_through(self.cache.as_ref(), MASTER_NETWORK_KEY, self.ttl, || {
            self.source.master_network()
        })
        .await
    }

    async fn window(&self, network: &Network) -> Result<Window, SourceError> {
        read_through(self.cache.as_ref(), &window_key(network), self.ttl, || {
            self.source.window(network)
        })
        .await
    }

    async fn total_window_size(&self) -> Result<u64, SourceError> {
        read_through(self.cache.as_ref(), TOTAL_WINDOW_SIZE_KEY, self.ttl, || {
            self.source.total_window_size()
        })
        .await
    }
}

/// One network with its window, as shown by `keepwatch networks`.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkEntry {
    pub network: Network,
    pub label: String,
    /// `None` when the window read failed.
    pub window: Option<Window>,
}

/// Point-in-time dump of the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    pub master: Option<Network>,
    pub total_window_size: u64,
    pub networks: Vec<NetworkEntry>,
}

impl CatalogSnapshot {
    /// Read the whole catalog. Network list and cycle size are required;
    /// the master network and individual windows are best-effort.
    pub async fn collect(catalog: &dyn NetworkCatalog) -> Result<Self, SourceError> {
        let networks = catalog.list_networks().await?;
        let total_window_size = catalog.total_window_size().await?;
        let master = match catalog.master().await {
            Ok(m) => Some(m),
            Err(e) => {
                warn!(error = %e, "Could not read master network");
                None
            }
        };

        let windows = join_all(networks.iter().map(|n| catalog.window(n))).await;
        let networks = networks
            .into_iter()
            .zip(windows)
            .map(|(network, window)| {
                let window = match window {
                    Ok(w) => Some(w),
                    Err(e) => {
                        warn!(network = %network.label(), error = %e, "Could not read window");
                        None
                    }
                };
                NetworkEntry {
                    label: network.label(),
                    network,
                    window,
                }
            })
            .collect();

        Ok(Self {
            master,
            total_window_size,
            networks,
        })
    }
}
