//! Builds the monitor from configuration.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use keepwatch_cache::{CacheLayer, MemoryCache, RedisCache};
use keepwatch_chain::SequencerClient;
use keepwatch_core::config::{AlertConfig, CacheBackend, CacheConfig};
use keepwatch_core::{Config, SequencerSource};
use keepwatch_monitor::{CacheStateStore, CachedCatalog, ConcurrentProbe, JobService, NetworkCatalog};
use keepwatch_notify::{AlertSink, Dispatcher, LogSink, TemplateRenderer, WebhookSink};

use crate::state::Checker;

pub struct Components {
    pub checker: Arc<Checker>,
    pub catalog: Arc<dyn NetworkCatalog>,
}

/// Wire chain client, cache, state store and alert sinks.
///
/// Invalid endpoints, addresses, webhook URLs or templates fail here. An
/// unreachable Redis does not: the connection is made on first use.
pub fn build(config: &Config) -> anyhow::Result<Components> {
    let client = SequencerClient::connect(&config.chain).context("sequencer client")?;
    let source: Arc<dyn SequencerSource> = Arc::new(client);

    let cache = build_cache(&config.cache)?;
    let catalog: Arc<dyn NetworkCatalog> = Arc::new(CachedCatalog::new(
        source.clone(),
        cache.clone(),
        config.cache.ttl(),
    ));
    let probe = Arc::new(
        ConcurrentProbe::new(source.clone()).with_concurrency(config.monitor.probe_concurrency),
    );
    let store = Arc::new(CacheStateStore::new(cache, config.cache.job_state_ttl()));
    let sink = build_sink(&config.alert)?;
    let renderer =
        TemplateRenderer::new(config.alert.template.clone()).context("alert template")?;

    let service = JobService::new(catalog.clone(), probe, store, source, sink)
        .with_config(&config.monitor)
        .with_renderer(renderer)
        .with_alert_timeout(config.alert.timeout());

    Ok(Components {
        checker: Arc::new(Checker::new(service)),
        catalog,
    })
}

fn build_cache(config: &CacheConfig) -> anyhow::Result<Arc<dyn CacheLayer>> {
    match config.backend {
        CacheBackend::Redis => {
            let cache = RedisCache::new(&config.redis_url).context("redis url")?;
            info!("Using redis cache");
            Ok(Arc::new(cache))
        }
        CacheBackend::Memory => {
            warn!(
                capacity = config.memory_capacity,
                "Using in-memory cache; job state will not survive a restart"
            );
            Ok(Arc::new(MemoryCache::new(config.memory_capacity)))
        }
    }
}

fn build_sink(config: &AlertConfig) -> anyhow::Result<Arc<dyn AlertSink>> {
    let mut dispatcher = Dispatcher::empty();
    match &config.webhook_url {
        Some(url) => {
            let webhook = WebhookSink::new(url, config.webhook_format)
                .and_then(|sink| sink.with_timeout(config.timeout()))
                .context("alert webhook")?;
            info!(webhook = %webhook.redacted_url(), format = %config.webhook_format, "Alert webhook configured");
            dispatcher.add_channel(Box::new(webhook));
        }
        None => {
            warn!("DISCORD_WEBHOOK_URL not set, alerts will only be logged");
            dispatcher.add_channel(Box::new(LogSink));
        }
    }
    Ok(Arc::new(dispatcher))
}
