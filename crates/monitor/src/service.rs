//! One monitoring pass over every network and job.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use keepwatch_core::config::{MonitorConfig, NetworkMode};
use keepwatch_core::{Job, Network, SequencerSource, Window};
use keepwatch_notify::{AlertContext, AlertSink, Notification, TemplateRenderer};

use crate::catalog::NetworkCatalog;
use crate::error::MonitorError;
use crate::probe::WorkabilityProbe;
use crate::scheduler::WindowScheduler;
use crate::state::JobStateStore;
use crate::tracker::{Evaluation, JobStateTracker};

const DEFAULT_ALERT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one [`JobService::check_inactive_jobs`] call.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub run_id: Uuid,
    pub checked_at: DateTime<Utc>,
    /// `None` when there were no networks and the chain was not read.
    pub current_block: Option<u64>,
    pub relevant_networks: Vec<Network>,
    /// Workable jobs observed in this pass.
    pub jobs: Vec<Job>,
    /// Alerts raised. Delivery is not confirmed.
    pub alerts_sent: usize,
}

impl CheckReport {
    pub fn empty(run_id: Uuid) -> Self {
        Self {
            run_id,
            checked_at: Utc::now(),
            current_block: None,
            relevant_networks: Vec::new(),
            jobs: Vec::new(),
            alerts_sent: 0,
        }
    }
}

pub struct JobService {
    catalog: Arc<dyn NetworkCatalog>,
    probe: Arc<dyn WorkabilityProbe>,
    store: Arc<dyn JobStateStore>,
    chain: Arc<dyn SequencerSource>,
    sink: Arc<dyn AlertSink>,
    scheduler: WindowScheduler,
    tracker: JobStateTracker,
    network_mode: NetworkMode,
    renderer: TemplateRenderer,
    alert_timeout: Duration,
}

impl JobService {
    /// Service with default monitor settings and the default alert template.
    pub fn new(
        catalog: Arc<dyn NetworkCatalog>,
        probe: Arc<dyn WorkabilityProbe>,
        store: Arc<dyn JobStateStore>,
        chain: Arc<dyn SequencerSource>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        let config = MonitorConfig::default();
        Self {
            catalog,
            probe,
            store,
            chain,
            sink,
            scheduler: WindowScheduler::from_config(&config),
            tracker: JobStateTracker::new(config.alert_threshold_blocks),
            network_mode: config.network_mode,
            renderer: TemplateRenderer::default(),
            alert_timeout: DEFAULT_ALERT_TIMEOUT,
        }
    }

    pub fn with_config(mut self, config: &MonitorConfig) -> Self {
        self.scheduler = WindowScheduler::from_config(config);
        self.tracker = JobStateTracker::new(config.alert_threshold_blocks);
        self.network_mode = config.network_mode;
        self
    }

    pub fn with_renderer(mut self, renderer: TemplateRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Give up on a single alert delivery after `timeout`.
    pub fn with_alert_timeout(mut self, timeout: Duration) -> Self {
        self.alert_timeout = timeout;
        self
    }

    /// Run one pass: schedule networks, probe jobs, update state, raise alerts.
    ///
    /// Fails when the network list, current block, cycle size, or job list
    /// cannot be read, or when job state cannot be persisted. Individual
    /// window reads, probes and alert deliveries are allowed to fail.
    pub async fn check_inactive_jobs(&self) -> Result<CheckReport, MonitorError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("check_inactive_jobs", %run_id);
        self.run(run_id).instrument(span).await
    }

    async fn run(&self, run_id: Uuid) -> Result<CheckReport, MonitorError> {
        let networks = match self.network_mode {
            NetworkMode::All => self.catalog.list_networks().await?,
            NetworkMode::Master => vec![self.catalog.master().await?],
        };
        if networks.is_empty() {
            info!("No networks registered, nothing to check");
            return Ok(CheckReport::empty(run_id));
        }

        let (current_block, total) =
            tokio::try_join!(self.chain.current_block(), self.catalog.total_window_size())?;
        if total == 0 {
            return Err(MonitorError::EmptyCycle);
        }

        let windows = self.windows(&networks).await;
        let relevant = self.scheduler.relevant(current_block, total, &windows)?;
        info!(
            current_block,
            total_window_size = total,
            networks = networks.len(),
            relevant = relevant.len(),
            "Checking jobs"
        );

        let jobs = if relevant.is_empty() {
            Vec::new()
        } else {
            self.probe.workable_jobs(&relevant).await?
        };

        let mut alerts_sent = 0;
        for job in &jobs {
            let evaluation = self.tracker.observe(self.store.as_ref(), job, current_block).await?;
            if evaluation.alert {
                self.alert(job, &evaluation, current_block).await;
                alerts_sent += 1;
            }
        }

        info!(jobs = jobs.len(), alerts_sent, "Check complete");
        Ok(CheckReport {
            run_id,
            checked_at: Utc::now(),
            current_block: Some(current_block),
            relevant_networks: relevant,
            jobs,
            alerts_sent,
        })
    }

    /// Windows for every network, read concurrently. Networks whose window
    /// cannot be read are left out of this pass.
    async fn windows(&self, networks: &[Network]) -> Vec<(Network, Window)> {
        let reads = join_all(networks.iter().map(|n| self.catalog.window(n))).await;
        networks
            .iter()
            .zip(reads)
            .filter_map(|(network, read)| match read {
                Ok(window) => Some((network.clone(), window)),
                Err(e) => {
                    warn!(network = %network.label(), error = %e, "Skipping network, window unavailable");
                    None
                }
            })
            .collect()
    }

    /// Render and send one alert. Failures and timeouts are logged, never returned.
    async fn alert(&self, job: &Job, evaluation: &Evaluation, current_block: u64) {
        let ctx = AlertContext {
            job: job.address.clone(),
            network: job.network.to_string(),
            network_label: job.network.label(),
            threshold: self.tracker.threshold(),
            current_block,
            last_change_block: evaluation.state.last_change_block,
            blocks_inactive: evaluation.blocks_inactive,
        };
        let body = match self.renderer.render(&ctx) {
            Ok(body) => body,
            Err(e) => {
                warn!(job = %job.address, error = %e, "Could not render alert");
                return;
            }
        };

        info!(
            job = %job.address,
            network = %ctx.network_label,
            blocks_inactive = ctx.blocks_inactive,
            "Raising alert"
        );
        let notification = Notification::new(format!("Inactive job on {}", ctx.network_label), body)
            .with_meta("job", &ctx.job)
            .with_meta("network", &ctx.network)
            .with_meta("current_block", current_block)
            .with_meta("last_change_block", ctx.last_change_block);

        match tokio::time::timeout(self.alert_timeout, self.sink.send(&notification)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(
                job = %job.address,
                channel = self.sink.channel_name(),
                error = %e,
                "Alert delivery failed"
            ),
            Err(_) => warn!(
                job = %job.address,
                channel = self.sink.channel_name(),
                timeout_ms = self.alert_timeout.as_millis() as u64,
                "Alert delivery timed out"
            ),
        }
    }
}
