//! Asks every job whether it is workable on each relevant network.
//!
//! The full job × network cross product is probed concurrently and settled
//! as a batch: a failing pair is recorded as [`ProbeOutcome::Failed`] and
//! never aborts the others.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use keepwatch_core::{Job, Network, SequencerSource};

use crate::error::MonitorError;

#[async_trait]
pub trait WorkabilityProbe: Send + Sync {
    /// Jobs that are workable right now on any of `networks`.
    ///
    /// Only actionable jobs are returned; idle and failed pairs are dropped.
    async fn workable_jobs(&self, networks: &[Network]) -> Result<Vec<Job>, MonitorError>;
}

/// Settled result of one `workable` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Workable,
    Idle,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub job: String,
    pub network: Network,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    /// `Some(job)` when the pair is actionable.
    pub fn into_workable(self) -> Option<Job> {
        match self.outcome {
            ProbeOutcome::Workable => Some(Job::new(self.job, self.network, true)),
            ProbeOutcome::Idle | ProbeOutcome::Failed { .. } => None,
        }
    }
}

/// [`WorkabilityProbe`] that fans out over a [`SequencerSource`].
pub struct ConcurrentProbe {
    source: Arc<dyn SequencerSource>,
    /// Max calls in flight; 0 = all at once.
    concurrency: usize,
}

impl ConcurrentProbe {
    pub fn new(source: Arc<dyn SequencerSource>) -> Self {
        Self {
            source,
            concurrency: 0,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Probe every (job, network) pair, job-major, returning one result per pair.
    pub async fn probe_all(&self, jobs: &[String], networks: &[Network]) -> Vec<ProbeResult> {
        let pairs: Vec<(String, Network)> = jobs
            .iter()
            .flat_map(|job| networks.iter().map(move |network| (job.clone(), network.clone())))
            .collect();
        if pairs.is_empty() {
            return Vec::new();
        }

        let limit = if self.concurrency == 0 {
            pairs.len()
        } else {
            self.concurrency
        };

        stream::iter(pairs)
            .map(|(job, network)| async move {
                let outcome = match self.source.workable(&job, &network).await {
                    Ok(true) => ProbeOutcome::Workable,
                    Ok(false) => ProbeOutcome::Idle,
                    Err(e) => ProbeOutcome::Failed {
                        reason: e.to_string(),
                    },
                };
                ProbeResult {
                    job,
                    network,
                    outcome,
                }
            })
            .buffered(limit)
            .collect()
            .await
    }
}

#[async_trait]
impl WorkabilityProbe for ConcurrentProbe {
    async fn workable_jobs(&self, networks: &[Network]) -> Result<Vec<Job>, MonitorError> {
        if networks.is_empty() {
            return Ok(Vec::new());
        }

        let jobs = self.source.job_addresses().await?;
        if jobs.is_empty() {
            info!("No jobs registered");
            return Ok(Vec::new());
        }

        let results = self.probe_all(&jobs, networks).await;
        let total = results.len();
        let mut failed = 0usize;
        let mut workable = Vec::new();
        for result in results {
            if let ProbeOutcome::Failed { reason } = &result.outcome {
                failed += 1;
                warn!(
                    job = %result.job,
                    network = %result.network.label(),
                    reason = %reason,
                    "Workable probe failed"
                );
                continue;
            }
            if let Some(job) = result.into_workable() {
                debug!(job = %job.address, network = %job.network.label(), "Job is workable");
                workable.push(job);
            }
        }

        info!(
            jobs = jobs.len(),
            networks = networks.len(),
            probes = total,
            workable = workable.len(),
            failed,
            "Probe batch settled"
        );
        Ok(workable)
    }
}
