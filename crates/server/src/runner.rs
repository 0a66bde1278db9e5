//! Periodic check loop for `keepwatch serve`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::state::Checker;

/// Run a check every `every` until `shutdown` flips or its sender is dropped.
///
/// The first check runs immediately. A check that overruns the interval
/// delays the next one instead of stacking up.
pub async fn run_periodic(checker: Arc<Checker>, every: Duration, mut shutdown: watch::Receiver<bool>) {
    let every = every.max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(interval_secs = every.as_secs(), "Periodic checks started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match checker.run_once().await {
                    Ok(report) => info!(
                        run_id = %report.run_id,
                        jobs = report.jobs.len(),
                        alerts = report.alerts_sent,
                        "Periodic check finished"
                    ),
                    Err(e) => error!(error = %e, "Periodic check failed"),
                }
            }
            _ = shutdown.changed() => break,
        }
    }

    info!("Periodic checks stopped");
}
