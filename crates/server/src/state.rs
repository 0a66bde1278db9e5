use std::sync::Arc;

use keepwatch_monitor::{CheckReport, JobService, MonitorError};
use tokio::sync::Mutex;

/// Runs checks one at a time within this process.
///
/// Checks from other processes sharing the same state store are not
/// coordinated.
pub struct Checker {
    service: JobService,
    running: Mutex<()>,
}

impl Checker {
    pub fn new(service: JobService) -> Self {
        Self {
            service,
            running: Mutex::new(()),
        }
    }

    pub async fn run_once(&self) -> Result<CheckReport, MonitorError> {
        let _guard = self.running.lock().await;
        self.service.check_inactive_jobs().await
    }
}

pub struct AppState {
    pub checker: Arc<Checker>,
    /// Redacted config served on `GET /config`.
    pub config_summary: serde_json::Value,
}
