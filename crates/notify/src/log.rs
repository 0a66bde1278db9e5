//! Sink that only writes alerts to the log.
//!
//! Used when no webhook is configured, so alerts are still visible.

use crate::traits::{AlertSink, Notification, NotifyError};

#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait::async_trait]
impl AlertSink for LogSink {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::warn!(
            subject = %notification.subject,
            metadata = ?notification.metadata,
            "ALERT: {}",
            notification.body
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "log"
    }
}
