//! Routes alerts to every configured channel.
//!
//! Individual channel failures don't block other channels.

use crate::traits::{AlertSink, DispatchResult, Notification, NotifyError};

/// Fans one alert out to multiple sinks.
pub struct Dispatcher {
    channels: Vec<Box<dyn AlertSink>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Box<dyn AlertSink>>) -> Self {
        Self { channels }
    }

    /// Create an empty dispatcher.
    pub fn empty() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    pub fn add_channel(&mut self, channel: Box<dyn AlertSink>) {
        self.channels.push(channel);
    }

    /// Deliver to every channel, returning one result per channel.
    pub async fn dispatch(&self, notification: &Notification) -> Vec<DispatchResult> {
        if self.channels.is_empty() {
            tracing::debug!("No alert channels configured");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let start = std::time::Instant::now();
            let result = channel.send(notification).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let (success, error) = match result {
                Ok(()) => {
                    tracing::info!(
                        channel = channel.channel_name(),
                        duration_ms,
                        "Alert delivered"
                    );
                    (true, None)
                }
                Err(e) => {
                    tracing::warn!(
                        channel = channel.channel_name(),
                        error = %e,
                        duration_ms,
                        "Alert delivery failed"
                    );
                    (false, Some(e.to_string()))
                }
            };

            results.push(DispatchResult {
                channel: channel.channel_name().to_string(),
                success,
                error,
                duration_ms,
            });
        }

        results
    }
}

#[async_trait::async_trait]
impl AlertSink for Dispatcher {
    /// Succeeds when at least one channel took the alert.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let results = self.dispatch(notification).await;
        if !results.is_empty() && results.iter().all(|r| !r.success) {
            return Err(NotifyError::AllChannelsFailed(results.len()));
        }
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "dispatcher"
    }
}
