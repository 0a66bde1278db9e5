//! HTTP webhook sink.
//!
//! Posts alerts to a chat webhook (Discord-compatible `{"content": ...}`
//! payload by default) or, in `json` format, the whole notification.

use std::time::Duration;

use keepwatch_core::config::WebhookFormat;

use crate::traits::{AlertSink, Notification, NotifyError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers alerts as JSON over HTTP POST to a configured endpoint.
///
/// Environment variable references (`${VAR_NAME}`) in the URL are resolved
/// at construction time, so a URL kept out of config files still works.
#[derive(Debug)]
pub struct WebhookSink {
    /// Target URL (env vars already resolved). Never logged in full.
    url: String,
    format: WebhookFormat,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl WebhookSink {
    /// Create a new webhook sink.
    ///
    /// Missing env vars or a URL that does not parse produce a
    /// [`NotifyError::Config`] error.
    pub fn new(url: &str, format: WebhookFormat) -> Result<Self, NotifyError> {
        let resolved = resolve_env_vars(url)?;
        reqwest::Url::parse(&resolved)
            .map_err(|e| NotifyError::Config(format!("invalid webhook url: {e}")))?;
        Ok(Self {
            url: resolved,
            format,
            client: http_client(DEFAULT_TIMEOUT)?,
        })
    }

    /// Bound each request (connect through response) by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, NotifyError> {
        self.client = http_client(timeout)?;
        Ok(self)
    }

    fn payload(&self, notification: &Notification) -> serde_json::Value {
        match self.format {
            WebhookFormat::Discord => serde_json::json!({ "content": notification.body }),
            WebhookFormat::Json => {
                serde_json::to_value(notification).unwrap_or(serde_json::Value::Null)
            }
        }
    }

    /// Scheme and host only, safe to log.
    pub fn redacted_url(&self) -> String {
        match reqwest::Url::parse(&self.url) {
            Ok(u) => format!("{}://{}", u.scheme(), u.host_str().unwrap_or("?")),
            Err(_) => "<invalid>".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl AlertSink for WebhookSink {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.payload(notification))
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(
                url = %self.redacted_url(),
                %status,
                body = %body_text,
                "webhook returned non-2xx status"
            );
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: body_text,
            });
        }

        tracing::debug!(
            url = %self.redacted_url(),
            status = %status,
            "webhook alert delivered"
        );

        Ok(())
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}

/// Resolve `${VAR_NAME}` patterns in a string using `std::env::var`.
///
/// Returns an error if a referenced variable is not set.
fn resolve_env_vars(input: &str) -> Result<String, NotifyError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                var_name.push(c);
            }
            if !closed {
                return Err(NotifyError::Config(
                    "unclosed env var reference in webhook url".to_string(),
                ));
            }
            let value = std::env::var(&var_name).map_err(|_| {
                NotifyError::Config(format!("env var not found: {var_name}"))
            })?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, NotifyError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}
