//! Alert delivery for inactive keeper jobs.
//!
//! This crate provides:
//! - `AlertSink` trait for pluggable delivery channels
//! - Webhook (Discord-compatible) and log sink implementations
//! - Minijinja template rendering for alert messages
//! - Dispatcher that fans an alert out to every configured sink

pub mod dispatcher;
pub mod log;
pub mod templating;
pub mod traits;
pub mod webhook;

pub use dispatcher::Dispatcher;
pub use log::LogSink;
pub use templating::{AlertContext, TemplateRenderer};
pub use traits::{AlertSink, Notification, NotifyError};
pub use webhook::WebhookSink;
