//! Minijinja template rendering for alert messages.
//!
//! The template is checked once at construction by rendering it against a
//! sample context, so a typo in `ALERT_TEMPLATE` fails startup instead of
//! silently dropping alerts later.

use keepwatch_core::config::DEFAULT_ALERT_TEMPLATE;

use crate::traits::NotifyError;

/// Values available to alert templates.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AlertContext {
    /// Job contract address.
    pub job: String,
    /// Network identifier as stored on chain.
    pub network: String,
    /// Decoded network name when the id is padded ASCII, else the raw id.
    pub network_label: String,
    /// Configured alert threshold in blocks.
    pub threshold: u64,
    pub current_block: u64,
    /// Block at which the job last changed workability.
    pub last_change_block: u64,
    /// `current_block - last_change_block`.
    pub blocks_inactive: u64,
}

impl AlertContext {
    fn sample() -> Self {
        Self {
            job: "0x0000000000000000000000000000000000000001".to_string(),
            network: "network1".to_string(),
            network_label: "network1".to_string(),
            threshold: 10,
            current_block: 100,
            last_change_block: 89,
            blocks_inactive: 11,
        }
    }
}

/// Renders the alert message template.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    template: String,
}

impl TemplateRenderer {
    /// Compile-check `template` and keep it for later renders.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Template`] on syntax errors or references to
    /// variables that [`AlertContext`] does not provide.
    pub fn new(template: impl Into<String>) -> Result<Self, NotifyError> {
        let renderer = Self {
            template: template.into(),
        };
        renderer.render(&AlertContext::sample())?;
        Ok(renderer)
    }

    /// Build a configured minijinja environment with custom filters.
    fn build_env() -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        env.add_filter("short", short_filter);
        env
    }

    /// Render the template with the given context.
    pub fn render(&self, ctx: &AlertContext) -> Result<String, NotifyError> {
        let env = Self::build_env();
        env.render_str(&self.template, ctx)
            .map_err(|e| NotifyError::Template(e.to_string()))
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self {
            template: DEFAULT_ALERT_TEMPLATE.to_string(),
        }
    }
}

/// Custom filter: abbreviate long hex ids to `0x1234…cdef`.
fn short_filter(value: String) -> String {
    if value.is_ascii() && value.starts_with("0x") && value.len() > 12 {
        format!("{}…{}", &value[..6], &value[value.len() - 4..])
    } else {
        value
    }
}
