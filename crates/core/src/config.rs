use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_parse<T: FromStr>(profile: &str, key: &str, default: T) -> T {
    match profiled_env_opt(profile, key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "unrecognized value, using default");
            default
        }),
        None => default,
    }
}

pub const DEFAULT_RPC_PROVIDER: &str = "https://rpc.ankr.com/eth";
pub const DEFAULT_SEQUENCER_ADDRESS: &str = "0x238b4E35dAed6100C6162fAE4510261f88996EC9";
pub const DEFAULT_ALERT_TEMPLATE: &str =
    "Job {{ job }} has been inactive for {{ threshold }} blocks in network {{ network }}";

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub chain: ChainConfig,
    pub cache: CacheConfig,
    pub alert: AlertConfig,
    pub monitor: MonitorConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `KEEPWATCH_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("KEEPWATCH_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            chain: ChainConfig::from_env_profiled(p),
            cache: CacheConfig::from_env_profiled(p),
            alert: AlertConfig::from_env_profiled(p),
            monitor: MonitorConfig::from_env_profiled(p),
            server: ServerConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  chain:    rpc={}, sequencer={}", self.chain.rpc_endpoint, self.chain.sequencer_address);
        tracing::info!(
            "  cache:    backend={}, ttl={}s, job_state_ttl={}s",
            self.cache.backend, self.cache.ttl_secs, self.cache.job_state_ttl_secs
        );
        tracing::info!(
            "  alert:    webhook={}, format={}, timeout={}s",
            if self.alert.webhook_url.is_some() { "configured" } else { "(none, logging only)" },
            self.alert.webhook_format,
            self.alert.timeout_secs
        );
        tracing::info!(
            "  monitor:  threshold={} lookahead={} ({}) networks={} interval={}s",
            self.monitor.alert_threshold_blocks,
            self.monitor.lookahead_blocks,
            self.monitor.lookahead_mode,
            self.monitor.network_mode,
            self.monitor.check_interval_secs
        );
        tracing::info!("  server:   {}:{}", self.server.host, self.server.port);
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "chain": {
                "rpc_endpoint": self.chain.rpc_endpoint,
                "sequencer_address": self.chain.sequencer_address,
            },
            "cache": {
                "backend": self.cache.backend.to_string(),
                "ttl_secs": self.cache.ttl_secs,
                "job_state_ttl_secs": self.cache.job_state_ttl_secs,
            },
            "alert": {
                "webhook_configured": self.alert.webhook_url.is_some(),
                "webhook_format": self.alert.webhook_format.to_string(),
                "timeout_secs": self.alert.timeout_secs,
            },
            "monitor": {
                "alert_threshold_blocks": self.monitor.alert_threshold_blocks,
                "lookahead_blocks": self.monitor.lookahead_blocks,
                "lookahead_mode": self.monitor.lookahead_mode.to_string(),
                "network_mode": self.monitor.network_mode.to_string(),
                "probe_concurrency": self.monitor.probe_concurrency,
                "check_interval_secs": self.monitor.check_interval_secs,
            },
            "server": { "host": self.server.host, "port": self.server.port },
        })
    }
}

// ── Chain ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub rpc_endpoint: String,
    pub sequencer_address: String,
}

impl ChainConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            rpc_endpoint: profiled_env_or(p, "RPC_PROVIDER", DEFAULT_RPC_PROVIDER),
            sequencer_address: profiled_env_or(p, "SEQUENCER_ADDRESS", DEFAULT_SEQUENCER_ADDRESS),
        }
    }
}

// ── Cache ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    /// Process-local; job state does not survive restarts.
    Memory,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown cache backend: {other}")),
        }
    }
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Redis => "redis",
            Self::Memory => "memory",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub redis_url: String,
    /// TTL for catalog reads (networks, windows, cycle size).
    pub ttl_secs: u64,
    /// TTL for persisted job state, refreshed on every write.
    pub job_state_ttl_secs: u64,
    pub memory_capacity: usize,
}

impl CacheConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            backend: profiled_env_parse(p, "CACHE_BACKEND", CacheBackend::Redis),
            redis_url: profiled_env_or(p, "REDIS_URL", "redis://my-redis:6379"),
            ttl_secs: profiled_env_u64(p, "CACHE_TTL_SECS", 600),
            job_state_ttl_secs: profiled_env_u64(p, "JOB_STATE_TTL_SECS", 7 * 24 * 3600),
            memory_capacity: profiled_env_usize(p, "MEMORY_CACHE_CAPACITY", 10_000),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn job_state_ttl(&self) -> Duration {
        Duration::from_secs(self.job_state_ttl_secs)
    }
}

// ── Alerts ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookFormat {
    /// `{"content": "<message>"}`
    Discord,
    /// The full notification object.
    Json,
}

impl FromStr for WebhookFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "discord" => Ok(Self::Discord),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown webhook format: {other}")),
        }
    }
}

impl std::fmt::Display for WebhookFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Discord => "discord",
            Self::Json => "json",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Never logged; see [`Config::redacted_summary`].
    pub webhook_url: Option<String>,
    pub webhook_format: WebhookFormat,
    pub template: String,
    /// Upper bound on one alert delivery.
    pub timeout_secs: u64,
}

impl AlertConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            webhook_url: profiled_env_opt(p, "DISCORD_WEBHOOK_URL"),
            webhook_format: profiled_env_parse(p, "ALERT_WEBHOOK_FORMAT", WebhookFormat::Discord),
            template: profiled_env_or(p, "ALERT_TEMPLATE", DEFAULT_ALERT_TEMPLATE),
            timeout_secs: profiled_env_u64(p, "ALERT_TIMEOUT_SECS", 10),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Monitor ───────────────────────────────────────────────────

/// How the "about to open" half of the window test is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookaheadMode {
    /// `(pos + lookahead) % total >= window.start`, lower bound only.
    #[default]
    Literal,
    /// One of the next `lookahead` positions falls inside the window.
    Bounded,
}

impl FromStr for LookaheadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "bounded" => Ok(Self::Bounded),
            other => Err(format!("unknown lookahead mode: {other}")),
        }
    }
}

impl std::fmt::Display for LookaheadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Literal => "literal",
            Self::Bounded => "bounded",
        })
    }
}

/// Which networks an invocation starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    #[default]
    All,
    /// Only the sequencer's master network.
    Master,
}

impl FromStr for NetworkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "master" => Ok(Self::Master),
            other => Err(format!("unknown network mode: {other}")),
        }
    }
}

impl std::fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Master => "master",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub alert_threshold_blocks: u64,
    pub lookahead_blocks: u64,
    pub lookahead_mode: LookaheadMode,
    pub network_mode: NetworkMode,
    /// Max probes in flight; 0 = unbounded.
    pub probe_concurrency: usize,
    pub check_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alert_threshold_blocks: 10,
            lookahead_blocks: 10,
            lookahead_mode: LookaheadMode::Literal,
            network_mode: NetworkMode::All,
            probe_concurrency: 0,
            check_interval_secs: 60,
        }
    }
}

impl MonitorConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            alert_threshold_blocks: profiled_env_u64(p, "ALERT_THRESHOLD_BLOCKS", d.alert_threshold_blocks),
            lookahead_blocks: profiled_env_u64(p, "LOOKAHEAD_BLOCKS", d.lookahead_blocks),
            lookahead_mode: profiled_env_parse(p, "LOOKAHEAD_MODE", d.lookahead_mode),
            network_mode: profiled_env_parse(p, "NETWORK_MODE", d.network_mode),
            probe_concurrency: profiled_env_usize(p, "PROBE_CONCURRENCY", d.probe_concurrency),
            check_interval_secs: profiled_env_u64(p, "CHECK_INTERVAL_SECS", d.check_interval_secs),
        }
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 3000),
        }
    }
}
