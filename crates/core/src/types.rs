use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque network identifier as registered in the sequencer.
///
/// On-chain networks are `bytes32` values; the chain client renders them as
/// `0x`-prefixed hex and parses them back when calling contracts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Network(pub String);

impl Network {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable label for logs.
    ///
    /// A `bytes32` id holding right-padded ASCII (e.g. `MAINNET`) is decoded;
    /// anything else is returned unchanged.
    pub fn label(&self) -> String {
        decode_ascii_bytes32(&self.0).unwrap_or_else(|| self.0.clone())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Network {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

fn decode_ascii_bytes32(id: &str) -> Option<String> {
    let hex = id.strip_prefix("0x")?;
    if hex.len() != 64 {
        return None;
    }
    let mut bytes = Vec::with_capacity(32);
    for i in (0..hex.len()).step_by(2) {
        bytes.push(u8::from_str_radix(hex.get(i..i + 2)?, 16).ok()?);
    }
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    if bytes.is_empty() || !bytes.iter().all(|b| b.is_ascii_graphic()) {
        return None;
    }
    String::from_utf8(bytes).ok()
}

/// Half-open slice `[start, start + length)` of the window cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: u64,
    pub length: u64,
}

impl Window {
    pub fn new(start: u64, length: u64) -> Self {
        Self { start, length }
    }

    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.length)
    }

    /// Literal containment: `start <= pos < start + length`, no wrap-around.
    pub fn contains(&self, pos: u64) -> bool {
        self.start <= pos && pos < self.end()
    }

    /// Containment modulo the cycle length, so a window running past the end
    /// of the cycle also covers the positions it wraps onto.
    pub fn contains_wrapping(&self, pos: u64, total: u64) -> bool {
        if total == 0 {
            return false;
        }
        if self.length >= total {
            return true;
        }
        let start = self.start % total;
        let offset = (pos % total + total - start) % total;
        offset < self.length
    }
}

/// Result of one workability probe for a (job, network) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "jobAddress")]
    pub address: String,
    pub network: Network,
    pub can_work: bool,
}

impl Job {
    pub fn new(address: impl Into<String>, network: Network, can_work: bool) -> Self {
        Self {
            address: address.into(),
            network,
            can_work,
        }
    }

    pub fn key(&self) -> JobKey {
        JobKey::new(self.network.clone(), self.address.clone())
    }
}

/// Persisted alerting state for one (network, job) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobState {
    pub last_change_block: u64,
    pub was_workable: bool,
}

impl JobState {
    /// State for a job seen for the first time at `block`.
    pub fn fresh(block: u64) -> Self {
        Self {
            last_change_block: block,
            was_workable: false,
        }
    }
}

/// Identity of a tracked job inside one network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub network: Network,
    pub job_address: String,
}

impl JobKey {
    pub fn new(network: Network, job_address: impl Into<String>) -> Self {
        Self {
            network,
            job_address: job_address.into(),
        }
    }

    /// Store key: `<jobAddress>-<network>`.
    pub fn cache_key(&self) -> String {
        format!("{}-{}", self.job_address, self.network)
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.job_address, self.network)
    }
}
