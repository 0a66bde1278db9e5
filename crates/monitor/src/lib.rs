//! Inactivity monitoring for keeper jobs.
//!
//! One invocation of [`JobService::check_inactive_jobs`] walks the pipeline:
//! - `NetworkCatalog` lists networks and their windows (cached reads)
//! - `WindowScheduler` keeps the networks whose window is open or close
//! - `WorkabilityProbe` asks every job about every relevant network
//! - `JobStateTracker` updates per-job state and decides when to alert

pub mod catalog;
pub mod error;
pub mod probe;
pub mod scheduler;
pub mod service;
pub mod state;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use catalog::{CachedCatalog, CatalogSnapshot, NetworkCatalog};
pub use error::MonitorError;
pub use probe::{ConcurrentProbe, ProbeOutcome, ProbeResult, WorkabilityProbe};
pub use scheduler::WindowScheduler;
pub use service::{CheckReport, JobService};
pub use state::{CacheStateStore, JobStateStore, MemoryStateStore};
pub use tracker::{Evaluation, JobStateTracker, Transition};
