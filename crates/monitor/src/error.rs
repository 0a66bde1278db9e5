use keepwatch_cache::CacheError;
use keepwatch_core::SourceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("upstream read failed: {0}")]
    Source(#[from] SourceError),

    /// Job state could not be read or written; alerting cannot proceed safely.
    #[error("job state store failed for {key}: {source}")]
    StateStore {
        key: String,
        #[source]
        source: CacheError,
    },

    #[error("total window size is zero")]
    EmptyCycle,
}
