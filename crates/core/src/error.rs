use thiserror::Error;

/// Errors raised while reading the sequencer and job contracts.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("rpc call {call} failed: {message}")]
    Rpc { call: &'static str, message: String },

    #[error("{what} out of range: {value}")]
    OutOfRange { what: &'static str, value: String },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    Other(String),
}

impl SourceError {
    pub fn rpc(call: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Rpc {
            call,
            message: err.to_string(),
        }
    }
}
