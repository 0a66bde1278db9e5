use thiserror::Error;

/// Startup failures building the chain client.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("invalid RPC endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("invalid sequencer address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
}
