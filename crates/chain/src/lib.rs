//! JSON-RPC access to the sequencer and keeper job contracts.
//!
//! Implements [`keepwatch_core::SequencerSource`] on top of `alloy` contract
//! bindings. Only view calls are issued.

pub mod client;
pub mod contracts;
pub mod convert;
pub mod error;

pub use client::SequencerClient;
pub use error::ChainError;
