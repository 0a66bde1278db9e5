pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use config::Config;
pub use error::*;
pub use source::SequencerSource;
pub use types::*;
