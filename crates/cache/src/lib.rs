//! Time-bounded key/value cache in front of slow source-of-truth reads.
//!
//! This crate provides:
//! - `CacheLayer` trait for pluggable cache stores
//! - Redis (`GET` / `SETEX`) and in-process LRU backends
//! - `read_through` helper implementing cache-or-fetch with best-effort population

pub mod error;
pub mod memory;
pub mod read_through;
pub mod redis_store;
pub mod traits;

pub use error::CacheError;
pub use memory::MemoryCache;
pub use read_through::read_through;
pub use redis_store::RedisCache;
pub use traits::CacheLayer;
