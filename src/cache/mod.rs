//! Cache Module
//!
//! Versioned response stores backing the interception strategies.

mod entry;
mod generation;
mod identity;
mod stats;
mod storage;


// Re-export public types
pub use entry::CacheEntry;
pub use generation::{CacheGeneration, GenerationInfo};
pub use identity::RequestIdentity;
pub use stats::CacheStats;
pub use storage::CacheStorage;
