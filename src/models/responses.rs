//! Response DTOs for the proxy status API
//!
//! Defines the structure of outgoing status response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, GenerationInfo};

/// Response body for the stats endpoint (GET /__proxy/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Responses written into a generation
    pub writes: u64,
    /// Writes refused by the store
    pub rejected_writes: u64,
    /// Background revalidations started
    pub revalidations: u64,
    /// Revalidations that failed on the network
    pub revalidation_failures: u64,
    /// Config requests served from cache while offline
    pub network_fallbacks: u64,
    /// Stale generations deleted
    pub generations_purged: u64,
    /// Existing generations with entry counts and oldest entry age
    pub generations: Vec<GenerationInfo>,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: &CacheStats, generations: Vec<GenerationInfo>) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            writes: stats.writes,
            rejected_writes: stats.rejected_writes,
            revalidations: stats.revalidations,
            revalidation_failures: stats.revalidation_failures,
            network_fallbacks: stats.network_fallbacks,
            generations_purged: stats.generations_purged,
            generations,
        }
    }
}

/// Response body for the health endpoint (GET /__proxy/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Lifecycle state of the worker
    pub state: String,
    /// Current cache generation
    pub generation: String,
    /// Generation controlling the connected clients
    pub controller: Option<String>,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(
        state: impl Into<String>,
        generation: impl Into<String>,
        controller: Option<String>,
    ) -> Self {
        Self {
            status: "healthy".to_string(),
            state: state.into(),
            generation: generation.into(),
            controller,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
