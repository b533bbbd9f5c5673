//! Response models for the proxy status API
//!
//! This module defines the DTOs serialized by the `/__proxy` endpoints.

pub mod responses;

// Re-export commonly used types
pub use responses::{HealthResponse, StatsResponse};
