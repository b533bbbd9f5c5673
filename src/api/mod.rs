//! API Module
//!
//! HTTP front-end of the signage proxy.
//!
//! # Endpoints
//! - `GET /__proxy/health` - Health and lifecycle state
//! - `GET /__proxy/stats` - Cache statistics
//! - everything else - intercepted request

pub mod convert;
pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
