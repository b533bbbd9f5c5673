//! Signage Proxy - A request-interception cache proxy
//!
//! Decides per request whether a signage display is served from the network,
//! from a versioned local cache, or both.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod proxy;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use proxy::{HttpNetwork, Network, ProxyWorker};
