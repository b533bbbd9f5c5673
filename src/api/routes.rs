//! API Routes
//!
//! Configures the Axum router: status endpoints plus the interception
//! fallback.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health_handler, proxy_handler, stats_handler, AppState};
use crate::proxy::Network;

/// Creates the main router.
///
/// # Endpoints
/// - `GET /__proxy/health` - Worker state and controller
/// - `GET /__proxy/stats` - Cache statistics
/// - anything else - intercepted and handled by the worker
///
/// # Middleware
/// - CORS: Allows any origin so display pages on other hosts can load assets
/// - Tracing: Logs all requests for debugging
pub fn create_router<N: Network>(state: AppState<N>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/__proxy/health", get(health_handler::<N>))
        .route("/__proxy/stats", get(stats_handler::<N>))
        .fallback(proxy_handler::<N>)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
