//! API Handlers
//!
//! HTTP request handlers for the status endpoints and the interception
//! fallback.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    response::Response,
    Json,
};
use tracing::debug;
use url::Url;

use crate::api::convert::{into_proxy_request, into_response};
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::models::{HealthResponse, StatsResponse};
use crate::proxy::{HttpNetwork, Interception, Network, ProxyWorker};

/// Application state shared across all handlers.
pub struct AppState<N> {
    /// Lifecycle worker owning the cache and strategies
    pub worker: Arc<ProxyWorker<N>>,
    /// Origin that origin-form request paths are resolved against
    pub upstream: Arc<Url>,
}

impl<N> Clone for AppState<N> {
    fn clone(&self) -> Self {
        Self {
            worker: self.worker.clone(),
            upstream: self.upstream.clone(),
        }
    }
}

impl<N: Network> AppState<N> {
    /// Creates a new AppState around a worker.
    pub fn new(worker: ProxyWorker<N>, upstream: Url) -> Self {
        Self {
            worker: Arc::new(worker),
            upstream: Arc::new(upstream),
        }
    }
}

impl AppState<HttpNetwork> {
    /// Creates a new AppState from configuration, backed by the HTTP network.
    pub fn from_config(config: &Config) -> Result<Self> {
        let network = Arc::new(HttpNetwork::new(config.upstream_timeout())?);
        let worker = ProxyWorker::from_config(config, network);
        Ok(Self::new(worker, config.upstream_url.clone()))
    }
}

/// Fallback handler: every request that is not a status endpoint.
///
/// Socket traffic is not intercepted and is answered with 501. An absent
/// result is answered with 503.
pub async fn proxy_handler<N: Network>(
    State(state): State<AppState<N>>,
    request: Request,
) -> Result<Response> {
    let request = into_proxy_request(request, &state.upstream).await?;
    let url = request.url.to_string();

    match state.worker.on_fetch(request) {
        Interception::Passthrough(request) => {
            debug!("Leaving {} to the native transport", request.url);
            Err(ProxyError::SocketPassthrough(url))
        }
        Interception::RespondWith(pending) => match pending.await {
            Some(response) => Ok(into_response(response)),
            None => Err(ProxyError::Unavailable(format!(
                "{} is not reachable and not cached",
                url
            ))),
        },
    }
}

/// Handler for GET /__proxy/health
pub async fn health_handler<N: Network>(State(state): State<AppState<N>>) -> Json<HealthResponse> {
    let worker = &state.worker;
    Json(HealthResponse::healthy(
        worker.state().await.as_str(),
        worker.generation(),
        worker.clients().controller(),
    ))
}

/// Handler for GET /__proxy/stats
pub async fn stats_handler<N: Network>(State(state): State<AppState<N>>) -> Json<StatsResponse> {
    let stats = state.worker.stats().await;
    let generations = state.worker.storage().info().await;
    Json(StatsResponse::new(&stats, generations))
}
