//! Cache strategy executor.
//!
//! Each strategy takes a request plus explicit store and network handles and
//! resolves to the response handed back to the client, or None when neither
//! the network nor the cache could produce one.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::CacheStorage;
use crate::proxy::network::Network;
use crate::proxy::{ProxyRequest, ProxyResponse};
use crate::tasks::spawn_revalidation;

// == Strategy Context ==
/// Handles shared by every strategy invocation.
pub struct StrategyContext<N> {
    pub storage: Arc<CacheStorage>,
    pub network: Arc<N>,
    /// Name of the current cache generation; all writes go here
    pub generation: Arc<str>,
}

impl<N> Clone for StrategyContext<N> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            network: self.network.clone(),
            generation: self.generation.clone(),
        }
    }
}

impl<N: Network> StrategyContext<N> {
    pub fn new(storage: Arc<CacheStorage>, network: Arc<N>, generation: impl Into<Arc<str>>) -> Self {
        Self {
            storage,
            network,
            generation: generation.into(),
        }
    }

    /// Writes a response copy into the current generation.
    ///
    /// Refused writes are logged; they never affect the response.
    pub async fn store(&self, request: &ProxyRequest, response: ProxyResponse) {
        match self.storage.put(&self.generation, request, response).await {
            Ok(()) => debug!("Cached {} in {}", request.url, self.generation),
            Err(err) => debug!("Not caching {}: {}", request.url, err),
        }
    }
}

// == Network First ==
/// Network first, falling back to the cache when the network fails.
///
/// Any completed response is cached and returned regardless of status. When
/// the network fails, the cached response is returned if one exists; no
/// substitute response is ever synthesized.
pub async fn network_first<N: Network>(
    ctx: &StrategyContext<N>,
    request: ProxyRequest,
) -> Option<ProxyResponse> {
    match ctx.network.fetch(request.clone()).await {
        Ok(response) => {
            ctx.store(&request, response.clone()).await;
            Some(response)
        }
        Err(err) => {
            warn!("Network failed for {}, falling back to cache: {}", request.url, err);
            let cached = ctx.storage.match_request(&request).await;
            if cached.is_some() {
                ctx.storage.record(|s| s.record_network_fallback()).await;
            }
            cached
        }
    }
}

// == Stale While Revalidate ==
/// Cached copy immediately, refreshed in the background.
///
/// The cache lookup completes before the revalidation is spawned. The
/// revalidation always runs to completion; the caller only waits on it when
/// nothing was cached.
pub async fn stale_while_revalidate<N: Network>(
    ctx: &StrategyContext<N>,
    request: ProxyRequest,
) -> Option<ProxyResponse> {
    let cached = ctx.storage.match_request(&request).await;
    let revalidation = spawn_revalidation(ctx.clone(), request);

    match cached {
        Some(response) => Some(response),
        None => match revalidation.await {
            Ok(response) => response,
            Err(err) => {
                warn!("Revalidation task failed: {}", err);
                None
            }
        },
    }
}
