//! Background Revalidation Task
//!
//! Refreshes a cached response from the network without holding up the
//! client that triggered it.

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::proxy::network::Network;
use crate::proxy::strategy::StrategyContext;
use crate::proxy::{ProxyRequest, ProxyResponse};

/// Spawns a revalidation of `request` that runs to completion on its own.
///
/// A 200 response is written into the current generation before the task
/// resolves. Other statuses are passed on uncached. A network failure is
/// logged and resolves to None; it is never retried.
///
/// Dropping the returned handle detaches the task rather than cancelling it.
///
/// # Example
/// ```ignore
/// let handle = spawn_revalidation(ctx.clone(), request);
/// // Either await it (nothing cached) or drop it (cached copy already served)
/// let fresh = handle.await?;
/// ```
pub fn spawn_revalidation<N: Network>(
    ctx: StrategyContext<N>,
    request: ProxyRequest,
) -> JoinHandle<Option<ProxyResponse>> {
    tokio::spawn(async move { revalidate(&ctx, request).await })
}

async fn revalidate<N: Network>(
    ctx: &StrategyContext<N>,
    request: ProxyRequest,
) -> Option<ProxyResponse> {
    ctx.storage.record(|s| s.record_revalidation()).await;

    match ctx.network.fetch(request.clone()).await {
        Ok(response) => {
            if response.is_ok() {
                ctx.store(&request, response.clone()).await;
            } else {
                debug!(
                    "Revalidation of {} returned {}, keeping cache as is",
                    request.url, response.status
                );
            }
            Some(response)
        }
        Err(err) => {
            warn!("Network fetch failed for {}, staying offline: {}", request.url, err);
            ctx.storage.record(|s| s.record_revalidation_failure()).await;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use url::Url;

    use super::*;
    use crate::cache::CacheStorage;
    use crate::proxy::network::mock::MockNetwork;

    const URL: &str = "http://h/static/slide.jpg";

    fn setup() -> (StrategyContext<MockNetwork>, Arc<MockNetwork>, ProxyRequest) {
        let network = Arc::new(MockNetwork::new());
        let ctx = StrategyContext::new(
            Arc::new(CacheStorage::new()),
            network.clone(),
            "signage-cache-v1",
        );
        (ctx, network, ProxyRequest::get(Url::parse(URL).unwrap()))
    }

    #[tokio::test]
    async fn test_revalidation_writes_ok_response() {
        let (ctx, network, request) = setup();
        let fresh = ProxyResponse::new(StatusCode::OK, "jpg");
        network.route(URL, fresh.clone());

        let result = spawn_revalidation(ctx.clone(), request.clone()).await.unwrap();

        assert_eq!(result, Some(fresh.clone()));
        assert_eq!(ctx.storage.match_request(&request).await, Some(fresh));
        assert_eq!(ctx.storage.keys().await, vec!["signage-cache-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_revalidation_skips_non_ok() {
        let (ctx, network, request) = setup();
        network.route(URL, ProxyResponse::new(StatusCode::NO_CONTENT, ""));

        let result = spawn_revalidation(ctx.clone(), request.clone()).await.unwrap();

        assert_eq!(result.unwrap().status, StatusCode::NO_CONTENT);
        assert!(ctx.storage.match_request(&request).await.is_none());
    }

    #[tokio::test]
    async fn test_revalidation_failure_is_swallowed() {
        let (ctx, network, request) = setup();
        network.set_online(false);

        let result = spawn_revalidation(ctx.clone(), request).await;

        assert!(matches!(result, Ok(None)));
        let stats = ctx.storage.stats().await;
        assert_eq!(stats.revalidations, 1);
        assert_eq!(stats.revalidation_failures, 1);
    }

    #[tokio::test]
    async fn test_dropped_handle_still_completes() {
        let (ctx, network, request) = setup();
        network.route(URL, ProxyResponse::new(StatusCode::OK, "jpg"));
        network.close_gate();

        drop(spawn_revalidation(ctx.clone(), request.clone()));
        network.open_gate();

        tokio::time::timeout(std::time::Duration::from_secs(2), async {
            while ctx.storage.match_request(&request).await.is_none() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("detached revalidation should finish");
    }
}
