//! Lifecycle manager and interception entry point.
//!
//! The worker owns the current generation identifier, drives setup and
//! activation, and turns each intercepted request into either a passthrough
//! or a deferred response.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::{join_all, BoxFuture, FutureExt};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{CacheStats, CacheStorage};
use crate::config::Config;
use crate::error::{ProxyError, Result};
use crate::proxy::classifier::{RequestClassifier, Strategy};
use crate::proxy::clients::Clients;
use crate::proxy::network::Network;
use crate::proxy::strategy::{network_first, stale_while_revalidate, StrategyContext};
use crate::proxy::{ProxyRequest, ProxyResponse};

// == Worker State ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Installed,
    Activating,
    Activated,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Interception ==
/// Outcome of intercepting one request.
pub enum Interception {
    /// Not intercepted; the request is handed back untouched.
    Passthrough(ProxyRequest),
    /// Deferred substitute response. None means neither network nor cache
    /// produced anything.
    RespondWith(BoxFuture<'static, Option<ProxyResponse>>),
}

impl fmt::Debug for Interception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interception::Passthrough(req) => f.debug_tuple("Passthrough").field(&req.url).finish(),
            Interception::RespondWith(_) => f.write_str("RespondWith(..)"),
        }
    }
}

// == Proxy Worker ==
pub struct ProxyWorker<N> {
    ctx: StrategyContext<N>,
    classifier: RequestClassifier,
    clients: Clients,
    state: RwLock<WorkerState>,
    skip_waiting: AtomicBool,
    precache: Vec<Url>,
}

impl<N: Network> ProxyWorker<N> {
    /// Creates a worker in the `Installing` state.
    pub fn new(
        storage: Arc<CacheStorage>,
        network: Arc<N>,
        cache_name: impl Into<Arc<str>>,
        classifier: RequestClassifier,
    ) -> Self {
        Self {
            ctx: StrategyContext::new(storage, network, cache_name),
            classifier,
            clients: Clients::new(),
            state: RwLock::new(WorkerState::Installing),
            skip_waiting: AtomicBool::new(false),
            precache: Vec::new(),
        }
    }

    /// Builds a worker from configuration with a fresh storage.
    ///
    /// Precache entries that are not valid URLs are resolved against the
    /// upstream; entries that still fail to parse are skipped with a warning.
    pub fn from_config(config: &Config, network: Arc<N>) -> Self {
        let storage = Arc::new(CacheStorage::with_vary_headers(config.vary_headers.clone()));
        let precache = config
            .precache_urls
            .iter()
            .filter_map(|raw| match Url::parse(raw).or_else(|_| config.upstream_url.join(raw)) {
                Ok(url) => Some(url),
                Err(err) => {
                    warn!("Ignoring precache entry {}: {}", raw, err);
                    None
                }
            })
            .collect();

        Self::new(
            storage,
            network,
            config.cache_name.as_str(),
            RequestClassifier::new(config.config_marker.clone()),
        )
        .with_precache(precache)
    }

    /// URLs fetched and stored during setup.
    pub fn with_precache(mut self, urls: Vec<Url>) -> Self {
        self.precache = urls;
        self
    }

    pub fn generation(&self) -> &str {
        &self.ctx.generation
    }

    pub fn storage(&self) -> &Arc<CacheStorage> {
        &self.ctx.storage
    }

    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    pub async fn stats(&self) -> CacheStats {
        self.ctx.storage.stats().await
    }

    /// True once setup asked to skip the waiting phase.
    pub fn skips_waiting(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    // == Setup ==
    /// Prepares the worker to run, skipping any wait for a previous instance.
    ///
    /// The current generation is not created here unless there is something
    /// to precache. Every precache URL must come back with 200, otherwise
    /// setup fails and the worker stays `Installing`.
    pub async fn on_setup(&self) -> Result<()> {
        info!("Setting up proxy worker for {}", self.ctx.generation);
        self.skip_waiting.store(true, Ordering::SeqCst);

        for url in &self.precache {
            let request = ProxyRequest::get(url.clone());
            let response = self.ctx.network.fetch(request.clone()).await?;
            if !response.is_ok() {
                return Err(ProxyError::Network(format!(
                    "precache of {} returned {}",
                    url, response.status
                )));
            }
            self.ctx
                .storage
                .put(&self.ctx.generation, &request, response)
                .await?;
            debug!("Precached {}", url);
        }

        *self.state.write().await = WorkerState::Installed;
        info!("Proxy worker installed");
        Ok(())
    }

    // == Activate ==
    /// Purges every stale generation, then claims connected clients.
    ///
    /// Deletions run concurrently and independently; a failed deletion is
    /// logged and does not stop the others. Returns how many generations
    /// were purged.
    pub async fn on_activate(&self) -> usize {
        *self.state.write().await = WorkerState::Activating;

        let stale: Vec<String> = self
            .ctx
            .storage
            .keys()
            .await
            .into_iter()
            .filter(|name| name.as_str() != self.generation())
            .collect();

        let deletions = stale.iter().map(|name| async move {
            match self.ctx.storage.delete(name).await {
                Ok(()) => {
                    info!("Deleted stale cache generation {}", name);
                    true
                }
                Err(err) => {
                    warn!("Could not delete cache generation {}: {}", name, err);
                    false
                }
            }
        });
        let purged = join_all(deletions).await.into_iter().filter(|ok| *ok).count();

        self.clients.claim(self.generation());
        *self.state.write().await = WorkerState::Activated;
        info!("Proxy worker activated, purged {} generation(s)", purged);
        purged
    }

    // == Intercept ==
    /// Classifies a request and dispatches it to its strategy.
    pub fn on_fetch(&self, request: ProxyRequest) -> Interception {
        let strategy = self.classifier.classify(&request);
        debug!("{} {} -> {}", request.method, request.url, strategy.as_str());

        let ctx = self.ctx.clone();
        match strategy {
            Strategy::Passthrough => Interception::Passthrough(request),
            Strategy::NetworkFirst => {
                Interception::RespondWith(async move { network_first(&ctx, request).await }.boxed())
            }
            Strategy::StaleWhileRevalidate => Interception::RespondWith(
                async move { stale_while_revalidate(&ctx, request).await }.boxed(),
            ),
        }
    }
}
