//! Cache Storage Module
//!
//! Registry of named cache generations shared by every request handler.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheGeneration, CacheStats, GenerationInfo, RequestIdentity};
use crate::error::{ProxyError, Result};
use crate::proxy::{ProxyRequest, ProxyResponse};

// == Cache Storage ==
/// All cache generations, in creation order, plus shared statistics.
#[derive(Debug, Default)]
pub struct CacheStorage {
    /// Generations in the order they were first opened
    generations: RwLock<Vec<Arc<CacheGeneration>>>,
    /// Request headers that take part in the identity
    vary_headers: Vec<String>,
    /// Performance statistics
    stats: RwLock<CacheStats>,
}

impl CacheStorage {
    // == Constructor ==
    /// Creates an empty storage keyed on method and URL only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty storage whose identities include `vary_headers`.
    pub fn with_vary_headers(vary_headers: Vec<String>) -> Self {
        Self {
            vary_headers,
            ..Self::default()
        }
    }

    /// Cache key of a request under this storage's identity rules.
    pub fn identity(&self, request: &ProxyRequest) -> RequestIdentity {
        RequestIdentity::from_request(request, &self.vary_headers)
    }

    // == Open ==
    /// Returns the named generation, creating it on first use.
    pub async fn open(&self, name: &str) -> Arc<CacheGeneration> {
        if let Some(existing) = self.find(name).await {
            return existing;
        }

        let mut generations = self.generations.write().await;
        // Another task may have created it between the two locks
        if let Some(existing) = generations.iter().find(|g| g.name() == name) {
            return existing.clone();
        }

        debug!("Opening cache generation {}", name);
        let generation = Arc::new(CacheGeneration::new(name));
        generations.push(generation.clone());
        generation
    }

    async fn find(&self, name: &str) -> Option<Arc<CacheGeneration>> {
        self.generations
            .read()
            .await
            .iter()
            .find(|g| g.name() == name)
            .cloned()
    }

    // == Has ==
    pub async fn has(&self, name: &str) -> bool {
        self.find(name).await.is_some()
    }

    // == Keys ==
    /// Names of every existing generation, in creation order.
    pub async fn keys(&self) -> Vec<String> {
        self.generations
            .read()
            .await
            .iter()
            .map(|g| g.name().to_string())
            .collect()
    }

    // == Info ==
    /// Summaries of every existing generation, in creation order.
    pub async fn info(&self) -> Vec<GenerationInfo> {
        let generations = self.generations.read().await.clone();
        let mut infos = Vec::with_capacity(generations.len());
        for generation in generations {
            infos.push(generation.info().await);
        }
        infos
    }

    // == Delete ==
    /// Removes a generation and all of its entries.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let mut generations = self.generations.write().await;
        let before = generations.len();
        generations.retain(|g| g.name() != name);

        if generations.len() == before {
            return Err(ProxyError::GenerationNotFound(name.to_string()));
        }

        drop(generations);
        self.stats.write().await.record_purge();
        Ok(())
    }

    // == Match ==
    /// Looks a request up across all generations, oldest first.
    ///
    /// Returns the first stored response found, or None.
    pub async fn match_request(&self, request: &ProxyRequest) -> Option<ProxyResponse> {
        let identity = self.identity(request);
        let generations = self.generations.read().await.clone();

        for generation in generations {
            if let Some(entry) = generation.get(&identity).await {
                debug!("Cache hit for {} in {}", identity, generation.name());
                self.stats.write().await.record_hit();
                return Some(entry.response);
            }
        }

        debug!("Cache miss for {}", identity);
        self.stats.write().await.record_miss();
        None
    }

    // == Put ==
    /// Writes a response snapshot into the named generation, opening it lazily.
    pub async fn put(
        &self,
        name: &str,
        request: &ProxyRequest,
        response: ProxyResponse,
    ) -> Result<()> {
        let identity = self.identity(request);
        let generation = self.open(name).await;

        match generation.put(identity, response).await {
            Ok(()) => {
                self.stats.write().await.record_write();
                Ok(())
            }
            Err(err) => {
                self.stats.write().await.record_rejected_write();
                Err(err)
            }
        }
    }

    // == Stats ==
    /// Returns a snapshot of the current statistics.
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    /// Applies an update to the shared statistics.
    pub async fn record(&self, update: impl FnOnce(&mut CacheStats)) {
        update(&mut *self.stats.write().await);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use url::Url;

    fn request(raw: &str) -> ProxyRequest {
        ProxyRequest::get(Url::parse(raw).unwrap())
    }

    #[tokio::test]
    async fn test_open_is_lazy_and_idempotent() {
        let storage = CacheStorage::new();
        assert!(storage.keys().await.is_empty());

        let a = storage.open("signage-cache-v1").await;
        let b = storage.open("signage-cache-v1").await;

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(storage.keys().await, vec!["signage-cache-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_keys_in_creation_order() {
        let storage = CacheStorage::new();
        storage.open("signage-cache-v0").await;
        storage.open("signage-cache-v1").await;
        storage.open("signage-cache-v0").await;

        assert_eq!(
            storage.keys().await,
            vec!["signage-cache-v0".to_string(), "signage-cache-v1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_put_then_match() {
        let storage = CacheStorage::new();
        let req = request("http://h/static/logo.png");
        let response = ProxyResponse::new(StatusCode::OK, "png");

        storage
            .put("signage-cache-v1", &req, response.clone())
            .await
            .unwrap();

        assert!(storage.has("signage-cache-v1").await);
        assert_eq!(storage.match_request(&req).await, Some(response));

        let stats = storage.stats().await;
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_match_miss_records_stats() {
        let storage = CacheStorage::new();
        assert!(storage
            .match_request(&request("http://h/none"))
            .await
            .is_none());
        assert_eq!(storage.stats().await.misses, 1);
    }

    #[tokio::test]
    async fn test_match_searches_oldest_generation_first() {
        let storage = CacheStorage::new();
        let req = request("http://h/index.html");

        storage
            .put("signage-cache-v0", &req, ProxyResponse::new(StatusCode::OK, "old"))
            .await
            .unwrap();
        storage
            .put("signage-cache-v1", &req, ProxyResponse::new(StatusCode::OK, "new"))
            .await
            .unwrap();

        let found = storage.match_request(&req).await.unwrap();
        assert_eq!(found.body, "old");

        storage.delete("signage-cache-v0").await.unwrap();
        let found = storage.match_request(&req).await.unwrap();
        assert_eq!(found.body, "new");
    }

    #[tokio::test]
    async fn test_info_lists_generations() {
        let storage = CacheStorage::new();
        storage.open("signage-cache-v0").await;
        storage
            .put(
                "signage-cache-v1",
                &request("http://h/static/logo.png"),
                ProxyResponse::new(StatusCode::OK, "png"),
            )
            .await
            .unwrap();

        let info = storage.info().await;
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].name, "signage-cache-v0");
        assert_eq!(info[0].entries, 0);
        assert!(info[0].oldest_entry_age_ms.is_none());
        assert_eq!(info[1].entries, 1);
        assert!(info[1].oldest_entry_age_ms.is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_generation() {
        let storage = CacheStorage::new();
        let result = storage.delete("signage-cache-v0").await;
        assert!(matches!(result, Err(ProxyError::GenerationNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_drops_entries() {
        let storage = CacheStorage::new();
        let req = request("http://h/static/logo.png");
        storage
            .put("signage-cache-v0", &req, ProxyResponse::new(StatusCode::OK, "png"))
            .await
            .unwrap();

        storage.delete("signage-cache-v0").await.unwrap();

        assert!(storage.keys().await.is_empty());
        assert!(storage.match_request(&req).await.is_none());
        assert_eq!(storage.stats().await.generations_purged, 1);
    }

    #[tokio::test]
    async fn test_rejected_put_is_counted() {
        let storage = CacheStorage::new();
        let req = request("http://h/media/clip.mp4");

        let result = storage
            .put(
                "signage-cache-v1",
                &req,
                ProxyResponse::new(StatusCode::PARTIAL_CONTENT, "chunk"),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(storage.stats().await.rejected_writes, 1);
        assert_eq!(storage.stats().await.writes, 0);
    }

    #[tokio::test]
    async fn test_vary_headers_split_entries() {
        let storage = CacheStorage::with_vary_headers(vec!["accept-language".to_string()]);
        let name = HeaderName::from_static("accept-language");
        let ja = request("http://h/index.html").with_header(name.clone(), HeaderValue::from_static("ja"));
        let en = request("http://h/index.html").with_header(name, HeaderValue::from_static("en"));

        storage
            .put("signage-cache-v1", &ja, ProxyResponse::new(StatusCode::OK, "こんにちは"))
            .await
            .unwrap();

        assert!(storage.match_request(&ja).await.is_some());
        assert!(storage.match_request(&en).await.is_none());
    }
}
