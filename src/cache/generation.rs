//! Cache Generation Module
//!
//! A named, versioned map from request identity to stored response.

use std::collections::HashMap;

use axum::http::{header, StatusCode};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::cache::{CacheEntry, RequestIdentity};
use crate::error::{ProxyError, Result};
use crate::proxy::ProxyResponse;

// == Generation Info ==
/// Point-in-time summary of one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationInfo {
    pub name: String,
    pub entries: usize,
    /// Age of the least recently written entry, None when empty
    pub oldest_entry_age_ms: Option<i64>,
}

// == Cache Generation ==
/// One version-tagged store.
///
/// The lock only guards the map itself. Two puts for the same identity are
/// independent operations and whichever completes last wins.
#[derive(Debug)]
pub struct CacheGeneration {
    name: String,
    entries: RwLock<HashMap<RequestIdentity, CacheEntry>>,
}

impl CacheGeneration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Get ==
    /// Returns the stored response for an identity, if any.
    ///
    /// Non-GET identities never match.
    pub async fn get(&self, identity: &RequestIdentity) -> Option<CacheEntry> {
        if !identity.is_cacheable_method() {
            return None;
        }
        self.entries.read().await.get(identity).cloned()
    }

    // == Put ==
    /// Stores a response snapshot, replacing any previous entry wholesale.
    ///
    /// Rejects non-GET identities, partial content, not-modified, and
    /// `Vary: *` responses.
    pub async fn put(&self, identity: RequestIdentity, response: ProxyResponse) -> Result<()> {
        if !identity.is_cacheable_method() {
            return Err(ProxyError::UnsupportedMethod(identity.method));
        }

        if response.status == StatusCode::PARTIAL_CONTENT {
            return Err(ProxyError::UncacheableResponse(format!(
                "{} returned partial content",
                identity
            )));
        }

        // A 304 has no body to replay
        if response.status == StatusCode::NOT_MODIFIED {
            return Err(ProxyError::UncacheableResponse(format!(
                "{} returned not modified",
                identity
            )));
        }

        let vary_all = response
            .headers
            .get_all(header::VARY)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|v| v.trim() == "*");
        if vary_all {
            return Err(ProxyError::UncacheableResponse(format!(
                "{} varies on every header",
                identity
            )));
        }

        self.entries
            .write()
            .await
            .insert(identity, CacheEntry::new(response));
        Ok(())
    }

    // == Length ==
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    // == Info ==
    /// Entry count and the age of the stalest entry.
    pub async fn info(&self) -> GenerationInfo {
        let entries = self.entries.read().await;
        GenerationInfo {
            name: self.name.clone(),
            entries: entries.len(),
            oldest_entry_age_ms: entries.values().map(|e| e.age_ms()).max(),
        }
    }
}
