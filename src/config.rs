//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;
use std::time::Duration;

use url::Url;

/// Default identifier of the current cache generation.
pub const DEFAULT_CACHE_NAME: &str = "signage-cache-v1";

/// Default marker segment identifying configuration-endpoint traffic.
pub const DEFAULT_CONFIG_MARKER: &str = "/config";

const DEFAULT_UPSTREAM: &str = "http://127.0.0.1:8000";

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP front-end port
    pub server_port: u16,
    /// Origin that origin-form request paths are resolved against
    pub upstream_url: Url,
    /// Name of the current cache generation
    pub cache_name: String,
    /// Path substring routing a request to network-first handling
    pub config_marker: String,
    /// Request headers that take part in the request identity
    pub vary_headers: Vec<String>,
    /// URLs fetched and stored during setup
    pub precache_urls: Vec<String>,
    /// Transport timeout for upstream requests, in seconds
    pub upstream_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PROXY_PORT` - Front-end port (default: 8080)
    /// - `UPSTREAM_URL` - Upstream origin (default: http://127.0.0.1:8000)
    /// - `CACHE_NAME` - Current generation (default: signage-cache-v1)
    /// - `CONFIG_PATH_MARKER` - Config path marker (default: /config)
    /// - `VARY_HEADERS` - Comma-separated header names (default: none)
    /// - `PRECACHE_URLS` - Comma-separated URLs (default: none)
    /// - `UPSTREAM_TIMEOUT_SECS` - Transport timeout (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env::var("PROXY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            upstream_url: env::var("UPSTREAM_URL")
                .ok()
                .and_then(|v| Url::parse(&v).ok())
                .unwrap_or(defaults.upstream_url),
            cache_name: env::var("CACHE_NAME")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.cache_name),
            config_marker: env::var("CONFIG_PATH_MARKER")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.config_marker),
            vary_headers: env::var("VARY_HEADERS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            precache_urls: env::var("PRECACHE_URLS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            upstream_timeout: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.upstream_timeout),
        }
    }

    /// Upstream timeout as a Duration.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            upstream_url: Url::parse(DEFAULT_UPSTREAM).expect("default upstream is a valid URL"),
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            config_marker: DEFAULT_CONFIG_MARKER.to_string(),
            vary_headers: Vec::new(),
            precache_urls: Vec::new(),
            upstream_timeout: 30,
        }
    }
}
