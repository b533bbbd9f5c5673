//! Routes each intercepted request to one handling strategy.

use crate::proxy::ProxyRequest;

// == Strategy ==
/// How an intercepted request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Configuration traffic: network first, cache on failure
    NetworkFirst,
    /// Realtime sockets: not intercepted at all
    Passthrough,
    /// Everything else: cached copy now, refresh in the background
    StaleWhileRevalidate,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::NetworkFirst => "network-first",
            Strategy::Passthrough => "passthrough",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
        }
    }
}

// == Request Classifier ==
/// Ordered, first-match-wins classification. The config marker is checked
/// before the socket scheme.
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    config_marker: String,
}

impl RequestClassifier {
    pub fn new(config_marker: impl Into<String>) -> Self {
        Self {
            config_marker: config_marker.into(),
        }
    }

    pub fn classify(&self, request: &ProxyRequest) -> Strategy {
        if request.url.path().contains(&self.config_marker) {
            Strategy::NetworkFirst
        } else if request.is_socket() {
            Strategy::Passthrough
        } else {
            Strategy::StaleWhileRevalidate
        }
    }
}

impl Default for RequestClassifier {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CONFIG_MARKER)
    }
}
