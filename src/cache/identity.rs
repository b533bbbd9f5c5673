//! Request Identity Module
//!
//! Derives the cache key of an intercepted request.

use std::fmt;

use crate::proxy::ProxyRequest;

// == Request Identity ==
/// Cache key: method, URL without fragment, and the configured vary headers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestIdentity {
    /// Upper-case request method
    pub method: String,
    /// Absolute URL with the fragment removed
    pub url: String,
    /// Lower-cased header names paired with their values, in configured order
    pub vary: Vec<(String, String)>,
}

impl RequestIdentity {
    // == Constructor ==
    /// Builds the identity of a request.
    ///
    /// Headers listed in `vary_headers` take part in the key; a missing header
    /// contributes an empty value so that presence and absence differ from
    /// any non-empty value.
    pub fn from_request(request: &ProxyRequest, vary_headers: &[String]) -> Self {
        let mut url = request.url.clone();
        url.set_fragment(None);

        let vary = vary_headers
            .iter()
            .map(|name| {
                let name = name.to_ascii_lowercase();
                let value = request
                    .headers
                    .get(name.as_str())
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                (name, value)
            })
            .collect();

        Self {
            method: request.method.as_str().to_ascii_uppercase(),
            url: url.into(),
            vary,
        }
    }

    /// True when the method may be matched against or stored in a generation.
    pub fn is_cacheable_method(&self) -> bool {
        self.method == "GET"
    }
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}
