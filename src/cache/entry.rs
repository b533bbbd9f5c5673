//! Cache Entry Module
//!
//! Defines the structure for individual stored responses.

use chrono::{DateTime, Utc};

use crate::proxy::ProxyResponse;

// == Cache Entry ==
/// An immutable response snapshot plus the time it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored response
    pub response: ProxyResponse,
    /// When the snapshot was written
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Wraps a response snapshot, stamping it with the current time.
    pub fn new(response: ProxyResponse) -> Self {
        Self {
            response,
            stored_at: Utc::now(),
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was stored.
    pub fn age_ms(&self) -> i64 {
        (Utc::now() - self.stored_at).num_milliseconds().max(0)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_keeps_response() {
        let response = ProxyResponse::new(StatusCode::OK, "body");
        let entry = CacheEntry::new(response.clone());
        assert_eq!(entry.response, response);
    }

    #[test]
    fn test_entry_age_grows() {
        let entry = CacheEntry::new(ProxyResponse::new(StatusCode::OK, "body"));
        sleep(Duration::from_millis(20));
        assert!(entry.age_ms() >= 20);
    }
}
