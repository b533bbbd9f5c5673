//! Error types for the signage proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Proxy Error Enum ==
/// Unified error type for the signage proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The upstream could not be reached (offline, DNS, timeout)
    #[error("Network failure: {0}")]
    Network(String),

    /// Neither the network nor the cache could produce a response
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Only GET requests can be stored in a generation
    #[error("Unsupported cache method: {0}")]
    UnsupportedMethod(String),

    /// The response cannot be stored (partial content, not modified, `Vary: *`)
    #[error("Uncacheable response: {0}")]
    UncacheableResponse(String),

    /// Named generation does not exist
    #[error("Generation not found: {0}")]
    GenerationNotFound(String),

    /// Request could not be turned into a proxied request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Socket traffic is left to the native transport
    #[error("Socket passthrough: {0}")]
    SocketPassthrough(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::Network(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::UncacheableResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::GenerationNotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::SocketPassthrough(_) => StatusCode::NOT_IMPLEMENTED,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        ProxyError::Network(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the signage proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
