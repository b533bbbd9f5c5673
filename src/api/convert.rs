//! Conversion between axum messages and proxy messages.

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, HeaderMap, Uri};
use axum::response::Response;
use url::Url;

use crate::error::{ProxyError, Result};
use crate::proxy::{strip_hop_by_hop, ProxyRequest, ProxyResponse};

/// Largest request body buffered before forwarding
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024; // 16 MB

/// Validators from one display; the shared cache needs full responses.
const CONDITIONAL: [header::HeaderName; 5] = [
    header::IF_NONE_MATCH,
    header::IF_MODIFIED_SINCE,
    header::IF_MATCH,
    header::IF_UNMODIFIED_SINCE,
    header::IF_RANGE,
];

/// Turns an inbound request into the request the proxy intercepts.
///
/// Absolute-form URIs are kept, origin-form paths are joined onto the
/// upstream. WebSocket upgrades get the `ws`/`wss` scheme. Conditional
/// headers are dropped so the upstream always answers in full.
pub async fn into_proxy_request(request: Request, upstream: &Url) -> Result<ProxyRequest> {
    let (parts, body) = request.into_parts();

    let mut url = resolve_url(&parts.uri, upstream)?;
    if is_websocket_upgrade(&parts.headers) {
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme).map_err(|_| {
            ProxyError::InvalidRequest(format!("cannot switch {} to {}", url, scheme))
        })?;
    }

    let body = to_bytes(body, MAX_BODY_SIZE)
        .await
        .map_err(|e| ProxyError::InvalidRequest(format!("unreadable body: {}", e)))?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    for name in CONDITIONAL.iter() {
        headers.remove(name);
    }

    Ok(ProxyRequest {
        method: parts.method,
        url,
        headers,
        body,
    })
}

/// Turns a proxy response back into an axum response.
pub fn into_response(response: ProxyResponse) -> Response {
    let mut headers = response.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::CONTENT_LENGTH);

    let mut out = Response::new(Body::from(response.body));
    *out.status_mut() = response.status;
    *out.headers_mut() = headers;
    out
}

fn resolve_url(uri: &Uri, upstream: &Url) -> Result<Url> {
    if uri.scheme().is_some() {
        return Url::parse(&uri.to_string())
            .map_err(|e| ProxyError::InvalidRequest(format!("{}: {}", uri, e)));
    }

    // Path and query only, so `//host/x` cannot switch hosts
    let mut url = upstream.clone();
    url.set_path(uri.path());
    url.set_query(uri.query());
    Ok(url)
}

fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("websocket"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Method, StatusCode};

    fn upstream() -> Url {
        Url::parse("http://backend:8000").unwrap()
    }

    #[tokio::test]
    async fn test_origin_form_joins_upstream() {
        let request = Request::builder()
            .uri("/api/display/config?token=abc")
            .header(header::HOST, "proxy:8080")
            .body(Body::empty())
            .unwrap();

        let proxied = into_proxy_request(request, &upstream()).await.unwrap();

        assert_eq!(proxied.method, Method::GET);
        assert_eq!(proxied.url.as_str(), "http://backend:8000/api/display/config?token=abc");
        assert!(proxied.headers.get(header::HOST).is_none());
    }

    #[tokio::test]
    async fn test_absolute_form_is_kept() {
        let request = Request::builder()
            .uri("http://cdn.example/static/ad.mp4")
            .body(Body::empty())
            .unwrap();

        let proxied = into_proxy_request(request, &upstream()).await.unwrap();
        assert_eq!(proxied.url.as_str(), "http://cdn.example/static/ad.mp4");
    }

    #[tokio::test]
    async fn test_double_slash_path_stays_on_upstream() {
        let request = Request::builder()
            .uri("//other.host/x?y=1")
            .body(Body::empty())
            .unwrap();

        let proxied = into_proxy_request(request, &upstream()).await.unwrap();

        assert_eq!(proxied.url.host_str(), Some("backend"));
        assert_eq!(proxied.url.port(), Some(8000));
        assert_eq!(proxied.url.path(), "//other.host/x");
        assert_eq!(proxied.url.query(), Some("y=1"));
    }

    #[tokio::test]
    async fn test_conditional_headers_are_dropped() {
        let request = Request::builder()
            .uri("/api/display/config?school_id=1")
            .header(header::IF_NONE_MATCH, "\"1\"")
            .header(header::IF_MODIFIED_SINCE, "Wed, 21 Oct 2015 07:28:00 GMT")
            .header(header::IF_RANGE, "\"1\"")
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();

        let proxied = into_proxy_request(request, &upstream()).await.unwrap();

        assert!(proxied.headers.get(header::IF_NONE_MATCH).is_none());
        assert!(proxied.headers.get(header::IF_MODIFIED_SINCE).is_none());
        assert!(proxied.headers.get(header::IF_RANGE).is_none());
        assert_eq!(proxied.headers[header::ACCEPT], "application/json");
    }

    #[tokio::test]
    async fn test_websocket_upgrade_gets_socket_scheme() {
        let request = Request::builder()
            .uri("/ws/display")
            .header(header::CONNECTION, "upgrade")
            .header(header::UPGRADE, "websocket")
            .body(Body::empty())
            .unwrap();

        let proxied = into_proxy_request(request, &upstream()).await.unwrap();

        assert_eq!(proxied.url.scheme(), "ws");
        assert!(proxied.is_socket());
        assert!(proxied.headers.get(header::UPGRADE).is_none());
    }

    #[tokio::test]
    async fn test_body_is_buffered() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/heartbeat")
            .header(header::CONTENT_LENGTH, "2")
            .body(Body::from("{}"))
            .unwrap();

        let proxied = into_proxy_request(request, &upstream()).await.unwrap();

        assert_eq!(proxied.body, "{}");
        assert!(proxied.headers.get(header::CONTENT_LENGTH).is_none());
    }

    #[test]
    fn test_into_response_copies_status_and_headers() {
        let response = ProxyResponse::new(StatusCode::CREATED, "ok")
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .with_header(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));

        let out = into_response(response);

        assert_eq!(out.status(), StatusCode::CREATED);
        assert_eq!(out.headers()[header::CONTENT_TYPE], "text/plain");
        assert!(out.headers().get(header::TRANSFER_ENCODING).is_none());
    }
}
