//! Network access used by the interception strategies.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::Result;
use crate::proxy::message::{strip_hop_by_hop, ProxyRequest, ProxyResponse};

// == Network Trait ==
/// Issues a request to the network.
///
/// Fails asynchronously on transport errors. Any completed response, whatever
/// its status, is a success.
pub trait Network: Send + Sync + 'static {
    fn fetch(&self, request: ProxyRequest) -> impl Future<Output = Result<ProxyResponse>> + Send;
}

// == HTTP Network ==
/// Network backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    /// Builds a client with the given transport timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

impl Network for HttpNetwork {
    async fn fetch(&self, request: ProxyRequest) -> Result<ProxyResponse> {
        debug!("Fetching {} {}", request.method, request.url);

        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let mut headers = response.headers().clone();
        strip_hop_by_hop(&mut headers);
        let body = response.bytes().await?;

        Ok(ProxyResponse {
            status,
            headers,
            body,
        })
    }
}
