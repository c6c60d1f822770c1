//! reqwest-backed transport: POSTs envelope bytes, gzip accepted.

use std::time::Duration;

use chrforge_core::errors::{ForgeResult, RpcError, CODE_CONNECTION, CODE_TIMEOUT};
use chrforge_core::traits::{ITransport, TransportRequest, TransportResponse};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> ForgeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| transport_error(&e))?;
        Ok(Self { client })
    }

    /// Wrap a preconfigured client (proxies, TLS roots, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn transport_error(e: &reqwest::Error) -> chrforge_core::ForgeError {
    let code = if e.is_timeout() { CODE_TIMEOUT } else { CODE_CONNECTION };
    RpcError::transport(code, e.to_string()).into()
}

impl ITransport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> ForgeResult<TransportResponse> {
        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&e))?
            .to_vec();

        tracing::trace!(status, bytes = body.len(), "http reply");
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
