use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{header, Url};
use tracing::{debug, trace, warn};

use crate::error::{CoreError, RpcError};
use crate::rpc::options::RpcOptions;

use super::protocol::{JsonRpcRequest, JsonRpcResponse};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// One JSON-RPC request/response exchange over HTTP POST.
///
/// No retries and no deadline here; the client composes those around
/// [`HttpTransport::send`].
pub(super) struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    limiter: Option<DirectRateLimiter>,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub(super) fn new(url: Url, options: &RpcOptions) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| CoreError::generic(format!("build HTTP client: {e}")))?;

        let limiter = match options.requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    CoreError::generic("requests_per_second must be at least 1")
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            url,
            limiter,
            next_id: AtomicU64::new(initial_request_id()),
        })
    }

    pub(super) fn url(&self) -> &Url {
        &self.url
    }

    /// Send `method(params)` and return the response's `result` value.
    pub(super) async fn send(
        &self,
        method: &str,
        params: &[serde_json::Value],
    ) -> Result<serde_json::Value, RpcError> {
        let result = self.exchange(method, params).await;
        if let Err(err) = &result {
            warn!(rpc.method = method, error = %err, "rpc call failed");
        }
        result
    }

    async fn exchange(
        &self,
        method: &str,
        params: &[serde_json::Value],
    ) -> Result<serde_json::Value, RpcError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.len(),
            "rpc call"
        );
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        let response = self
            .client
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&req)
            .send()
            .await?;
        let status = response.status();

        let body = response.text().await?;
        debug!(rpc.id = id, rpc.method = method, %status, body_len = body.len(), "rpc response");
        trace!(rpc.id = id, rpc.method = method, body = %body, "rpc response body");

        if !status.is_success() {
            return Err(RpcError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let decoded: JsonRpcResponse = serde_json::from_str(&body).map_err(|e| {
            RpcError::InvalidResponse(format!("decode JSON-RPC response: {e}; body={body}"))
        })?;

        decoded.into_result(id)
    }
}

/// Seed request ids from the clock in milliseconds, which keeps them inside
/// the range JSON number parsers represent exactly.
fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1)
}
