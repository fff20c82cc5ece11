use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::RpcError;

/// Race `action` against a `timeout` deadline.
///
/// If the action settles first its result is returned as-is, errors
/// included. If the deadline wins the action is dropped, which aborts any
/// in-flight request, and [`RpcError::Timeout`] is returned.
pub async fn with_timeout<T, F>(timeout: Duration, action: F) -> Result<T, RpcError>
where
    F: Future<Output = Result<T, RpcError>>,
{
    match tokio::time::timeout(timeout, action).await {
        Ok(result) => result,
        Err(_) => {
            debug!(
                timeout_ms = timeout.as_millis() as u64,
                "rpc action exceeded deadline; cancelled"
            );
            Err(RpcError::Timeout)
        }
    }
}
