use std::time::Duration;

use crate::error::ErrorKind;
use crate::exec::RetryPolicy;

/// Default deadline for one client operation, retries included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Attempts per client operation.
pub const DEFAULT_RPC_ATTEMPTS: u32 = 2;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`super::RpcClient`].
#[derive(Debug, Clone)]
pub struct RpcOptions {
    /// Deadline raced against each operation (all of its retries).
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Category attached to failures this client reports.
    pub error_kind: ErrorKind,
    pub connect_timeout: Duration,
    /// Outbound request rate limit; `None` disables limiting.
    pub requests_per_second: Option<u32>,
}

impl Default for RpcOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::immediate(DEFAULT_RPC_ATTEMPTS),
            error_kind: ErrorKind::Rpc,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            requests_per_second: None,
        }
    }
}

impl RpcOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_error_kind(mut self, kind: ErrorKind) -> Self {
        self.error_kind = kind;
        self
    }

    pub fn with_requests_per_second(mut self, limit: Option<u32>) -> Self {
        self.requests_per_second = limit;
        self
    }
}
