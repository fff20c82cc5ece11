use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{trace, warn};

use crate::error::RpcError;

/// How many times to try an action and how long to wait between tries.
///
/// RPC calls use an immediate policy; polling for block transactions uses a
/// fixed delay. Both go through [`RetryPolicy::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Retry straight away, with no pause between attempts.
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::fixed_delay(max_attempts, Duration::ZERO)
    }

    pub const fn fixed_delay(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Total attempts, never less than one.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `action` until it succeeds or the attempt budget is spent.
    ///
    /// `action` receives the 1-based attempt number. The failure from the
    /// final attempt is returned inside [`Exhausted`]; no attempt is made
    /// after it and no delay follows it.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut action: F) -> Result<T, Exhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            trace!(op = label, attempt, max_attempts, "attempt");
            let err = match action(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt >= max_attempts {
                warn!(op = label, attempts = attempt, error = %err, "retries exhausted");
                return Err(Exhausted {
                    attempts: attempt,
                    last: err,
                });
            }

            warn!(
                op = label,
                attempt,
                max_attempts,
                delay_ms = self.delay.as_millis() as u64,
                error = %err,
                "attempt failed; retrying"
            );
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }
    }
}

/// The attempt budget ran out; `last` is the final attempt's failure.
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last: E,
}

impl From<Exhausted<RpcError>> for RpcError {
    fn from(exhausted: Exhausted<RpcError>) -> Self {
        RpcError::RetryExhausted {
            attempts: exhausted.attempts,
            last: Box::new(exhausted.last),
        }
    }
}
