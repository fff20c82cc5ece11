//! Execution policies composed around RPC calls: a deadline race and a
//! bounded retry loop.

mod retry;
mod timeout;

pub use retry::{Exhausted, RetryPolicy};
pub use timeout::with_timeout;
