//! Native JSON-RPC client for EVM node endpoints.
//!
//! Implements [`super::NodeRpc`] over HTTP using `reqwest`, with optional
//! request rate limiting and the timeout/retry/validation composition
//! described on [`RpcClient`].

mod client;
mod connection;
mod protocol;
mod transport;

pub use client::RpcClient;
