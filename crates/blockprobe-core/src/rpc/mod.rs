//! EVM node RPC abstraction layer.
//!
//! Defines the [`NodeRpc`] trait and provides an HTTP JSON-RPC
//! implementation ([`RpcClient`]) plus a test mock (`mock::MockNode`).

mod http_adapter;
#[cfg(test)]
pub mod mock;
pub mod options;

pub use http_adapter::RpcClient;
pub use options::RpcOptions;

use async_trait::async_trait;

use crate::error::{CoreError, ErrorKind, RpcError};
use crate::types::{BlockDetails, BlockNumber, TransactionDetails, TxHash};
use crate::validate::validate;

/// Message reported when a block has no transaction to pick.
pub const TRANSACTIONS_UNAVAILABLE: &str = "Block details or transactions are not available";

/// The node operations a scenario needs.
///
/// Implementations handle transport, deadlines and retries internally and
/// report failures already categorised.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    /// Category attached to validation failures raised by provided methods.
    fn error_kind(&self) -> ErrorKind {
        ErrorKind::Rpc
    }

    /// `eth_blockNumber`.
    async fn fetch_block_number(&self) -> Result<BlockNumber, CoreError>;

    /// `eth_getBlockByNumber(number, false)`.
    async fn fetch_block_details(&self, number: &BlockNumber) -> Result<BlockDetails, CoreError>;

    /// Pick the block's first transaction hash. No I/O, no retries.
    fn fetch_transaction_hash(&self, block: &BlockDetails) -> Result<TxHash, CoreError> {
        let first = block
            .transactions
            .first()
            .ok_or_else(|| CoreError::generic(TRANSACTIONS_UNAVAILABLE))?;
        let hash = first.hash();
        validate(&serde_json::json!({ "hash": hash.as_str() }))
            .map_err(|e| CoreError::tagged(self.error_kind(), RpcError::from(e)))?;
        Ok(hash.clone())
    }

    /// `eth_getTransactionByHash(hash)`.
    async fn fetch_transaction_details(
        &self,
        hash: &TxHash,
    ) -> Result<TransactionDetails, CoreError>;
}
