use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CoreError, ErrorKind, RpcError};
use crate::types::{BlockDetails, BlockNumber, TransactionDetails, TxHash};

use super::NodeRpc;

/// A scripted node for testing. Block details are served in the order they
/// were added; the last one repeats once the script runs out.
pub struct MockNode {
    block_number: Option<BlockNumber>,
    blocks: Mutex<VecDeque<BlockDetails>>,
    transaction: Option<TransactionDetails>,
    block_number_calls: AtomicUsize,
    block_details_calls: AtomicUsize,
    transaction_details_calls: AtomicUsize,
}

/// Per-method invocation counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockCalls {
    pub block_number: usize,
    pub block_details: usize,
    pub transaction_details: usize,
}

impl MockCalls {
    pub fn total(&self) -> usize {
        self.block_number + self.block_details + self.transaction_details
    }
}

impl MockNode {
    pub fn builder() -> MockNodeBuilder {
        MockNodeBuilder {
            block_number: None,
            blocks: VecDeque::new(),
            transaction: None,
        }
    }

    pub fn calls(&self) -> MockCalls {
        MockCalls {
            block_number: self.block_number_calls.load(Ordering::SeqCst),
            block_details: self.block_details_calls.load(Ordering::SeqCst),
            transaction_details: self.transaction_details_calls.load(Ordering::SeqCst),
        }
    }
}

pub struct MockNodeBuilder {
    block_number: Option<BlockNumber>,
    blocks: VecDeque<BlockDetails>,
    transaction: Option<TransactionDetails>,
}

impl MockNodeBuilder {
    pub fn with_block_number(mut self, number: BlockNumber) -> Self {
        self.block_number = Some(number);
        self
    }

    pub fn with_block(mut self, block: BlockDetails) -> Self {
        self.blocks.push_back(block);
        self
    }

    pub fn with_transaction(mut self, tx: TransactionDetails) -> Self {
        self.transaction = Some(tx);
        self
    }

    pub fn build(self) -> MockNode {
        MockNode {
            block_number: self.block_number,
            blocks: Mutex::new(self.blocks),
            transaction: self.transaction,
            block_number_calls: AtomicUsize::new(0),
            block_details_calls: AtomicUsize::new(0),
            transaction_details_calls: AtomicUsize::new(0),
        }
    }
}

fn not_found(what: &str) -> CoreError {
    CoreError::tagged(
        ErrorKind::Rpc,
        RpcError::ServerError {
            code: -32000,
            message: format!("{what} not found"),
        },
    )
}

#[async_trait]
impl NodeRpc for MockNode {
    async fn fetch_block_number(&self) -> Result<BlockNumber, CoreError> {
        self.block_number_calls.fetch_add(1, Ordering::SeqCst);
        self.block_number.clone().ok_or_else(|| not_found("block number"))
    }

    async fn fetch_block_details(&self, number: &BlockNumber) -> Result<BlockDetails, CoreError> {
        self.block_details_calls.fetch_add(1, Ordering::SeqCst);
        let mut blocks = self.blocks.lock().expect("mock blocks poisoned");
        let block = if blocks.len() > 1 {
            blocks.pop_front()
        } else {
            blocks.front().cloned()
        };
        block
            .filter(|block| &block.number == number)
            .ok_or_else(|| not_found(&format!("block {number}")))
    }

    async fn fetch_transaction_details(
        &self,
        hash: &TxHash,
    ) -> Result<TransactionDetails, CoreError> {
        self.transaction_details_calls.fetch_add(1, Ordering::SeqCst);
        self.transaction
            .clone()
            .filter(|tx| &tx.hash == hash)
            .ok_or_else(|| not_found(&format!("transaction {hash}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    fn block(number: &str, hashes: &[&str]) -> BlockDetails {
        serde_json::from_value(block_json(number, hashes)).expect("fixture block must decode")
    }

    #[tokio::test]
    async fn blocks_are_served_in_order_and_last_repeats() {
        let number = BlockNumber::parse("0x10").expect("valid number");
        let tx = hash_from_byte(1);
        let rpc = MockNode::builder()
            .with_block(block("0x10", &[]))
            .with_block(block("0x10", &[&tx]))
            .build();

        let first = rpc.fetch_block_details(&number).await.unwrap();
        let second = rpc.fetch_block_details(&number).await.unwrap();
        let third = rpc.fetch_block_details(&number).await.unwrap();

        assert!(first.transactions.is_empty());
        assert_eq!(second.transactions.len(), 1);
        assert_eq!(third, second);
        assert_eq!(rpc.calls().block_details, 3);
    }

    #[tokio::test]
    async fn unknown_block_number_is_an_rpc_error() {
        let rpc = MockNode::builder().with_block(block("0x10", &[])).build();
        let other = BlockNumber::parse("0x11").expect("valid number");

        let err = rpc.fetch_block_details(&other).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rpc);
        assert_eq!(err.to_string(), "RPC Error: block 0x11 not found");
    }
}
