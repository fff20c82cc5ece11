//! Block → transaction scenario driver.
//!
//! A [`ScenarioBuilder`] walks one node through four dependent calls:
//! block number, block details, first transaction hash, transaction details.
//! Each stage needs the previous stage's output, which the builder holds in
//! its [`ScenarioState`]. A builder makes a single forward pass and cannot
//! be reset.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::exec::RetryPolicy;
use crate::rpc::{NodeRpc, TRANSACTIONS_UNAVAILABLE};
use crate::types::{BlockDetails, BlockNumber, TransactionDetails, TxHash};

pub const BLOCK_NUMBER_UNAVAILABLE: &str = "Block number is not available";
pub const TRANSACTION_HASH_UNAVAILABLE: &str = "Transaction hash is not available";
pub const TRANSACTIONS_UNAVAILABLE_AFTER_RETRIES: &str =
    "Block details or transactions are not available after maximum retries";

/// Polling used while a fresh block has not propagated its transactions.
pub const DEFAULT_POLL_POLICY: RetryPolicy =
    RetryPolicy::fixed_delay(3, Duration::from_millis(2000));

// ==============================================================================
// State Machine
// ==============================================================================

/// Stage tag of a [`ScenarioState`], ordered by progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScenarioStage {
    Idle,
    HaveBlockNumber,
    HaveBlockDetails,
    HaveTransactionHash,
    Done,
}

impl fmt::Display for ScenarioStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::HaveBlockNumber => write!(f, "have_block_number"),
            Self::HaveBlockDetails => write!(f, "have_block_details"),
            Self::HaveTransactionHash => write!(f, "have_transaction_hash"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Values gathered so far. Each variant carries everything the earlier
/// stages produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioState {
    Idle,
    HaveBlockNumber {
        block_number: BlockNumber,
    },
    HaveBlockDetails {
        block_number: BlockNumber,
        block_details: BlockDetails,
    },
    HaveTransactionHash {
        block_number: BlockNumber,
        block_details: BlockDetails,
        transaction_hash: TxHash,
    },
    Done(ScenarioReport),
}

impl ScenarioState {
    pub fn stage(&self) -> ScenarioStage {
        match self {
            Self::Idle => ScenarioStage::Idle,
            Self::HaveBlockNumber { .. } => ScenarioStage::HaveBlockNumber,
            Self::HaveBlockDetails { .. } => ScenarioStage::HaveBlockDetails,
            Self::HaveTransactionHash { .. } => ScenarioStage::HaveTransactionHash,
            Self::Done(_) => ScenarioStage::Done,
        }
    }
}

/// Everything a completed scenario produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub block_number: BlockNumber,
    pub block_details: BlockDetails,
    pub transaction_hash: TxHash,
    pub transaction_details: TransactionDetails,
}

// ==============================================================================
// Builder
// ==============================================================================

pub struct ScenarioBuilder<'a> {
    rpc: &'a dyn NodeRpc,
    state: ScenarioState,
    poll: RetryPolicy,
}

impl<'a> ScenarioBuilder<'a> {
    pub fn new(rpc: &'a dyn NodeRpc) -> Self {
        Self {
            rpc,
            state: ScenarioState::Idle,
            poll: DEFAULT_POLL_POLICY,
        }
    }

    /// Override how long to wait for a block's transactions to appear.
    pub fn with_poll_policy(mut self, poll: RetryPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn state(&self) -> &ScenarioState {
        &self.state
    }

    pub fn stage(&self) -> ScenarioStage {
        self.state.stage()
    }

    /// The completed report, once the final stage has run.
    pub fn report(&self) -> Option<&ScenarioReport> {
        match &self.state {
            ScenarioState::Done(report) => Some(report),
            _ => None,
        }
    }

    /// Run all four stages in order.
    pub async fn run(mut self) -> Result<ScenarioReport, CoreError> {
        self.fetch_block_number().await?;
        self.fetch_block_details().await?;
        self.fetch_transaction_hash().await?;
        self.fetch_transaction_details().await?;
        match self.state {
            ScenarioState::Done(report) => Ok(report),
            other => Err(out_of_order("run", other.stage())),
        }
    }

    /// `Idle → HaveBlockNumber`.
    pub async fn fetch_block_number(&mut self) -> Result<BlockNumber, CoreError> {
        if self.stage() != ScenarioStage::Idle {
            return Err(out_of_order("fetch_block_number", self.stage()));
        }

        let block_number = self.rpc.fetch_block_number().await?;
        info!(block_number = %block_number, "scenario: block number");
        self.state = ScenarioState::HaveBlockNumber {
            block_number: block_number.clone(),
        };
        Ok(block_number)
    }

    /// `HaveBlockNumber → HaveBlockDetails`.
    pub async fn fetch_block_details(&mut self) -> Result<BlockDetails, CoreError> {
        let block_number = match &self.state {
            ScenarioState::Idle => return Err(CoreError::generic(BLOCK_NUMBER_UNAVAILABLE)),
            ScenarioState::HaveBlockNumber { block_number } => block_number.clone(),
            other => return Err(out_of_order("fetch_block_details", other.stage())),
        };

        let block_details = self.rpc.fetch_block_details(&block_number).await?;
        info!(
            block_number = %block_number,
            block_hash = %block_details.hash,
            transactions = block_details.transactions.len(),
            "scenario: block details"
        );
        self.state = ScenarioState::HaveBlockDetails {
            block_number,
            block_details: block_details.clone(),
        };
        Ok(block_details)
    }

    /// `HaveBlockDetails → HaveTransactionHash`.
    ///
    /// If the stored block has no transactions yet, the block is re-fetched
    /// under the poll policy. The first attempt inspects the stored block,
    /// later attempts fetch it again.
    pub async fn fetch_transaction_hash(&mut self) -> Result<TxHash, CoreError> {
        let (block_number, stored) = match &self.state {
            ScenarioState::Idle | ScenarioState::HaveBlockNumber { .. } => {
                return Err(CoreError::generic(TRANSACTIONS_UNAVAILABLE))
            }
            ScenarioState::HaveBlockDetails {
                block_number,
                block_details,
            } => (block_number.clone(), block_details.clone()),
            other => return Err(out_of_order("fetch_transaction_hash", other.stage())),
        };

        let rpc = self.rpc;
        let block_number_ref = &block_number;
        let stored_ref = &stored;
        let polled = self
            .poll
            .run("await_block_transactions", move |attempt| async move {
                let block = if attempt == 1 {
                    stored_ref.clone()
                } else {
                    match rpc.fetch_block_details(block_number_ref).await {
                        Ok(block) => block,
                        // Node failures end the poll; only an empty block is retried.
                        Err(err) => return Ok(Err(err)),
                    }
                };
                if block.has_transactions() {
                    Ok(Ok(block))
                } else {
                    debug!(attempt, block_number = %block.number, "block has no transactions yet");
                    Err(NoTransactions(block.number))
                }
            })
            .await;

        let block_details = match polled {
            Ok(Ok(block)) => block,
            Ok(Err(err)) => return Err(err),
            Err(_) => return Err(CoreError::generic(TRANSACTIONS_UNAVAILABLE_AFTER_RETRIES)),
        };

        let transaction_hash = self.rpc.fetch_transaction_hash(&block_details)?;
        info!(tx_hash = %transaction_hash, "scenario: transaction hash");
        self.state = ScenarioState::HaveTransactionHash {
            block_number,
            block_details,
            transaction_hash: transaction_hash.clone(),
        };
        Ok(transaction_hash)
    }

    /// `HaveTransactionHash → Done`.
    pub async fn fetch_transaction_details(&mut self) -> Result<TransactionDetails, CoreError> {
        let (block_number, block_details, transaction_hash) = match &self.state {
            ScenarioState::HaveTransactionHash {
                block_number,
                block_details,
                transaction_hash,
            } => (
                block_number.clone(),
                block_details.clone(),
                transaction_hash.clone(),
            ),
            ScenarioState::Done(_) => {
                return Err(out_of_order("fetch_transaction_details", ScenarioStage::Done))
            }
            _ => return Err(CoreError::generic(TRANSACTION_HASH_UNAVAILABLE)),
        };

        let transaction_details = self.rpc.fetch_transaction_details(&transaction_hash).await?;
        info!(tx_hash = %transaction_hash, "scenario: transaction details");
        self.state = ScenarioState::Done(ScenarioReport {
            block_number,
            block_details,
            transaction_hash,
            transaction_details: transaction_details.clone(),
        });
        Ok(transaction_details)
    }
}

fn out_of_order(operation: &str, stage: ScenarioStage) -> CoreError {
    CoreError::generic(format!(
        "{operation} called out of order: scenario is at stage {stage}"
    ))
}

/// Poll failure: the block is still empty.
struct NoTransactions(BlockNumber);

impl fmt::Display for NoTransactions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block {} has no transactions yet", self.0)
    }
}
