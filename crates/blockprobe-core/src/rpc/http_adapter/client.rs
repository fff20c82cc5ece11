use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{CoreError, ErrorKind, RpcError};
use crate::exec::with_timeout;
use crate::rpc::options::RpcOptions;
use crate::rpc::NodeRpc;
use crate::types::{BlockDetails, BlockNumber, TransactionDetails, TxHash};
use crate::validate::validate;

use super::connection::parse_connection;
use super::transport::HttpTransport;

/// JSON-RPC client for one EVM node endpoint.
///
/// Every operation is `timeout(retry(send + validate))`: the deadline covers
/// all attempts, and a response that fails validation is retried the same
/// way as a transport failure. Failures leave the client tagged with
/// [`RpcOptions::error_kind`].
pub struct RpcClient {
    transport: HttpTransport,
    options: RpcOptions,
}

impl RpcClient {
    /// Create a client for an `http://` or `https://` endpoint.
    pub fn new(endpoint: &str, options: RpcOptions) -> Result<Self, CoreError> {
        let url = parse_connection(endpoint)?;
        let transport = HttpTransport::new(url, &options)?;
        Ok(Self { transport, options })
    }

    pub fn endpoint(&self) -> &str {
        self.transport.url().as_str()
    }

    pub fn options(&self) -> &RpcOptions {
        &self.options
    }

    async fn call<T, F>(
        &self,
        method: &'static str,
        params: Vec<Value>,
        check: F,
    ) -> Result<T, CoreError>
    where
        F: Fn(Value) -> Result<T, RpcError>,
    {
        let transport = &self.transport;
        let params = params.as_slice();
        let check = &check;
        let attempts = self.options.retry.run(method, move |_| async move {
            let raw = transport.send(method, params).await?;
            check(raw)
        });

        with_timeout(self.options.timeout, async {
            attempts.await.map_err(RpcError::from)
        })
        .await
        .map_err(|err| CoreError::tagged(self.options.error_kind, err))
    }
}

#[async_trait]
impl NodeRpc for RpcClient {
    fn error_kind(&self) -> ErrorKind {
        self.options.error_kind
    }

    async fn fetch_block_number(&self) -> Result<BlockNumber, CoreError> {
        let number = self
            .call("eth_blockNumber", Vec::new(), decode_block_number)
            .await?;
        debug!(block_number = %number, "fetched block number");
        Ok(number)
    }

    async fn fetch_block_details(&self, number: &BlockNumber) -> Result<BlockDetails, CoreError> {
        let block = self
            .call(
                "eth_getBlockByNumber",
                vec![json!(number.as_str()), json!(false)],
                decode_validated::<BlockDetails>,
            )
            .await?;
        debug!(
            block_number = %block.number,
            transactions = block.transactions.len(),
            "fetched block details"
        );
        Ok(block)
    }

    async fn fetch_transaction_details(
        &self,
        hash: &TxHash,
    ) -> Result<TransactionDetails, CoreError> {
        let tx = self
            .call(
                "eth_getTransactionByHash",
                vec![json!(hash.as_str())],
                decode_validated::<TransactionDetails>,
            )
            .await?;
        debug!(tx_hash = %tx.hash, "fetched transaction details");
        Ok(tx)
    }
}

// ==============================================================================
// Result Decoding
// ==============================================================================

/// `eth_blockNumber` returns a bare hex string; it is checked as a
/// `{number: result}` payload.
fn decode_block_number(raw: Value) -> Result<BlockNumber, RpcError> {
    validate(&json!({ "number": &raw }))?;
    match raw {
        Value::String(number) => Ok(BlockNumber::parse(number)?),
        other => Err(RpcError::InvalidResponse(format!(
            "block number is not a string: {other}"
        ))),
    }
}

fn decode_validated<T: DeserializeOwned>(raw: Value) -> Result<T, RpcError> {
    validate(&raw)?;
    serde_json::from_value(raw).map_err(|e| {
        RpcError::InvalidResponse(format!(
            "decode {}: {e}",
            std::any::type_name::<T>()
                .rsplit("::")
                .next()
                .unwrap_or("payload")
        ))
    })
}
