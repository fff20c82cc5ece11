//! Domain types for the block → transaction scenario.
//!
//! Hex-encoded identifiers are kept as validated strings rather than decoded
//! integers or byte arrays: the node's own formatting (including leading
//! zeros) is what callers compare against. Payload structs keep every field
//! the node returned that is not modelled explicitly, in `extra`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validate::{is_hash32, is_hex_quantity};

// ==============================================================================
// Hex Identifiers
// ==============================================================================

/// A block number as returned by the node: `0x`-prefixed hex, any length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockNumber(String);

impl BlockNumber {
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if is_hex_quantity(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::BlockNumber(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, or `None` if it does not fit in a `u64`.
    pub fn to_u64(&self) -> Option<u64> {
        u64::from_str_radix(self.0.get(2..)?, 16).ok()
    }
}

/// A 32-byte transaction hash: `0x` followed by 64 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(String);

impl TxHash {
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if is_hash32(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::Hash(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A 32-byte block hash, same format as [`TxHash`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockHash(String);

impl BlockHash {
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if is_hash32(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::Hash(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_hex_string {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_hex_string!(BlockNumber);
impl_hex_string!(TxHash);
impl_hex_string!(BlockHash);

// ==============================================================================
// Block Payload
// ==============================================================================

/// One entry of a block's `transactions` array. Nodes return bare hashes
/// unless full transaction objects were requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransaction {
    Hash(TxHash),
    Full(Box<TransactionDetails>),
}

impl BlockTransaction {
    pub fn hash(&self) -> &TxHash {
        match self {
            Self::Hash(hash) => hash,
            Self::Full(tx) => &tx.hash,
        }
    }
}

/// Result of `eth_getBlockByNumber`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDetails {
    pub number: BlockNumber,
    pub hash: BlockHash,
    #[serde(default)]
    pub transactions: Vec<BlockTransaction>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BlockDetails {
    pub fn has_transactions(&self) -> bool {
        !self.transactions.is_empty()
    }
}

// ==============================================================================
// Transaction Payload
// ==============================================================================

/// Result of `eth_getTransactionByHash`.
///
/// `to` is `None` for contract creation. `transaction_index` and
/// `block_number` are `None` while the transaction is pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub hash: TxHash,
    #[serde(default)]
    pub transaction_index: Option<String>,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub block_number: Option<BlockNumber>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
