use std::fmt;

// ==============================================================================
// Error Categories
// ==============================================================================

/// Category attached to every failure that crosses the core boundary.
///
/// The core itself only produces [`ErrorKind::Rpc`] (or whatever kind the
/// caller configured on the client) and [`ErrorKind::Generic`]. The wallet
/// and user API kinds belong to callers that share this taxonomy for their
/// own API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Rpc,
    WalletApi,
    UserApi,
    Generic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rpc => write!(f, "rpc"),
            Self::WalletApi => write!(f, "wallet_api"),
            Self::UserApi => write!(f, "user_api"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

// ==============================================================================
// Boundary Error
// ==============================================================================

/// A categorised failure: `{kind, message}` plus the underlying RPC failure,
/// when there is one, as the error source.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CoreError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<RpcError>,
}

impl CoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Contract violations and other failures with no RPC cause.
    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Generic, message)
    }

    /// Tag an RPC-layer failure with `kind`.
    ///
    /// Exhausted retries report the message of the last attempt's failure;
    /// the full retry error stays reachable through `source()`.
    pub fn tagged(kind: ErrorKind, err: RpcError) -> Self {
        let message = match &err {
            RpcError::RetryExhausted { last, .. } => last.to_string(),
            other => other.to_string(),
        };
        Self {
            kind,
            message,
            source: Some(err),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn rpc_error(&self) -> Option<&RpcError> {
        self.source.as_ref()
    }
}

// ==============================================================================
// RPC Layer Errors
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("RPC Error: {message}")]
    ServerError { code: i64, message: String },

    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),

    #[error("API request timed out")]
    Timeout,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("gave up after {attempts} attempts: {last}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last: Box<RpcError>,
    },
}

impl RpcError {
    /// The innermost failure, looking through retry exhaustion.
    pub fn root(&self) -> &RpcError {
        match self {
            Self::RetryExhausted { last, .. } => last.root(),
            other => other,
        }
    }
}

/// Shape violations found by [`crate::validate::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("response payload is empty")]
    EmptyPayload,

    #[error("response payload carries an error: {0}")]
    Embedded(String),

    #[error("invalid block number `{0}`: expected 0x-prefixed hex quantity")]
    BlockNumber(String),

    #[error("invalid hash `{0}`: expected 0x-prefixed 32-byte hex")]
    Hash(String),

    #[error("invalid `{field}` address `{value}`: expected 0x-prefixed 20-byte hex")]
    Address { field: &'static str, value: String },

    #[error("invalid transaction index `{0}`: expected 0x-prefixed hex quantity")]
    TransactionIndex(String),

    #[error("payload does not conform to a block or transaction shape")]
    UnrecognizedShape,
}
