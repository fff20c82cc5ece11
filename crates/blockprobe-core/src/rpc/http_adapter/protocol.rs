use serde::{Deserialize, Deserializer};

use crate::error::RpcError;

#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) method: &'a str,
    pub(super) params: &'a [serde_json::Value],
    pub(super) id: u64,
}

#[derive(serde::Deserialize)]
pub(super) struct JsonRpcResponse {
    #[serde(default)]
    pub(super) id: serde_json::Value,
    /// `Some(Value::Null)` when the node sent `"result": null`, `None` when
    /// the field is absent.
    #[serde(default, deserialize_with = "present_value")]
    pub(super) result: Option<serde_json::Value>,
    /// `"error": null` reads as `None`; some servers always send the key.
    #[serde(default)]
    pub(super) error: Option<serde_json::Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl JsonRpcResponse {
    /// Resolve the response for request `expected_id` into its result.
    pub(super) fn into_result(self, expected_id: u64) -> Result<serde_json::Value, RpcError> {
        let id = parse_response_id(&self.id)?;
        if id != expected_id {
            return Err(RpcError::InvalidResponse(format!(
                "response id {id} does not match request id {expected_id}"
            )));
        }

        match (self.result, self.error) {
            (Some(result), None) => Ok(result),
            (None, Some(err)) => Err(parse_jsonrpc_error(err)),
            (Some(_), Some(_)) => Err(RpcError::InvalidResponse(
                "response carries both result and error".to_string(),
            )),
            (None, None) => Err(RpcError::InvalidResponse(
                "response carries neither result nor error".to_string(),
            )),
        }
    }
}

/// Parse a JSON-RPC error value into a structured `RpcError`.
///
/// JSON-RPC 2.0 defines errors as `{"code": <int>, "message": <string>}`.
/// If the error value matches that shape, we produce a `ServerError`;
/// otherwise we fall back to `InvalidResponse` with the raw JSON.
pub(super) fn parse_jsonrpc_error(err: serde_json::Value) -> RpcError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
    }

    match serde_json::from_value::<JsonRpcError>(err.clone()) {
        Ok(parsed) => RpcError::ServerError {
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) => RpcError::InvalidResponse(format!("non-standard JSON-RPC error: {err}")),
    }
}

pub(super) fn parse_response_id(id: &serde_json::Value) -> Result<u64, RpcError> {
    if let Some(n) = id.as_u64() {
        return Ok(n);
    }

    if let Some(s) = id.as_str() {
        return s
            .parse::<u64>()
            .map_err(|e| RpcError::InvalidResponse(format!("invalid response id string: {e}")));
    }

    Err(RpcError::InvalidResponse(format!("invalid response id: {id}")))
}
