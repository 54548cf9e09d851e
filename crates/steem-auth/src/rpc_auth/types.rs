//! JSON-RPC request and signed envelope types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC protocol version carried by every signed envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// An unsigned JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Method name, e.g. `get_account`.
    pub method: String,
    /// Request parameters of any JSON shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Request id echoed back by the server.
    pub id: u64,
}

impl RpcRequest {
    /// Creates a request with parameters.
    pub fn new(method: impl Into<String>, params: Value, id: u64) -> Self {
        Self {
            method: method.into(),
            params: Some(params),
            id,
        }
    }
}

/// A signed JSON-RPC request envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedRequest {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Method name of the wrapped request.
    pub method: String,
    /// Id of the wrapped request.
    pub id: u64,
    /// Params object holding only the signed payload.
    pub params: SignedParams,
}

/// The `params` object of a signed envelope. It has exactly one key,
/// `__signed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignedParams {
    /// The signed payload.
    #[serde(rename = "__signed")]
    pub signed: SignedPayload,
}

/// The signed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    /// Signing account name.
    pub account: String,
    /// 8 random bytes, hex.
    pub nonce: String,
    /// Base64 of the JSON-encoded original params.
    pub params: String,
    /// Hex signatures, one per signing key.
    pub signatures: Vec<String>,
    /// ISO-8601 UTC signing time with milliseconds.
    pub timestamp: String,
}
