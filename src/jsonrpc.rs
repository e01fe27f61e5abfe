//! JSON-RPC 2.0 envelope types. The core is agnostic to `method` and
//! `params` — it forwards requests and returns responses without
//! interpreting `result`/`error`, leaving that to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Value::from(1),
            method: method.into(),
            params,
        }
    }
}

/// The raw JSON-RPC response, returned to the caller without interpretation
/// — the caller inspects `error`/`result` itself.
pub type JsonRpcResponse = Value;
