use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error object carried by a failed JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("rpc error {code}: {message}")]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorObject {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Code geth and anvil use for reverted `eth_call`s.
pub const RPC_EXECUTION_REVERTED: i64 = 3;
