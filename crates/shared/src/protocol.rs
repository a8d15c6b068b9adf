use alloy_primitives::{Address, Bytes, U64};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcErrorObject;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
// Variant order matters: `result: Value` also matches an error body.
#[serde(untagged)]
pub enum RpcResponse {
    Error { id: Value, error: RpcErrorObject },
    Success { id: Value, result: Value },
}

/// Parameters of `eth_call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallObject {
    pub to: Address,
    pub data: Bytes,
}

/// Parameters of `eth_sendTransaction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionObject {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub chain_id: U64,
}
