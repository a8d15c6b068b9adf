use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shared::{
    domain::{NetworkId, TransactionHandle},
    protocol::{CallObject, RpcRequest, RpcResponse, TransactionObject},
    Address, Bytes, B256, U64,
};
use tracing::debug;

use crate::{error::TransportError, network::TransportConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub network_id: NetworkId,
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
}

/// Executes read-only contract calls against a network endpoint.
#[async_trait]
pub trait ReadTransport: Send + Sync {
    async fn call(
        &self,
        endpoint: &TransportConfig,
        request: CallRequest,
    ) -> Result<Bytes, TransportError>;
}

/// A wallet able to sign and submit mutating contract calls.
#[async_trait]
pub trait SigningTransport: Send + Sync {
    async fn submit(
        &self,
        endpoint: &TransportConfig,
        request: TransactionRequest,
    ) -> Result<TransactionHandle, TransportError>;
}

/// Ethereum JSON-RPC over HTTP. Signing goes through `eth_sendTransaction`,
/// so the node (or a wallet bridge in front of it) must manage the account.
pub struct JsonRpcTransport {
    http: Client,
    next_id: AtomicU64,
}

impl Default for JsonRpcTransport {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl JsonRpcTransport {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn send_rpc_request<T: DeserializeOwned>(
        &self,
        endpoint: &TransportConfig,
        method: &str,
        params: Value,
    ) -> Result<T, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcRequest::new(id, method, params);
        debug!(
            "rpc: request method={} id={} network={} url={}",
            method, id, endpoint.network_id, endpoint.rpc_url
        );

        let response = self.http.post(&endpoint.rpc_url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(TransportError::BadStatus(response.status().as_u16()));
        }

        let response: RpcResponse = response
            .json()
            .await
            .map_err(|err| TransportError::Decode(err.to_string()))?;

        match response {
            RpcResponse::Success { result, .. } => {
                debug!("rpc: response method={} id={} ok=true", method, id);
                serde_json::from_value(result).map_err(|err| TransportError::Decode(err.to_string()))
            }
            RpcResponse::Error { error, .. } => {
                debug!(
                    "rpc: response method={} id={} ok=false code={}",
                    method, id, error.code
                );
                Err(TransportError::Rpc(error))
            }
        }
    }
}

#[async_trait]
impl ReadTransport for JsonRpcTransport {
    async fn call(
        &self,
        endpoint: &TransportConfig,
        request: CallRequest,
    ) -> Result<Bytes, TransportError> {
        let call = CallObject {
            to: request.to,
            data: request.data,
        };
        self.send_rpc_request(endpoint, "eth_call", json!([call, "latest"]))
            .await
    }
}

#[async_trait]
impl SigningTransport for JsonRpcTransport {
    async fn submit(
        &self,
        endpoint: &TransportConfig,
        request: TransactionRequest,
    ) -> Result<TransactionHandle, TransportError> {
        let tx = TransactionObject {
            from: request.from,
            to: request.to,
            data: request.data,
            chain_id: U64::from(request.network_id.0),
        };
        let hash: B256 = self
            .send_rpc_request(endpoint, "eth_sendTransaction", json!([tx]))
            .await?;
        Ok(TransactionHandle(hash))
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
