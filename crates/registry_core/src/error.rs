use std::time::Duration;

use shared::{domain::NetworkId, error::RpcErrorObject, Address, U256};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(String),
    #[error("bad status: {0}")]
    BadStatus(u16),
    #[error(transparent)]
    Rpc(#[from] RpcErrorObject),
    #[error("failed to decode rpc result: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::BadStatus(status.as_u16()),
            None => Self::Http(err.to_string()),
        }
    }
}

/// Why a read-only query produced no value.
#[derive(Debug, Clone, Error)]
pub enum ReadError {
    #[error("no registry contract configured for network {network_id}")]
    ContractUnset { network_id: NetworkId },
    #[error("no owner account given and no session account connected")]
    OwnerUnavailable,
    #[error("read transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("failed to decode contract return data: {0}")]
    Decode(String),
    #[error("child count {0} does not fit in u64")]
    Overflow(U256),
    #[error("read timed out after {0:?}")]
    Timeout(Duration),
}

impl ReadError {
    /// True when the query was abandoned before reaching the network.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::ContractUnset { .. } | Self::OwnerUnavailable)
    }
}

#[derive(Debug, Clone, Error)]
pub enum WriteError {
    #[error("no registry contract configured for network {network_id}")]
    Configuration { network_id: NetworkId },
    #[error("no signing wallet attached")]
    Connection,
    #[error("no authenticated account")]
    Identity,
    #[error("a registry write for {owner} is already in flight")]
    InFlight { owner: Address },
    #[error("transaction submission failed: {0}")]
    Submission(#[source] TransportError),
    #[error("transaction submission timed out after {0:?}")]
    Timeout(Duration),
}
