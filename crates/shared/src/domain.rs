use std::fmt;

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkId(pub u64);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the registry contract lives on a network, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractAddress {
    Deployed(Address),
    Unset,
}

impl ContractAddress {
    /// Placeholder zero addresses in a network table count as not deployed.
    pub fn from_configured(address: Address) -> Self {
        if address.is_zero() {
            Self::Unset
        } else {
            Self::Deployed(address)
        }
    }

    pub fn deployed(self) -> Option<Address> {
        match self {
            Self::Deployed(address) => Some(address),
            Self::Unset => None,
        }
    }

    pub fn is_unset(self) -> bool {
        matches!(self, Self::Unset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRecord {
    pub account: Address,
    pub role: String,
}

impl ChildRecord {
    pub fn new(account: Address, role: impl Into<String>) -> Self {
        Self {
            account,
            role: role.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHandle(pub B256);

impl fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
