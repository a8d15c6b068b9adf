use std::sync::Arc;

use shared::{
    domain::{ContractAddress, NetworkId},
    Address,
};
use url::Url;

pub const LOCAL_NETWORK_ID: NetworkId = NetworkId(31337);
pub const DEFAULT_LOCAL_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_PUBLIC_RPC_TEMPLATE: &str = "https://{network_id}.rpc.thirdweb.com";
const NETWORK_ID_PLACEHOLDER: &str = "{network_id}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkEntry {
    pub network_id: NetworkId,
    pub name: String,
    pub contract: ContractAddress,
    pub local: bool,
    pub rpc_url: Option<Url>,
}

impl NetworkEntry {
    pub fn new(network_id: NetworkId, name: impl Into<String>, contract: Address) -> Self {
        Self {
            network_id,
            name: name.into(),
            contract: ContractAddress::from_configured(contract),
            local: false,
            rpc_url: None,
        }
    }

    pub fn local(mut self) -> Self {
        self.local = true;
        self
    }

    pub fn with_rpc_url(mut self, rpc_url: Url) -> Self {
        self.rpc_url = Some(rpc_url);
        self
    }
}

/// Immutable network selection table. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkTable {
    entries: Arc<Vec<NetworkEntry>>,
    public_rpc_template: String,
    local_rpc_url: String,
}

impl Default for NetworkTable {
    fn default() -> Self {
        Self {
            entries: Arc::new(vec![
                NetworkEntry::new(LOCAL_NETWORK_ID, "local", Address::ZERO).local(),
                NetworkEntry::new(NetworkId(1), "mainnet", Address::ZERO),
                NetworkEntry::new(NetworkId(11_155_111), "sepolia", Address::ZERO),
                NetworkEntry::new(NetworkId(8453), "base", Address::ZERO),
                NetworkEntry::new(NetworkId(84532), "base-sepolia", Address::ZERO),
            ]),
            public_rpc_template: DEFAULT_PUBLIC_RPC_TEMPLATE.to_string(),
            local_rpc_url: DEFAULT_LOCAL_RPC_URL.to_string(),
        }
    }
}

impl NetworkTable {
    pub fn empty() -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            ..Self::default()
        }
    }

    /// Returns a table with `entry` added, replacing any entry for the same network.
    pub fn with_entry(&self, entry: NetworkEntry) -> Self {
        let mut entries: Vec<NetworkEntry> = self
            .entries
            .iter()
            .filter(|existing| existing.network_id != entry.network_id)
            .cloned()
            .collect();
        entries.push(entry);
        Self {
            entries: Arc::new(entries),
            ..self.clone()
        }
    }

    /// `template` may contain `{network_id}`, substituted with the decimal network id.
    pub fn with_public_rpc_template(&self, template: impl Into<String>) -> Self {
        Self {
            public_rpc_template: template.into(),
            ..self.clone()
        }
    }

    pub fn with_local_rpc_url(&self, local_rpc_url: &Url) -> Self {
        Self {
            local_rpc_url: local_rpc_url.to_string(),
            ..self.clone()
        }
    }

    pub fn entry(&self, network_id: NetworkId) -> Option<&NetworkEntry> {
        self.entries
            .iter()
            .find(|entry| entry.network_id == network_id)
    }

    pub fn entries(&self) -> &[NetworkEntry] {
        &self.entries
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub network_id: NetworkId,
    pub rpc_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct NetworkResolver {
    table: NetworkTable,
}

impl NetworkResolver {
    pub fn new(table: NetworkTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &NetworkTable {
        &self.table
    }

    pub fn resolve_contract(&self, network_id: NetworkId) -> ContractAddress {
        self.table
            .entry(network_id)
            .map(|entry| entry.contract)
            .unwrap_or(ContractAddress::Unset)
    }

    pub fn resolve_transport(&self, network_id: NetworkId) -> TransportConfig {
        let rpc_url = match self.table.entry(network_id) {
            Some(NetworkEntry {
                rpc_url: Some(url), ..
            }) => url.to_string(),
            Some(entry) if entry.local => self.table.local_rpc_url.clone(),
            _ => public_rpc_url(&self.table.public_rpc_template, network_id),
        };
        TransportConfig {
            network_id,
            rpc_url,
        }
    }
}

fn public_rpc_url(template: &str, network_id: NetworkId) -> String {
    template.replace(NETWORK_ID_PLACEHOLDER, &network_id.to_string())
}

#[cfg(test)]
#[path = "tests/network_tests.rs"]
mod tests;
