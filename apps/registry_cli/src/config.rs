use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use registry_core::{
    network::{DEFAULT_PUBLIC_RPC_TEMPLATE, LOCAL_NETWORK_ID},
    NetworkEntry, NetworkTable,
};
use serde::Deserialize;
use shared::{domain::NetworkId, Address};
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "registry.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub network_id: u64,
    pub account: Option<Address>,
    pub call_timeout_ms: u64,
    pub public_rpc_template: String,
    pub local_rpc_url: Option<Url>,
    pub networks: Vec<NetworkOverride>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkOverride {
    pub network_id: u64,
    pub name: Option<String>,
    pub contract: Option<Address>,
    pub rpc_url: Option<Url>,
    #[serde(default)]
    pub local: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network_id: LOCAL_NETWORK_ID.0,
            account: None,
            call_timeout_ms: 15_000,
            public_rpc_template: DEFAULT_PUBLIC_RPC_TEMPLATE.into(),
            local_rpc_url: None,
            networks: Vec::new(),
        }
    }
}

impl Settings {
    pub fn network_id(&self) -> NetworkId {
        NetworkId(self.network_id)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Built-in table with this file's overrides applied on top.
    pub fn network_table(&self) -> NetworkTable {
        let mut table = NetworkTable::default().with_public_rpc_template(&self.public_rpc_template);
        if let Some(url) = &self.local_rpc_url {
            table = table.with_local_rpc_url(url);
        }

        for network in &self.networks {
            let network_id = NetworkId(network.network_id);
            let existing = table.entry(network_id).cloned();

            let name = network
                .name
                .clone()
                .or_else(|| existing.as_ref().map(|entry| entry.name.clone()))
                .unwrap_or_else(|| format!("network-{network_id}"));
            let contract = network
                .contract
                .or_else(|| existing.as_ref().and_then(|entry| entry.contract.deployed()))
                .unwrap_or(Address::ZERO);

            let mut entry = NetworkEntry::new(network_id, name, contract);
            entry.local = network.local || existing.as_ref().is_some_and(|entry| entry.local);
            entry.rpc_url = network
                .rpc_url
                .clone()
                .or_else(|| existing.and_then(|entry| entry.rpc_url));
            table = table.with_entry(entry);
        }

        table
    }
}

/// Defaults, then the TOML file, then environment variables.
///
/// An explicitly named file must exist; the default `registry.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            read_settings_file(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => Settings::default(),
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

pub fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(raw)?)
}

pub fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    for key in ["REGISTRY_NETWORK_ID", "APP__NETWORK_ID"] {
        if let Some(parsed) = var(key).and_then(|v| v.parse::<u64>().ok()) {
            settings.network_id = parsed;
        }
    }

    for key in ["REGISTRY_ACCOUNT", "APP__ACCOUNT"] {
        if let Some(parsed) = var(key).and_then(|v| v.parse::<Address>().ok()) {
            settings.account = Some(parsed);
        }
    }

    for key in ["REGISTRY_CALL_TIMEOUT_MS", "APP__CALL_TIMEOUT_MS"] {
        if let Some(parsed) = var(key).and_then(|v| v.parse::<u64>().ok()) {
            settings.call_timeout_ms = parsed;
        }
    }

    for key in ["REGISTRY_PUBLIC_RPC_TEMPLATE", "APP__PUBLIC_RPC_TEMPLATE"] {
        if let Some(v) = var(key) {
            settings.public_rpc_template = v;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
