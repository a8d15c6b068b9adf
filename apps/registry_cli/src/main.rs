use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use registry_core::{Degrade, JsonRpcTransport, ReadError, RegistryController, Session};
use shared::Address;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "registry", about = "Query and update a child registry contract")]
struct Cli {
    /// Config file; defaults to ./registry.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    network: Option<u64>,
    /// Authenticated account; reads default to it as owner, writes are sent from it.
    #[arg(long, global = true)]
    account: Option<Address>,
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    /// Fail instead of printing neutral values when a read fails.
    #[arg(long, global = true)]
    strict: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the network table.
    Networks,
    List {
        #[arg(long)]
        owner: Option<Address>,
    },
    Lookup {
        role: String,
        #[arg(long)]
        owner: Option<Address>,
    },
    Count {
        #[arg(long)]
        owner: Option<Address>,
    },
    IsMember {
        candidate: Address,
        #[arg(long)]
        owner: Option<Address>,
    },
    Add {
        account: Address,
        role: String,
    },
    Remove {
        account: Address,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(network) = cli.network {
        settings.network_id = network;
    }
    if let Some(account) = cli.account {
        settings.account = Some(account);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        settings.call_timeout_ms = timeout_ms;
    }

    let table = settings.network_table();
    let transport = Arc::new(JsonRpcTransport::default());
    let mut session = Session::new(settings.network_id());
    if let Some(account) = settings.account {
        session = session.with_account(account).with_signer(transport.clone());
    }
    let registry = RegistryController::new_with_timeout(
        table,
        session,
        transport,
        settings.call_timeout(),
    );

    let active = registry.active_network().await;
    info!(
        "registry: network={} contract={:?} rpc={}",
        active.network_id, active.contract, active.transport.rpc_url
    );

    match cli.command {
        Command::Networks => {
            for entry in registry.resolver().table().entries() {
                let marker = if entry.network_id == active.network_id {
                    "*"
                } else {
                    " "
                };
                let contract = entry
                    .contract
                    .deployed()
                    .map(|address| address.to_string())
                    .unwrap_or_else(|| "unset".to_string());
                println!(
                    "{marker} {:>10} {:<14} {} {}",
                    entry.network_id,
                    entry.name,
                    contract,
                    registry.resolver().resolve_transport(entry.network_id).rpc_url
                );
            }
        }
        Command::List { owner } => {
            let children = read(cli.strict, "list", registry.reader().fetch_list(owner).await)?;
            println!("{}", serde_json::to_string_pretty(&children)?);
        }
        Command::Lookup { role, owner } => {
            let account = read(
                cli.strict,
                "lookup",
                registry.reader().lookup_by_role(&role, owner).await,
            )?;
            match account {
                Some(account) => println!("{account}"),
                None => println!("none"),
            }
        }
        Command::Count { owner } => {
            let count = read(cli.strict, "count", registry.reader().count(owner).await)?;
            println!("{count}");
        }
        Command::IsMember { candidate, owner } => {
            let member = read(
                cli.strict,
                "is-member",
                registry.reader().is_member(candidate, owner).await,
            )?;
            println!("{member}");
        }
        Command::Add { account, role } => {
            let handle = registry
                .add_child(account, &role)
                .await
                .with_context(|| format!("failed to add child {account}"))?;
            println!("{handle}");
            print_children(&registry)?;
        }
        Command::Remove { account } => {
            let handle = registry
                .remove_child(account)
                .await
                .with_context(|| format!("failed to remove child {account}"))?;
            println!("{handle}");
            print_children(&registry)?;
        }
    }

    Ok(())
}

fn read<T: Default>(strict: bool, operation: &str, result: Result<T, ReadError>) -> Result<T> {
    if strict {
        return result.with_context(|| format!("{operation} failed"));
    }
    Ok(result.or_degraded(operation))
}

fn print_children(registry: &RegistryController) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&registry.cached_children())?
    );
    Ok(())
}
