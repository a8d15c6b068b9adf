use std::{sync::Arc, time::Duration};

use shared::{
    domain::{ChildRecord, ContractAddress, NetworkId, TransactionHandle},
    Address,
};
use tokio::sync::watch;

pub mod abi;
pub mod error;
pub mod network;
pub mod read_client;
pub mod reader;
pub mod session;
pub mod store;
pub mod transport;
pub mod writer;

pub use error::{ReadError, TransportError, WriteError};
pub use network::{NetworkEntry, NetworkResolver, NetworkTable, TransportConfig};
pub use read_client::ReadClient;
pub use reader::{ContractReader, Degrade};
pub use session::{resolve_owner, Session, SessionHandle};
pub use store::{StateStore, StoreSnapshot};
pub use transport::{JsonRpcTransport, ReadTransport, SigningTransport};
pub use writer::ContractWriter;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNetwork {
    pub network_id: NetworkId,
    pub contract: ContractAddress,
    pub transport: TransportConfig,
}

/// Wires the resolver, reader, writer and store around one session.
///
/// The plain query methods (`children`, `child_by_role`, ...) never fail:
/// they fall back to neutral values and log why. Use [`Self::reader`] when the
/// failure itself matters.
#[derive(Clone)]
pub struct RegistryController {
    session: SessionHandle,
    resolver: NetworkResolver,
    store: StateStore,
    reader: ContractReader,
    writer: ContractWriter,
}

impl RegistryController {
    pub fn new(
        table: NetworkTable,
        session: Session,
        read_transport: Arc<dyn ReadTransport>,
    ) -> Self {
        Self::new_with_timeout(table, session, read_transport, DEFAULT_CALL_TIMEOUT)
    }

    pub fn new_with_timeout(
        table: NetworkTable,
        session: Session,
        read_transport: Arc<dyn ReadTransport>,
        timeout: Duration,
    ) -> Self {
        let resolver = NetworkResolver::new(table);
        let session = SessionHandle::new(session);
        let store = StateStore::new();
        let reader = ContractReader::new(
            resolver.clone(),
            ReadClient::new(read_transport),
            session.clone(),
            store.clone(),
            timeout,
        );
        let writer = ContractWriter::new(
            resolver.clone(),
            reader.clone(),
            session.clone(),
            store.clone(),
        );

        Self {
            session,
            resolver,
            store,
            reader,
            writer,
        }
    }

    /// Shares session, store and single-flight state with `self`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            reader: self.reader.with_timeout(timeout),
            writer: self.writer.with_timeout(timeout),
            ..self.clone()
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn resolver(&self) -> &NetworkResolver {
        &self.resolver
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn reader(&self) -> &ContractReader {
        &self.reader
    }

    pub fn writer(&self) -> &ContractWriter {
        &self.writer
    }

    pub async fn active_network(&self) -> ActiveNetwork {
        let network_id = self.session.snapshot().await.network_id;
        ActiveNetwork {
            network_id,
            contract: self.resolver.resolve_contract(network_id),
            transport: self.resolver.resolve_transport(network_id),
        }
    }

    pub async fn children(&self, owner: Option<Address>) -> Vec<ChildRecord> {
        self.reader.fetch_list(owner).await.or_degraded("fetch_list")
    }

    pub async fn child_by_role(&self, role: &str, owner: Option<Address>) -> Option<Address> {
        self.reader
            .lookup_by_role(role, owner)
            .await
            .or_degraded("lookup_by_role")
    }

    pub async fn child_count(&self, owner: Option<Address>) -> u64 {
        self.reader.count(owner).await.or_degraded("count")
    }

    pub async fn is_child(&self, candidate: Address, owner: Option<Address>) -> bool {
        self.reader
            .is_member(candidate, owner)
            .await
            .or_degraded("is_member")
    }

    pub async fn add_child(
        &self,
        account: Address,
        role: &str,
    ) -> Result<TransactionHandle, WriteError> {
        self.writer.add_child(account, role).await
    }

    pub async fn remove_child(&self, account: Address) -> Result<TransactionHandle, WriteError> {
        self.writer.remove_child(account).await
    }

    pub fn pending(&self) -> bool {
        self.store.pending()
    }

    pub fn cached_children(&self) -> Vec<ChildRecord> {
        self.store.children()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.store.subscribe()
    }
}

#[cfg(test)]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
