use std::sync::Arc;

use shared::{domain::NetworkId, Address};
use tokio::sync::RwLock;

use crate::transport::SigningTransport;

/// Wallet/session state supplied by whoever manages the connection.
#[derive(Clone)]
pub struct Session {
    pub network_id: NetworkId,
    pub account: Option<Address>,
    pub signer: Option<Arc<dyn SigningTransport>>,
}

impl Session {
    pub fn new(network_id: NetworkId) -> Self {
        Self {
            network_id,
            account: None,
            signer: None,
        }
    }

    pub fn with_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }

    pub fn with_signer(mut self, signer: Arc<dyn SigningTransport>) -> Self {
        self.signer = Some(signer);
        self
    }
}

#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    pub async fn connect(&self, account: Address, signer: Arc<dyn SigningTransport>) {
        let mut session = self.inner.write().await;
        session.account = Some(account);
        session.signer = Some(signer);
    }

    pub async fn disconnect(&self) {
        let mut session = self.inner.write().await;
        session.account = None;
        session.signer = None;
    }

    pub async fn switch_network(&self, network_id: NetworkId) {
        self.inner.write().await.network_id = network_id;
    }
}

/// An explicitly requested owner wins over the session account.
pub fn resolve_owner(
    explicit: Option<Address>,
    session_account: Option<Address>,
) -> Option<Address> {
    explicit.or(session_account)
}
