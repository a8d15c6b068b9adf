use std::{collections::HashMap, sync::Arc, time::Duration};

use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use shared::{
    domain::{ChildRecord, NetworkId, TransactionHandle},
    Address, Bytes, B256, U256,
};
use tokio::sync::Mutex;

use crate::{
    abi::IChildRegistry,
    error::TransportError,
    network::{NetworkEntry, NetworkTable, TransportConfig, LOCAL_NETWORK_ID},
    store::StateStore,
    transport::{CallRequest, ReadTransport, SigningTransport, TransactionRequest},
};

pub(crate) fn contract() -> Address {
    Address::repeat_byte(0xc0)
}

pub(crate) fn user() -> Address {
    Address::repeat_byte(0x55)
}

pub(crate) fn child() -> Address {
    Address::repeat_byte(0xaa)
}

pub(crate) fn tx_hash() -> TransactionHandle {
    TransactionHandle(B256::repeat_byte(0x71))
}

pub(crate) fn local_table() -> NetworkTable {
    NetworkTable::default().with_entry(NetworkEntry::new(LOCAL_NETWORK_ID, "local", contract()).local())
}

pub(crate) fn unknown_network() -> NetworkId {
    NetworkId(999_999)
}

/// In-memory registry contract that both stub transports operate on.
#[derive(Default)]
pub(crate) struct StubChain {
    pub children: Mutex<HashMap<Address, Vec<ChildRecord>>>,
    pub count_override: Mutex<Option<U256>>,
    pub read_failure: Mutex<Option<TransportError>>,
    pub read_delay: Mutex<Option<Duration>>,
    pub reads: Mutex<Vec<(TransportConfig, CallRequest)>>,
}

impl StubChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn seed(&self, owner: Address, children: Vec<ChildRecord>) {
        self.children.lock().await.insert(owner, children);
    }

    pub async fn fail_reads(&self, err: TransportError) {
        *self.read_failure.lock().await = Some(err);
    }

    pub async fn delay_reads(&self, delay: Duration) {
        *self.read_delay.lock().await = Some(delay);
    }

    pub async fn read_count(&self) -> usize {
        self.reads.lock().await.len()
    }

    pub async fn reads_with_selector(&self, selector: [u8; 4]) -> usize {
        self.reads
            .lock()
            .await
            .iter()
            .filter(|(_, call)| call.data.starts_with(&selector))
            .count()
    }

    async fn answer(&self, data: &[u8]) -> Result<Bytes, TransportError> {
        let children = self.children.lock().await;
        let encoded = if let Ok(call) = IChildRegistry::getChildrenCall::abi_decode(data) {
            children
                .get(&call.owner)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(IChildRegistry::Child::from)
                .collect::<Vec<_>>()
                .abi_encode()
        } else if let Ok(call) = IChildRegistry::getChildByRoleCall::abi_decode(data) {
            children
                .get(&call.owner)
                .and_then(|list| list.iter().find(|record| record.role == call.role))
                .map(|record| record.account)
                .unwrap_or(Address::ZERO)
                .abi_encode()
        } else if let Ok(call) = IChildRegistry::getChildCountCall::abi_decode(data) {
            let count = match *self.count_override.lock().await {
                Some(count) => count,
                None => U256::from(children.get(&call.owner).map_or(0, Vec::len)),
            };
            count.abi_encode()
        } else if let Ok(call) = IChildRegistry::isChildCall::abi_decode(data) {
            children
                .get(&call.owner)
                .is_some_and(|list| list.iter().any(|record| record.account == call.candidate))
                .abi_encode()
        } else {
            return Err(TransportError::Decode("unknown selector".to_string()));
        };
        Ok(encoded.into())
    }

    async fn apply(&self, from: Address, data: &[u8]) -> Result<(), TransportError> {
        let mut children = self.children.lock().await;
        let list = children.entry(from).or_default();
        if let Ok(call) = IChildRegistry::addChildCall::abi_decode(data) {
            list.push(ChildRecord::new(call.account, call.role));
        } else if let Ok(call) = IChildRegistry::removeChildCall::abi_decode(data) {
            list.retain(|record| record.account != call.account);
        } else {
            return Err(TransportError::Decode("unknown selector".to_string()));
        }
        Ok(())
    }
}

pub(crate) struct StubReadTransport {
    pub chain: Arc<StubChain>,
}

#[async_trait]
impl ReadTransport for StubReadTransport {
    async fn call(
        &self,
        endpoint: &TransportConfig,
        request: CallRequest,
    ) -> Result<Bytes, TransportError> {
        self.chain
            .reads
            .lock()
            .await
            .push((endpoint.clone(), request.clone()));

        let delay = *self.chain.read_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.chain.read_failure.lock().await.clone() {
            return Err(err);
        }
        self.chain.answer(&request.data).await
    }
}

pub(crate) struct StubSigner {
    pub chain: Arc<StubChain>,
    pub handle: TransactionHandle,
    pub failure: Option<TransportError>,
    pub delay: Option<Duration>,
    pub submissions: Mutex<Vec<(TransportConfig, TransactionRequest)>>,
    pub observed_store: Mutex<Option<StateStore>>,
    pub pending_during_submit: Mutex<Vec<bool>>,
}

impl StubSigner {
    pub fn ok(chain: Arc<StubChain>) -> Arc<Self> {
        Arc::new(Self {
            chain,
            handle: tx_hash(),
            failure: None,
            delay: None,
            submissions: Mutex::new(Vec::new()),
            observed_store: Mutex::new(None),
            pending_during_submit: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(chain: Arc<StubChain>, err: TransportError) -> Arc<Self> {
        Arc::new(Self {
            chain,
            handle: tx_hash(),
            failure: Some(err),
            delay: None,
            submissions: Mutex::new(Vec::new()),
            observed_store: Mutex::new(None),
            pending_during_submit: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(chain: Arc<StubChain>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            chain,
            handle: tx_hash(),
            failure: None,
            delay: Some(delay),
            submissions: Mutex::new(Vec::new()),
            observed_store: Mutex::new(None),
            pending_during_submit: Mutex::new(Vec::new()),
        })
    }

    pub async fn observe(&self, store: StateStore) {
        *self.observed_store.lock().await = Some(store);
    }

    pub async fn submission_count(&self) -> usize {
        self.submissions.lock().await.len()
    }
}

#[async_trait]
impl SigningTransport for StubSigner {
    async fn submit(
        &self,
        endpoint: &TransportConfig,
        request: TransactionRequest,
    ) -> Result<TransactionHandle, TransportError> {
        self.submissions
            .lock()
            .await
            .push((endpoint.clone(), request.clone()));
        if let Some(store) = self.observed_store.lock().await.as_ref() {
            self.pending_during_submit.lock().await.push(store.pending());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.chain.apply(request.from, &request.data).await?;
        Ok(self.handle)
    }
}
