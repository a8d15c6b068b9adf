use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use alloy_sol_types::SolCall;
use shared::{domain::TransactionHandle, Address};
use tracing::{info, warn};

use crate::{
    abi::IChildRegistry,
    error::WriteError,
    network::NetworkResolver,
    reader::{ContractReader, ReadTarget},
    session::SessionHandle,
    store::StateStore,
    transport::TransactionRequest,
};

/// Submits registry mutations through the session's wallet, then refreshes
/// the cached child list before handing back the transaction handle.
#[derive(Clone)]
pub struct ContractWriter {
    resolver: NetworkResolver,
    reader: ContractReader,
    session: SessionHandle,
    store: StateStore,
    in_flight: Arc<Mutex<HashSet<Address>>>,
    timeout: Duration,
}

impl ContractWriter {
    pub fn new(
        resolver: NetworkResolver,
        reader: ContractReader,
        session: SessionHandle,
        store: StateStore,
    ) -> Self {
        let timeout = reader.timeout();
        Self {
            resolver,
            reader,
            session,
            store,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            timeout,
        }
    }

    /// The deadline applies to submission and, separately, to the refresh read.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            reader: self.reader.with_timeout(timeout),
            timeout,
            ..self.clone()
        }
    }

    pub async fn add_child(
        &self,
        account: Address,
        role: &str,
    ) -> Result<TransactionHandle, WriteError> {
        let call = IChildRegistry::addChildCall {
            account,
            role: role.to_string(),
        };
        self.submit_and_refresh("add_child", call.abi_encode())
            .await
    }

    pub async fn remove_child(&self, account: Address) -> Result<TransactionHandle, WriteError> {
        let call = IChildRegistry::removeChildCall { account };
        self.submit_and_refresh("remove_child", call.abi_encode())
            .await
    }

    async fn submit_and_refresh(
        &self,
        operation: &'static str,
        data: Vec<u8>,
    ) -> Result<TransactionHandle, WriteError> {
        let session = self.session.snapshot().await;
        let network_id = session.network_id;
        let contract = self
            .resolver
            .resolve_contract(network_id)
            .deployed()
            .ok_or(WriteError::Configuration { network_id })?;
        let signer = session.signer.ok_or(WriteError::Connection)?;
        let account = session.account.ok_or(WriteError::Identity)?;

        let _slot = self.claim(account)?;
        let _pending = self.store.begin_write();

        let endpoint = self.resolver.resolve_transport(network_id);
        let request = TransactionRequest {
            network_id,
            from: account,
            to: contract,
            data: data.into(),
        };

        let handle = match tokio::time::timeout(self.timeout, signer.submit(&endpoint, request)).await
        {
            Ok(Ok(handle)) => handle,
            Ok(Err(err)) => {
                warn!(
                    "registry: submission failed operation={} owner={} network={} error={}",
                    operation, account, network_id, err
                );
                return Err(WriteError::Submission(err));
            }
            Err(_) => {
                warn!(
                    "registry: submission timed out operation={} owner={} network={} timeout={:?}",
                    operation, account, network_id, self.timeout
                );
                return Err(WriteError::Timeout(self.timeout));
            }
        };
        info!(
            "registry: submitted operation={} owner={} network={} tx={}",
            operation, account, network_id, handle
        );

        // Refresh against the network the transaction went to, even if the
        // session has switched since.
        let target = ReadTarget {
            endpoint,
            contract,
            owner: account,
        };
        if let Err(err) = self.reader.fetch_list_at(target).await {
            warn!(
                "registry: refresh after write failed operation={} owner={} error={}",
                operation, account, err
            );
        }

        Ok(handle)
    }

    fn claim(&self, owner: Address) -> Result<InFlightSlot, WriteError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(owner) {
            return Err(WriteError::InFlight { owner });
        }
        Ok(InFlightSlot {
            owner,
            in_flight: Arc::clone(&self.in_flight),
        })
    }
}

struct InFlightSlot {
    owner: Address,
    in_flight: Arc<Mutex<HashSet<Address>>>,
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.owner);
    }
}

#[cfg(test)]
#[path = "tests/writer_tests.rs"]
mod tests;
