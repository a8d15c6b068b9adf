use std::{future::Future, time::Duration};

use shared::{domain::ChildRecord, Address};
use tracing::{debug, info, warn};

use crate::{
    error::ReadError,
    network::{NetworkResolver, TransportConfig},
    read_client::ReadClient,
    session::{resolve_owner, SessionHandle},
    store::StateStore,
};

/// A fully resolved query location.
pub(crate) struct ReadTarget {
    pub(crate) endpoint: TransportConfig,
    pub(crate) contract: Address,
    pub(crate) owner: Address,
}

/// Read-only registry queries scoped to an owner account. `fetch_list` is the
/// only operation that touches the cached child list.
#[derive(Clone)]
pub struct ContractReader {
    resolver: NetworkResolver,
    client: ReadClient,
    session: SessionHandle,
    store: StateStore,
    timeout: Duration,
}

impl ContractReader {
    pub fn new(
        resolver: NetworkResolver,
        client: ReadClient,
        session: SessionHandle,
        store: StateStore,
        timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            client,
            session,
            store,
            timeout,
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn target(&self, owner: Option<Address>) -> Result<ReadTarget, ReadError> {
        let session = self.session.snapshot().await;
        let network_id = session.network_id;
        let contract = self
            .resolver
            .resolve_contract(network_id)
            .deployed()
            .ok_or(ReadError::ContractUnset { network_id })?;
        let owner = resolve_owner(owner, session.account).ok_or(ReadError::OwnerUnavailable)?;

        Ok(ReadTarget {
            endpoint: self.resolver.resolve_transport(network_id),
            contract,
            owner,
        })
    }

    async fn bounded<T>(
        &self,
        query: impl Future<Output = Result<T, ReadError>>,
    ) -> Result<T, ReadError> {
        tokio::time::timeout(self.timeout, query)
            .await
            .map_err(|_| ReadError::Timeout(self.timeout))?
    }

    pub async fn fetch_list(&self, owner: Option<Address>) -> Result<Vec<ChildRecord>, ReadError> {
        let target = self.target(owner).await?;
        self.fetch_list_at(target).await
    }

    /// Refreshes the cache from an already resolved target without consulting
    /// the session again.
    pub(crate) async fn fetch_list_at(
        &self,
        target: ReadTarget,
    ) -> Result<Vec<ChildRecord>, ReadError> {
        let children = self
            .bounded(
                self.client
                    .children(&target.endpoint, target.contract, target.owner),
            )
            .await?;

        info!(
            "registry: children refreshed owner={} count={} network={}",
            target.owner,
            children.len(),
            target.endpoint.network_id
        );
        self.store.replace_children(target.owner, children.clone());
        Ok(children)
    }

    /// `Ok(None)` when the contract reports the zero address for `role`.
    pub async fn lookup_by_role(
        &self,
        role: &str,
        owner: Option<Address>,
    ) -> Result<Option<Address>, ReadError> {
        let target = self.target(owner).await?;
        let account = self
            .bounded(self.client.child_by_role(
                &target.endpoint,
                target.contract,
                target.owner,
                role,
            ))
            .await?;
        Ok((!account.is_zero()).then_some(account))
    }

    pub async fn count(&self, owner: Option<Address>) -> Result<u64, ReadError> {
        let target = self.target(owner).await?;
        let count = self
            .bounded(
                self.client
                    .child_count(&target.endpoint, target.contract, target.owner),
            )
            .await?;
        u64::try_from(count).map_err(|_| ReadError::Overflow(count))
    }

    pub async fn is_member(
        &self,
        candidate: Address,
        owner: Option<Address>,
    ) -> Result<bool, ReadError> {
        let target = self.target(owner).await?;
        self.bounded(self.client.is_child(
            &target.endpoint,
            target.contract,
            target.owner,
            candidate,
        ))
        .await
    }
}

/// Collapses a failed read into the neutral value a UI shows
/// (empty list, `None`, `0`, `false`), logging the failure.
pub trait Degrade<T> {
    fn or_degraded(self, operation: &str) -> T;
}

impl<T: Default> Degrade<T> for Result<T, ReadError> {
    fn or_degraded(self, operation: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) if err.is_precondition() => {
                debug!("registry: read skipped operation={} reason={}", operation, err);
                T::default()
            }
            Err(err) => {
                warn!("registry: read degraded operation={} error={}", operation, err);
                T::default()
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/reader_tests.rs"]
mod tests;
