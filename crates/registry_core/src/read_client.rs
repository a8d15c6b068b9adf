use std::sync::Arc;

use alloy_sol_types::{SolCall, SolValue};
use shared::{domain::ChildRecord, Address, U256};

use crate::{
    abi::IChildRegistry,
    error::ReadError,
    network::TransportConfig,
    transport::{CallRequest, ReadTransport},
};

/// Encodes registry queries, runs them through a [`ReadTransport`] and
/// decodes the results. Holds no state of its own.
#[derive(Clone)]
pub struct ReadClient {
    transport: Arc<dyn ReadTransport>,
}

impl ReadClient {
    pub fn new(transport: Arc<dyn ReadTransport>) -> Self {
        Self { transport }
    }

    async fn query<C, T>(
        &self,
        endpoint: &TransportConfig,
        contract: Address,
        call: C,
    ) -> Result<T, ReadError>
    where
        C: SolCall,
        T: SolValue + From<<T::SolType as alloy_sol_types::SolType>::RustType>,
    {
        let output = self
            .transport
            .call(
                endpoint,
                CallRequest {
                    to: contract,
                    data: call.abi_encode().into(),
                },
            )
            .await?;
        T::abi_decode(&output).map_err(|err| ReadError::Decode(err.to_string()))
    }

    pub async fn children(
        &self,
        endpoint: &TransportConfig,
        contract: Address,
        owner: Address,
    ) -> Result<Vec<ChildRecord>, ReadError> {
        let children: Vec<IChildRegistry::Child> = self
            .query(
                endpoint,
                contract,
                IChildRegistry::getChildrenCall { owner },
            )
            .await?;
        Ok(children.into_iter().map(ChildRecord::from).collect())
    }

    pub async fn child_by_role(
        &self,
        endpoint: &TransportConfig,
        contract: Address,
        owner: Address,
        role: &str,
    ) -> Result<Address, ReadError> {
        self.query(
            endpoint,
            contract,
            IChildRegistry::getChildByRoleCall {
                owner,
                role: role.to_string(),
            },
        )
        .await
    }

    pub async fn child_count(
        &self,
        endpoint: &TransportConfig,
        contract: Address,
        owner: Address,
    ) -> Result<U256, ReadError> {
        self.query(
            endpoint,
            contract,
            IChildRegistry::getChildCountCall { owner },
        )
        .await
    }

    pub async fn is_child(
        &self,
        endpoint: &TransportConfig,
        contract: Address,
        owner: Address,
        candidate: Address,
    ) -> Result<bool, ReadError> {
        self.query(
            endpoint,
            contract,
            IChildRegistry::isChildCall { owner, candidate },
        )
        .await
    }
}
