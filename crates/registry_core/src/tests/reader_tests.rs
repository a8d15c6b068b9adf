use super::*;

use std::sync::Arc;

use alloy_sol_types::SolCall;
use shared::{
    domain::NetworkId,
    error::{RpcErrorObject, RPC_EXECUTION_REVERTED},
    U256,
};

use crate::{
    abi::IChildRegistry,
    error::TransportError,
    network::{NetworkTable, LOCAL_NETWORK_ID},
    session::Session,
    test_support::*,
};

fn reader_for(
    table: NetworkTable,
    session: Session,
    chain: Arc<StubChain>,
) -> (ContractReader, StateStore) {
    let store = StateStore::new();
    let reader = ContractReader::new(
        NetworkResolver::new(table),
        ReadClient::new(Arc::new(StubReadTransport { chain })),
        SessionHandle::new(session),
        store.clone(),
        Duration::from_secs(2),
    );
    (reader, store)
}

fn local_session() -> Session {
    Session::new(LOCAL_NETWORK_ID).with_account(user())
}

#[tokio::test]
async fn fetch_list_replaces_cache_for_owner() {
    let chain = StubChain::new();
    chain
        .seed(user(), vec![ChildRecord::new(child(), "admin")])
        .await;
    let (reader, store) = reader_for(local_table(), local_session(), chain.clone());

    let children = reader.fetch_list(None).await.expect("fetch");

    assert_eq!(children, vec![ChildRecord::new(child(), "admin")]);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.children, children);
    assert_eq!(snapshot.owner, Some(user()));
    assert_eq!(chain.read_count().await, 1);
}

#[tokio::test]
async fn fetch_list_for_other_owner_overwrites_single_slot_cache() {
    let chain = StubChain::new();
    let other = Address::repeat_byte(0x66);
    chain
        .seed(user(), vec![ChildRecord::new(child(), "admin")])
        .await;
    chain
        .seed(other, vec![ChildRecord::new(Address::repeat_byte(0xbb), "viewer")])
        .await;
    let (reader, store) = reader_for(local_table(), local_session(), chain);

    reader.fetch_list(None).await.expect("own list");
    reader.fetch_list(Some(other)).await.expect("other list");

    let snapshot = store.snapshot();
    assert_eq!(snapshot.owner, Some(other));
    assert_eq!(snapshot.children[0].role, "viewer");
}

#[tokio::test]
async fn unset_contract_short_circuits_without_network() {
    let chain = StubChain::new();
    let (reader, store) = reader_for(
        local_table(),
        Session::new(unknown_network()).with_account(user()),
        chain.clone(),
    );

    let err = reader.fetch_list(None).await.expect_err("must fail");
    assert!(matches!(err, ReadError::ContractUnset { network_id } if network_id == unknown_network()));
    assert!(reader.lookup_by_role("admin", None).await.is_err());
    assert!(reader.count(None).await.is_err());
    assert!(reader.is_member(child(), None).await.is_err());

    assert_eq!(chain.read_count().await, 0);
    assert_eq!(store.snapshot().refreshed_at, None);
}

#[tokio::test]
async fn missing_owner_short_circuits_without_network() {
    let chain = StubChain::new();
    let (reader, _) = reader_for(local_table(), Session::new(LOCAL_NETWORK_ID), chain.clone());

    let err = reader.count(None).await.expect_err("must fail");
    assert!(matches!(err, ReadError::OwnerUnavailable));
    assert!(err.is_precondition());
    assert_eq!(chain.read_count().await, 0);

    // An explicit owner is enough without a session account.
    chain.seed(user(), Vec::new()).await;
    assert_eq!(reader.count(Some(user())).await.expect("count"), 0);
}

#[tokio::test]
async fn lookup_by_role_maps_zero_address_to_none() {
    let chain = StubChain::new();
    chain
        .seed(user(), vec![ChildRecord::new(child(), "admin")])
        .await;
    let (reader, _) = reader_for(local_table(), local_session(), chain);

    assert_eq!(
        reader.lookup_by_role("admin", None).await.expect("lookup"),
        Some(child())
    );
    assert_eq!(reader.lookup_by_role("auditor", None).await.expect("lookup"), None);
}

#[tokio::test]
async fn count_and_membership_reflect_contract_state() {
    let chain = StubChain::new();
    chain
        .seed(
            user(),
            vec![
                ChildRecord::new(child(), "admin"),
                ChildRecord::new(Address::repeat_byte(0xbb), "viewer"),
            ],
        )
        .await;
    let (reader, _) = reader_for(local_table(), local_session(), chain.clone());

    assert_eq!(reader.count(None).await.expect("count"), 2);
    assert!(reader.is_member(child(), None).await.expect("member"));
    assert!(!reader
        .is_member(Address::repeat_byte(0xcc), None)
        .await
        .expect("member"));
    assert_eq!(
        chain
            .reads_with_selector(IChildRegistry::isChildCall::SELECTOR)
            .await,
        2
    );
}

#[tokio::test]
async fn count_beyond_u64_is_an_overflow_not_a_truncation() {
    let chain = StubChain::new();
    let huge = U256::from(u64::MAX) + U256::from(1u8);
    *chain.count_override.lock().await = Some(huge);
    let (reader, _) = reader_for(local_table(), local_session(), chain);

    let err = reader.count(None).await.expect_err("must overflow");
    assert!(matches!(err, ReadError::Overflow(value) if value == huge));
    assert_eq!(Err::<u64, _>(err).or_degraded("count"), 0);
}

#[tokio::test]
async fn transport_failure_keeps_previous_cache_and_degrades() {
    let chain = StubChain::new();
    chain
        .seed(user(), vec![ChildRecord::new(child(), "admin")])
        .await;
    let (reader, store) = reader_for(local_table(), local_session(), chain.clone());
    reader.fetch_list(None).await.expect("initial fetch");

    chain
        .fail_reads(TransportError::Rpc(RpcErrorObject::new(
            RPC_EXECUTION_REVERTED,
            "execution reverted",
        )))
        .await;
    let result = reader.fetch_list(None).await;
    assert!(matches!(result, Err(ReadError::Transport(TransportError::Rpc(_)))));
    assert_eq!(store.children(), vec![ChildRecord::new(child(), "admin")]);

    assert!(reader.fetch_list(None).await.or_degraded("fetch_list").is_empty());
    assert!(!reader.is_member(child(), None).await.or_degraded("is_member"));
    assert_eq!(reader.lookup_by_role("admin", None).await.or_degraded("lookup"), None);
}

#[tokio::test]
async fn slow_read_times_out_with_distinct_error() {
    let chain = StubChain::new();
    chain.delay_reads(Duration::from_millis(200)).await;
    let (reader, _) = reader_for(local_table(), local_session(), chain);

    let err = reader
        .with_timeout(Duration::from_millis(20))
        .count(None)
        .await
        .expect_err("must time out");
    assert!(matches!(err, ReadError::Timeout(timeout) if timeout == Duration::from_millis(20)));
}

#[tokio::test]
async fn queries_target_resolved_endpoint_and_contract() {
    let chain = StubChain::new();
    let (reader, _) = reader_for(local_table(), local_session(), chain.clone());

    reader.is_member(child(), None).await.expect("member");

    let reads = chain.reads.lock().await;
    let (endpoint, call) = &reads[0];
    assert_eq!(endpoint.network_id, NetworkId(31337));
    assert_eq!(endpoint.rpc_url, crate::network::DEFAULT_LOCAL_RPC_URL);
    assert_eq!(call.to, contract());
}

#[test]
fn only_configuration_gaps_count_as_quiet_skips() {
    assert!(ReadError::ContractUnset {
        network_id: unknown_network()
    }
    .is_precondition());
    assert!(ReadError::OwnerUnavailable.is_precondition());
    assert!(!ReadError::Timeout(Duration::from_secs(1)).is_precondition());
    assert!(!ReadError::Decode("bad".into()).is_precondition());
    assert!(!ReadError::Transport(TransportError::BadStatus(503)).is_precondition());

    assert_eq!(Err::<u64, _>(ReadError::OwnerUnavailable).or_degraded("count"), 0);
}
