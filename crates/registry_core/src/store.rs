use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{domain::ChildRecord, Address};
use tokio::sync::watch;

/// What the UI layer observes: the pending flag and the cached child list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub pending: bool,
    pub in_flight_writes: usize,
    /// Owner the cached list belongs to. Single slot: a fetch for another owner overwrites it.
    pub owner: Option<Address>,
    pub children: Vec<ChildRecord>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct StateStore {
    tx: Arc<watch::Sender<StoreSnapshot>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(StoreSnapshot::default())),
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.tx.borrow().clone()
    }

    pub fn pending(&self) -> bool {
        self.tx.borrow().pending
    }

    pub fn children(&self) -> Vec<ChildRecord> {
        self.tx.borrow().children.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.tx.subscribe()
    }

    pub(crate) fn replace_children(&self, owner: Address, children: Vec<ChildRecord>) {
        self.tx.send_modify(|state| {
            state.owner = Some(owner);
            state.children = children;
            state.refreshed_at = Some(Utc::now());
        });
    }

    pub(crate) fn begin_write(&self) -> PendingGuard {
        self.tx.send_modify(|state| {
            state.in_flight_writes += 1;
            state.pending = true;
        });
        PendingGuard {
            store: self.clone(),
        }
    }

    fn end_write(&self) {
        self.tx.send_modify(|state| {
            state.in_flight_writes = state.in_flight_writes.saturating_sub(1);
            state.pending = state.in_flight_writes > 0;
        });
    }
}

/// Holds `pending` up until dropped, on every exit path.
pub(crate) struct PendingGuard {
    store: StateStore,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.store.end_write();
    }
}
