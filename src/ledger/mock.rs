//! In-memory ledger store for tests.

use super::state::ApprovalLedger;
use super::traits::{LedgerStore, StoreError, StoreResult};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// In-memory store. Clones share the same underlying slot and writer lock.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    writer: Arc<AsyncMutex<()>>,
}

#[derive(Default)]
struct MemoryState {
    ledger: Option<ApprovalLedger>,
    fail_writes: bool,
    saves: usize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `ledger` (for test setup).
    pub fn with_ledger(ledger: ApprovalLedger) -> Self {
        let store = Self::new();
        store.slot().ledger = Some(ledger);
        store
    }

    /// Make subsequent saves fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.slot().fail_writes = fail;
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.slot().saves
    }

    /// Snapshot of the committed ledger.
    pub fn snapshot(&self) -> Option<ApprovalLedger> {
        self.slot().ledger.clone()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock only means another test thread panicked mid-call.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    type Lock = OwnedMutexGuard<()>;

    async fn lock(&self) -> StoreResult<Self::Lock> {
        Ok(Arc::clone(&self.writer).lock_owned().await)
    }

    async fn load(&self) -> StoreResult<Option<ApprovalLedger>> {
        Ok(self.slot().ledger.clone())
    }

    async fn save(&self, ledger: &ApprovalLedger) -> StoreResult<()> {
        let mut state = self.slot();
        if state.fail_writes {
            return Err(StoreError::WriteRejected(
                "memory store configured to fail writes".to_string(),
            ));
        }
        state.ledger = Some(ledger.clone());
        state.saves += 1;
        Ok(())
    }
}
