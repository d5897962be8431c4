//! Release gate: the single writer in front of the approval ledger.
//!
//! Every operation takes the same async mutex, so mutations are applied one
//! at a time in a total order and readers only ever see committed state.
//!
//! Mutations additionally hold the store's writer lock and start from the
//! ledger as last committed to the store, not from this gate's copy. Gates
//! in other tasks or processes sharing the store therefore never overwrite
//! each other's commits; changes they made are picked up (and published to
//! this gate's subscribers) before the new mutation is applied.
//!
//! A mutation runs against a working copy of the ledger. The copy is
//! persisted through the [`LedgerStore`] and only then swapped in and its
//! events published. If validation or the store write fails, the committed
//! ledger, the stored ledger and the subscribers are all left untouched.

use crate::identity::Identity;
use crate::ledger::error::ApprovalError;
use crate::ledger::event_stream::{EventPublisher, EventStream};
use crate::ledger::events::{EventQuery, EventRecord, LedgerEvent};
use crate::ledger::release::{ContentHash, ReleaseInfo};
use crate::ledger::state::ApprovalLedger;
use crate::ledger::traits::{LedgerStore, StoreError};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;

/// Gate errors.
#[derive(Debug, Error)]
pub enum GateError {
    /// The operation's preconditions were not met.
    #[error(transparent)]
    Approval(#[from] ApprovalError),

    /// The ledger could not be loaded or committed.
    #[error("ledger store failure: {0}")]
    Store(#[from] StoreError),

    /// `create` was called on a store that already holds a ledger.
    #[error("ledger already initialized")]
    AlreadyInitialized,

    /// `open` was called on an empty store.
    #[error("ledger not initialized (run `aiakos init` first)")]
    NotInitialized,
}

#[derive(Debug)]
struct GateState {
    ledger: ApprovalLedger,
    subscribers: Vec<EventPublisher>,
}

impl GateState {
    /// Send committed records from `sequence` on; prune closed subscribers.
    fn publish_from(&mut self, sequence: u64) {
        let records = &self.ledger.events()[sequence as usize..];
        self.subscribers
            .retain(|subscriber| records.iter().all(|r| subscriber.publish(r.clone())));
    }
}

/// Serialized owner of an [`ApprovalLedger`].
#[derive(Debug)]
pub struct ReleaseGate<S: LedgerStore> {
    store: S,
    state: Mutex<GateState>,
}

impl<S: LedgerStore> ReleaseGate<S> {
    /// Constructs a fresh ledger owned by `owner` and commits it.
    pub async fn create(store: S, owner: Identity, required_approvals: u32) -> GateResult<Self> {
        let ledger = ApprovalLedger::new(owner, required_approvals)?;

        let lock = store.lock().await?;
        if store.load().await?.is_some() {
            return Err(GateError::AlreadyInitialized);
        }
        store.save(&ledger).await?;
        drop(lock);

        info!(
            owner = %owner,
            required_approvals,
            "release gate initialized"
        );

        Ok(Self::with_ledger(store, ledger))
    }

    /// Opens the ledger previously committed to `store`.
    pub async fn open(store: S) -> GateResult<Self> {
        let ledger = store.load().await?.ok_or(GateError::NotInitialized)?;
        debug!(
            owner = %ledger.owner(),
            maintainers = ledger.registry().len(),
            releases = ledger.release_count(),
            "release gate opened"
        );
        Ok(Self::with_ledger(store, ledger))
    }

    fn with_ledger(store: S, ledger: ApprovalLedger) -> Self {
        Self {
            store,
            state: Mutex::new(GateState {
                ledger,
                subscribers: Vec::new(),
            }),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Owner-gated: registers a maintainer.
    pub async fn add_maintainer(
        &self,
        caller: &Identity,
        identity: Identity,
    ) -> GateResult<Vec<LedgerEvent>> {
        let result = self
            .mutate(|ledger| ledger.add_maintainer(caller, identity))
            .await;

        match &result {
            Ok(events) if events.is_empty() => {
                debug!(maintainer = %identity, "maintainer already registered")
            }
            Ok(_) => info!(maintainer = %identity, "maintainer added"),
            Err(e) => warn!(caller = %caller, maintainer = %identity, error = %e, "add maintainer rejected"),
        }
        result
    }

    /// Maintainer-gated: records an approval of `(version, hash)`.
    pub async fn deploy_release(
        &self,
        caller: &Identity,
        version: &str,
        hash: ContentHash,
    ) -> GateResult<Vec<LedgerEvent>> {
        let result = self
            .mutate(|ledger| ledger.deploy_release(caller, version, hash))
            .await;

        match &result {
            Ok(events) if events.is_empty() => {
                debug!(maintainer = %caller, version, "approval already recorded")
            }
            Ok(events) => {
                info!(maintainer = %caller, version, hash = %hash, "approval granted");
                if events
                    .iter()
                    .any(|e| matches!(e, LedgerEvent::ReleaseApproved { .. }))
                {
                    info!(version, hash = %hash, "release approved");
                }
            }
            Err(e) => warn!(caller = %caller, version, error = %e, "approval rejected"),
        }
        result
    }

    /// Membership query.
    pub async fn is_maintainer(&self, identity: &Identity) -> bool {
        self.state.lock().await.ledger.is_maintainer(identity)
    }

    /// Whether `caller` itself is a maintainer.
    pub async fn am_i_maintainer(&self, caller: &Identity) -> bool {
        self.state.lock().await.ledger.am_i_maintainer(caller)
    }

    /// The owner identity.
    pub async fn owner(&self) -> Identity {
        *self.state.lock().await.ledger.owner()
    }

    /// Quorum threshold.
    pub async fn required_approvals(&self) -> u32 {
        self.state.lock().await.ledger.required_approvals()
    }

    /// Current maintainers in ascending order.
    pub async fn maintainers(&self) -> Vec<Identity> {
        self.state
            .lock()
            .await
            .ledger
            .registry()
            .maintainers()
            .copied()
            .collect()
    }

    /// Release info query.
    pub async fn get_release_info(&self, version: &str) -> ReleaseInfo {
        self.state.lock().await.ledger.get_release_info(version)
    }

    /// Verification query; see [`ApprovalLedger::check_release`].
    pub async fn check_release(&self, version: &str, candidate: &ContentHash) -> GateResult<bool> {
        Ok(self
            .state
            .lock()
            .await
            .ledger
            .check_release(version, candidate)?)
    }

    /// Approvers of `version`.
    pub async fn approvers(&self, version: &str) -> Vec<Identity> {
        self.state.lock().await.ledger.approvers(version)
    }

    /// Info for every known version.
    pub async fn releases(&self) -> Vec<ReleaseInfo> {
        self.state.lock().await.ledger.releases().collect()
    }

    /// Filtered event log, most recent first.
    pub async fn query_events(&self, query: &EventQuery) -> Vec<EventRecord> {
        self.state.lock().await.ledger.query_events(query)
    }

    /// Copy of the committed ledger.
    pub async fn snapshot(&self) -> ApprovalLedger {
        self.state.lock().await.ledger.clone()
    }

    /// Subscribe to events committed from now on.
    pub async fn subscribe(&self) -> EventStream {
        let (stream, publisher) = EventStream::new();
        self.state.lock().await.subscribers.push(publisher);
        stream
    }

    /// Apply `op` to a working copy, persist it, then commit and publish.
    async fn mutate<F>(&self, op: F) -> GateResult<Vec<LedgerEvent>>
    where
        F: FnOnce(&mut ApprovalLedger) -> Result<Vec<LedgerEvent>, ApprovalError>,
    {
        let mut state = self.state.lock().await;
        let _writer = self.store.lock().await?;
        Self::refresh(&self.store, &mut state).await?;

        let mut working = state.ledger.clone();
        let first_sequence = working.next_sequence();
        let events = op(&mut working)?;
        if events.is_empty() {
            return Ok(events);
        }

        self.store.save(&working).await?;
        state.ledger = working;
        state.publish_from(first_sequence);

        Ok(events)
    }

    /// Adopt the store's ledger if another writer committed past ours.
    async fn refresh(store: &S, state: &mut GateState) -> GateResult<()> {
        let Some(latest) = store.load().await? else {
            return Ok(());
        };

        let seen = state.ledger.next_sequence();
        if latest.next_sequence() > seen {
            debug!(
                from = seen,
                to = latest.next_sequence(),
                "adopting ledger committed by another writer"
            );
            state.ledger = latest;
            state.publish_from(seen);
        }
        Ok(())
    }
}
