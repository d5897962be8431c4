//! Release approval ledger.
//!
//! - Maintainer registry: one fixed owner, append-only maintainer set
//! - Per-version approval tally with quorum detection
//! - Tamper evidence: the first approval fixes the content hash
//! - Single-writer gate with atomic persistence and a live event stream

pub mod error;
pub mod event_stream;
pub mod events;
pub mod file_store;
pub mod gate;
pub mod mock;
pub mod registry;
pub mod release;
pub mod state;
pub mod traits;

#[cfg(test)]
mod proptests;

pub use error::{ApprovalError, ApprovalResult, Role};
pub use event_stream::EventStream;
pub use events::{EventKind, EventQuery, EventRecord, LedgerEvent};
pub use file_store::FileStore;
pub use gate::{GateError, GateResult, ReleaseGate};
pub use registry::MaintainerRegistry;
pub use release::{ContentHash, Release, ReleaseInfo, ReleaseStatus};
pub use state::{ApprovalLedger, ValidationError};
pub use traits::{LedgerStore, StoreError, StoreResult};
