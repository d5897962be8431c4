//! Trait abstraction for ledger persistence.
//!
//! The release gate only needs "take the writer lock", "load the last
//! committed ledger" and "commit this ledger". Keeping that behind a trait
//! lets tests run against [`MemoryStore`](crate::ledger::mock::MemoryStore)
//! and lets the CLI use [`FileStore`](crate::ledger::file_store::FileStore).
//!
//! The writer lock is what makes the gate the single writer even when
//! several gates (or several processes) share one store.

use crate::ledger::state::{ApprovalLedger, ValidationError};
use crate::serialization::SerializationError;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored bytes could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// The store refused the write.
    #[error("Write rejected: {0}")]
    WriteRejected(String),

    /// The stored ledger decoded but breaks a ledger invariant.
    #[error("Invalid ledger: {0}")]
    Invalid(#[from] ValidationError),
}

/// Persistence backend for the approval ledger.
///
/// `save` must be atomic: after it returns an error, `load` still returns
/// the previously committed ledger.
///
/// Writers hold [`LedgerStore::lock`] across load, mutate and save. While one
/// holder has it, no other holder on the same store (in this process or any
/// other) can commit.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Guard for the exclusive writer lock; dropping it releases the lock.
    type Lock: Send;

    /// Waits for and takes the exclusive writer lock.
    async fn lock(&self) -> StoreResult<Self::Lock>;

    /// Loads the committed ledger, or `None` if nothing was ever saved.
    async fn load(&self) -> StoreResult<Option<ApprovalLedger>>;

    /// Commits `ledger`, replacing whatever was stored before.
    async fn save(&self, ledger: &ApprovalLedger) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::WriteRejected("disk full".to_string());
        assert_eq!(err.to_string(), "Write rejected: disk full");

        let io: StoreError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(io.to_string(), "IO error: gone");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: StoreError = ValidationError::InvalidQuorum(0).into();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(err.to_string().starts_with("Invalid ledger:"));
    }

    #[test]
    fn test_serialization_error_converts() {
        let err: StoreError = SerializationError::Decode("bad".to_string()).into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
