//! Domain errors for the approval ledger.
//!
//! Every variant is a precondition violation: the operation that produced it
//! had no effect, and the caller may retry once the precondition holds.

use crate::identity::Identity;
use crate::ledger::release::ContentHash;
use std::fmt;
use thiserror::Error;

/// Role an operation requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Maintainer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "the owner"),
            Self::Maintainer => write!(f, "a maintainer"),
        }
    }
}

/// Result type for ledger operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;

/// Approval ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApprovalError {
    /// Caller lacks the role the operation is gated on.
    #[error("caller is not {role}")]
    Unauthorized { role: Role, caller: Identity },

    /// A submitted approval names a different hash than the one recorded for
    /// the version.
    #[error("conflicting release hash for {version}: recorded {expected}, submitted {given}")]
    HashConflict {
        version: String,
        expected: ContentHash,
        given: ContentHash,
    },

    /// A verification query names a different hash than the one recorded.
    #[error("mismatch release hashes for {version}: recorded {expected}, given {given}")]
    HashMismatch {
        version: String,
        expected: ContentHash,
        given: ContentHash,
    },

    /// The quorum threshold must be at least one.
    #[error("required approvals must be at least 1, got {0}")]
    InvalidQuorum(u32),

    /// Ownership and maintainership are disjoint roles.
    #[error("the owner cannot be registered as a maintainer")]
    OwnerCannotBeMaintainer,
}

impl ApprovalError {
    /// Whether this error reports a hash disagreement (submission or query).
    pub fn is_hash_error(&self) -> bool {
        matches!(self, Self::HashConflict { .. } | Self::HashMismatch { .. })
    }
}
