//! Ledger events and the append-only event log query.
//!
//! Design principles:
//! - Immutable append-only log (no deletion)
//! - Total order via a contiguous sequence number
//! - Query results are most-recent first

use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Externally observable event emitted by a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// The owner registered a new maintainer.
    MaintainerAdded { maintainer: Identity },
    /// A maintainer's approval was recorded for a version.
    ApprovalGranted { maintainer: Identity, version: String },
    /// A version reached quorum. Emitted once per version.
    ReleaseApproved { version: String },
}

impl LedgerEvent {
    /// Kind discriminant, used for filtering.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MaintainerAdded { .. } => EventKind::MaintainerAdded,
            Self::ApprovalGranted { .. } => EventKind::ApprovalGranted,
            Self::ReleaseApproved { .. } => EventKind::ReleaseApproved,
        }
    }

    /// Maintainer carried by the event, if any.
    pub fn maintainer(&self) -> Option<&Identity> {
        match self {
            Self::MaintainerAdded { maintainer } | Self::ApprovalGranted { maintainer, .. } => {
                Some(maintainer)
            }
            Self::ReleaseApproved { .. } => None,
        }
    }

    /// Version carried by the event, if any.
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::ApprovalGranted { version, .. } | Self::ReleaseApproved { version } => {
                Some(version)
            }
            Self::MaintainerAdded { .. } => None,
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaintainerAdded { maintainer } => {
                write!(f, "MaintainerAdded maintainer={}", maintainer)
            }
            Self::ApprovalGranted {
                maintainer,
                version,
            } => write!(
                f,
                "ApprovalGranted maintainer={} version={}",
                maintainer, version
            ),
            Self::ReleaseApproved { version } => write!(f, "ReleaseApproved version={}", version),
        }
    }
}

/// Event kind, for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    MaintainerAdded,
    ApprovalGranted,
    ReleaseApproved,
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "maintaineradded" => Ok(Self::MaintainerAdded),
            "approvalgranted" => Ok(Self::ApprovalGranted),
            "releaseapproved" => Ok(Self::ReleaseApproved),
            _ => Err(format!(
                "unknown event kind '{}' (expected maintainer-added, approval-granted or release-approved)",
                s
            )),
        }
    }
}

/// An event together with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based, contiguous position in the log.
    pub sequence: u64,
    pub event: LedgerEvent,
}

/// Query options for the event log.
#[derive(Debug, Clone)]
pub struct EventQuery {
    /// Filter by event kind.
    pub kind: Option<EventKind>,
    /// Filter by maintainer.
    pub maintainer: Option<Identity>,
    /// Filter by version.
    pub version: Option<String>,
    /// Only records with a sequence strictly greater than this.
    pub after_sequence: Option<u64>,
    /// Limit number of results (most recent first).
    pub limit: Option<usize>,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            kind: None,
            maintainer: None,
            version: None,
            after_sequence: None,
            limit: Some(50),
        }
    }
}

/// Query the event log with filters.
///
/// Returns records in reverse log order (most recent first).
pub fn query_events(records: &[EventRecord], query: &EventQuery) -> Vec<EventRecord> {
    let matching = records.iter().rev().filter(|record| {
        if let Some(kind) = query.kind {
            if record.event.kind() != kind {
                return false;
            }
        }

        if let Some(ref maintainer) = query.maintainer {
            if record.event.maintainer() != Some(maintainer) {
                return false;
            }
        }

        if let Some(ref version) = query.version {
            if record.event.version() != Some(version.as_str()) {
                return false;
            }
        }

        if let Some(after) = query.after_sequence {
            if record.sequence <= after {
                return false;
            }
        }

        true
    });

    match query.limit {
        Some(limit) => matching.take(limit).cloned().collect(),
        None => matching.cloned().collect(),
    }
}

/// Format event records for terminal display.
pub fn format_events(records: &[EventRecord]) -> String {
    if records.is_empty() {
        return "No events found.".to_string();
    }

    records
        .iter()
        .map(|record| format!("#{:<6} {}", record.sequence, record.event))
        .collect::<Vec<_>>()
        .join("\n")
}
