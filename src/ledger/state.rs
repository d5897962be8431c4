//! Release approval ledger state.
//!
//! Holds the maintainer registry, the quorum threshold, one [`Release`] per
//! version and the append-only event log. Every mutation validates all of
//! its preconditions before touching state, so a failed call leaves the
//! ledger exactly as it was.
//!
//! Schema evolution follows the usual rule for persisted state: new fields
//! get `#[serde(default)]` and `schema_version` is bumped.

use crate::identity::Identity;
use crate::ledger::error::{ApprovalError, ApprovalResult};
use crate::ledger::events::{query_events, EventQuery, EventRecord, LedgerEvent};
use crate::ledger::registry::MaintainerRegistry;
use crate::ledger::release::{ContentHash, Release, ReleaseInfo};
use crate::serialization::{from_cbor, to_cbor, SerializationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u64 = 1;

/// Invariant violations found in a decoded ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("schema version {found} is newer than supported version {}", SCHEMA_VERSION)]
    UnsupportedSchema { found: u64 },

    #[error("required approvals must be at least 1, got {0}")]
    InvalidQuorum(u32),

    #[error("owner {0} is listed as a maintainer")]
    OwnerIsMaintainer(Identity),

    #[error("release {version} approved by non-maintainer {approver}")]
    UnknownApprover { version: String, approver: Identity },

    #[error("release {version} has no approvers")]
    EmptyRelease { version: String },

    #[error("release {version} approval flag disagrees with {approvals}/{required} approvals")]
    ApprovalFlagMismatch {
        version: String,
        approvals: usize,
        required: u32,
    },

    #[error("event at position {position} has sequence {sequence}")]
    NonContiguousEvents { position: usize, sequence: u64 },
}

/// The approval ledger: registry, releases and event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalLedger {
    /// Schema version for evolution.
    pub schema_version: u64,

    /// Quorum threshold, fixed at construction.
    required_approvals: u32,

    /// Owner and maintainers.
    registry: MaintainerRegistry,

    /// Releases keyed by exact version string.
    releases: BTreeMap<String, Release>,

    /// Append-only event log.
    #[serde(default)]
    events: Vec<EventRecord>,
}

impl ApprovalLedger {
    /// Creates an empty ledger owned by `owner`.
    ///
    /// Fails with `InvalidQuorum` when `required_approvals` is zero.
    pub fn new(owner: Identity, required_approvals: u32) -> ApprovalResult<Self> {
        if required_approvals == 0 {
            return Err(ApprovalError::InvalidQuorum(required_approvals));
        }

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            required_approvals,
            registry: MaintainerRegistry::new(owner),
            releases: BTreeMap::new(),
            events: Vec::new(),
        })
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        to_cbor(self)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        from_cbor(bytes)
    }

    /// Checks every invariant the mutating operations maintain.
    ///
    /// Ledgers built through `new` and the operations always pass; this is
    /// for ledgers decoded from storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(ValidationError::UnsupportedSchema {
                found: self.schema_version,
            });
        }
        if self.required_approvals == 0 {
            return Err(ValidationError::InvalidQuorum(self.required_approvals));
        }

        let owner = self.registry.owner();
        if self.registry.is_maintainer(owner) {
            return Err(ValidationError::OwnerIsMaintainer(*owner));
        }

        let required = self.required_approvals as usize;
        for (version, release) in &self.releases {
            if release.approvers.is_empty() {
                return Err(ValidationError::EmptyRelease {
                    version: version.clone(),
                });
            }
            if let Some(approver) = release
                .approvers
                .iter()
                .find(|a| !self.registry.is_maintainer(a))
            {
                return Err(ValidationError::UnknownApprover {
                    version: version.clone(),
                    approver: *approver,
                });
            }
            if release.approved != (release.approvals() >= required) {
                return Err(ValidationError::ApprovalFlagMismatch {
                    version: version.clone(),
                    approvals: release.approvals(),
                    required: self.required_approvals,
                });
            }
        }

        if let Some((position, record)) = self
            .events
            .iter()
            .enumerate()
            .find(|(i, record)| record.sequence != *i as u64)
        {
            return Err(ValidationError::NonContiguousEvents {
                position,
                sequence: record.sequence,
            });
        }

        Ok(())
    }

    /// The owner identity.
    pub fn owner(&self) -> &Identity {
        self.registry.owner()
    }

    /// Quorum threshold.
    pub fn required_approvals(&self) -> u32 {
        self.required_approvals
    }

    /// Read access to the maintainer registry.
    pub fn registry(&self) -> &MaintainerRegistry {
        &self.registry
    }

    /// Membership query; callable by anyone.
    pub fn is_maintainer(&self, identity: &Identity) -> bool {
        self.registry.is_maintainer(identity)
    }

    /// Whether the caller itself is a maintainer.
    pub fn am_i_maintainer(&self, caller: &Identity) -> bool {
        self.registry.is_maintainer(caller)
    }

    /// Owner-gated: registers `identity` as a maintainer.
    ///
    /// Re-adding an existing maintainer succeeds and emits nothing.
    pub fn add_maintainer(
        &mut self,
        caller: &Identity,
        identity: Identity,
    ) -> ApprovalResult<Vec<LedgerEvent>> {
        let added = self.registry.add_maintainer(caller, identity)?;
        if !added {
            return Ok(Vec::new());
        }

        let events = vec![LedgerEvent::MaintainerAdded {
            maintainer: identity,
        }];
        self.append_events(&events);
        Ok(events)
    }

    /// Maintainer-gated: records the caller's approval of `(version, hash)`.
    ///
    /// Returns the events emitted, in order. A repeated approval by the same
    /// maintainer returns no events. A hash differing from the one recorded
    /// for the version is rejected with `HashConflict`.
    pub fn deploy_release(
        &mut self,
        caller: &Identity,
        version: &str,
        hash: ContentHash,
    ) -> ApprovalResult<Vec<LedgerEvent>> {
        self.registry.require_maintainer(caller)?;

        let required = self.required_approvals as usize;
        let mut events = Vec::new();

        match self.releases.get_mut(version) {
            None => {
                let mut release = Release::first_approval(hash, *caller);
                events.push(LedgerEvent::ApprovalGranted {
                    maintainer: *caller,
                    version: version.to_string(),
                });
                if release.approvals() >= required {
                    release.approved = true;
                    events.push(LedgerEvent::ReleaseApproved {
                        version: version.to_string(),
                    });
                }
                self.releases.insert(version.to_string(), release);
            }
            Some(release) => {
                if release.hash != hash {
                    return Err(ApprovalError::HashConflict {
                        version: version.to_string(),
                        expected: release.hash,
                        given: hash,
                    });
                }

                if !release.approvers.insert(*caller) {
                    return Ok(Vec::new());
                }

                events.push(LedgerEvent::ApprovalGranted {
                    maintainer: *caller,
                    version: version.to_string(),
                });
                if !release.approved && release.approvals() >= required {
                    release.approved = true;
                    events.push(LedgerEvent::ReleaseApproved {
                        version: version.to_string(),
                    });
                }
            }
        }

        self.append_events(&events);
        Ok(events)
    }

    /// Release info; `exists == false` for a version nobody approved.
    pub fn get_release_info(&self, version: &str) -> ReleaseInfo {
        match self.releases.get(version) {
            Some(release) => ReleaseInfo::from_release(version, release),
            None => ReleaseInfo::missing(version),
        }
    }

    /// Verifies a candidate hash for a version.
    ///
    /// `Ok(true)` iff the version is approved and the hash matches.
    /// `Ok(false)` when the version is unknown or still pending.
    /// `Err(HashMismatch)` when the version exists with a different hash.
    pub fn check_release(&self, version: &str, candidate: &ContentHash) -> ApprovalResult<bool> {
        let Some(release) = self.releases.get(version) else {
            return Ok(false);
        };

        if &release.hash != candidate {
            return Err(ApprovalError::HashMismatch {
                version: version.to_string(),
                expected: release.hash,
                given: *candidate,
            });
        }

        Ok(release.approved)
    }

    /// The entry for `version`, if one exists.
    pub fn release(&self, version: &str) -> Option<&Release> {
        self.releases.get(version)
    }

    /// Approvers of `version` in ascending order (empty when unknown).
    pub fn approvers(&self, version: &str) -> Vec<Identity> {
        self.releases
            .get(version)
            .map(|r| r.approvers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Info for every known version, ordered by version string.
    pub fn releases(&self) -> impl Iterator<Item = ReleaseInfo> + '_ {
        self.releases
            .iter()
            .map(|(version, release)| ReleaseInfo::from_release(version, release))
    }

    /// Number of known versions.
    pub fn release_count(&self) -> usize {
        self.releases.len()
    }

    /// Number of approved versions.
    pub fn approved_count(&self) -> usize {
        self.releases.values().filter(|r| r.approved).count()
    }

    /// The full event log, oldest first.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Filtered view of the event log, most recent first.
    pub fn query_events(&self, query: &EventQuery) -> Vec<EventRecord> {
        query_events(&self.events, query)
    }

    /// Sequence number the next event will receive.
    pub fn next_sequence(&self) -> u64 {
        self.events.len() as u64
    }

    fn append_events(&mut self, events: &[LedgerEvent]) {
        for event in events {
            let sequence = self.next_sequence();
            self.events.push(EventRecord {
                sequence,
                event: event.clone(),
            });
        }
    }
}
