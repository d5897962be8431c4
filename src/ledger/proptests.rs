//! Property-based tests for the approval ledger
//!
//! Random operation sequences (including unauthorized callers, repeats and
//! conflicting hashes) are replayed against a ledger, checking after every
//! step that:
//! - Maintainership is append-only and never includes the owner
//! - `approved` never reverts and matches the quorum rule
//! - `ReleaseApproved` fires at most once per version
//! - Approvers are always registered maintainers
//! - Failed operations leave the ledger unchanged

use super::{ApprovalLedger, ContentHash, LedgerEvent};
use crate::identity::Identity;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

const OWNER: u8 = 0;

fn id(byte: u8) -> Identity {
    Identity::new([byte; 32])
}

#[derive(Debug, Clone)]
enum Op {
    AddMaintainer { caller: u8, target: u8 },
    Deploy { caller: u8, version: u8, hash: u8 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6, 0u8..6).prop_map(|(caller, target)| Op::AddMaintainer { caller, target }),
        (0u8..6, 0u8..3, 0u8..2).prop_map(|(caller, version, hash)| Op::Deploy {
            caller,
            version,
            hash
        }),
    ]
}

fn version_name(v: u8) -> String {
    format!("1.{}.0", v)
}

proptest! {
    #[test]
    fn prop_ledger_invariants(
        required in 1u32..4,
        ops in proptest::collection::vec(op_strategy(), 0..60),
    ) {
        let mut ledger = ApprovalLedger::new(id(OWNER), required).unwrap();
        let mut ever_maintainers: BTreeSet<Identity> = BTreeSet::new();
        let mut ever_approved: BTreeSet<String> = BTreeSet::new();
        let mut approved_events: BTreeMap<String, usize> = BTreeMap::new();

        for op in ops {
            let before = ledger.clone();
            let result = match &op {
                Op::AddMaintainer { caller, target } => {
                    ledger.add_maintainer(&id(*caller), id(*target))
                }
                Op::Deploy { caller, version, hash } => ledger.deploy_release(
                    &id(*caller),
                    &version_name(*version),
                    ContentHash::new([*hash; 32]),
                ),
            };

            match result {
                Ok(events) => {
                    for event in &events {
                        match event {
                            LedgerEvent::MaintainerAdded { maintainer } => {
                                ever_maintainers.insert(*maintainer);
                            }
                            LedgerEvent::ReleaseApproved { version } => {
                                *approved_events.entry(version.clone()).or_default() += 1;
                            }
                            LedgerEvent::ApprovalGranted { maintainer, .. } => {
                                prop_assert!(ledger.is_maintainer(maintainer));
                            }
                        }
                    }
                }
                Err(_) => prop_assert_eq!(&ledger, &before),
            }

            // Owner is never a maintainer.
            prop_assert!(!ledger.is_maintainer(&id(OWNER)));

            // Append-only maintainership.
            for m in &ever_maintainers {
                prop_assert!(ledger.is_maintainer(m));
            }

            for info in ledger.releases() {
                // Quorum rule.
                prop_assert_eq!(info.approved, info.approvals >= required as usize);

                // Monotonic approval.
                if ever_approved.contains(&info.version) {
                    prop_assert!(info.approved);
                }
                if info.approved {
                    ever_approved.insert(info.version.clone());
                }

                for approver in ledger.approvers(&info.version) {
                    prop_assert!(ledger.is_maintainer(&approver));
                }
            }

            for count in approved_events.values() {
                prop_assert!(*count <= 1);
            }

            for (i, record) in ledger.events().iter().enumerate() {
                prop_assert_eq!(record.sequence, i as u64);
            }
        }
    }

    /// checkRelease agrees with the recorded hash and approval flag.
    #[test]
    fn prop_check_release_agrees_with_info(
        approvers in 1u8..5,
        required in 1u32..5,
        candidate in 0u8..3,
    ) {
        let mut ledger = ApprovalLedger::new(id(OWNER), required).unwrap();
        for m in 1..=approvers {
            ledger.add_maintainer(&id(OWNER), id(m)).unwrap();
            ledger
                .deploy_release(&id(m), "2.0.0", ContentHash::new([1; 32]))
                .unwrap();
        }

        let info = ledger.get_release_info("2.0.0");
        let result = ledger.check_release("2.0.0", &ContentHash::new([candidate; 32]));
        if candidate == 1 {
            prop_assert_eq!(result.unwrap(), info.approved);
        } else {
            prop_assert!(result.unwrap_err().is_hash_error());
        }
    }
}
