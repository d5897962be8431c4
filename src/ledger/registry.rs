//! Maintainer registry.
//!
//! - Single owner, fixed at construction
//! - Append-only maintainer set (no removal)
//! - Owner and maintainers are disjoint

use crate::identity::Identity;
use crate::ledger::error::{ApprovalError, ApprovalResult, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identities authorized to approve releases, plus the owner who manages them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintainerRegistry {
    owner: Identity,
    maintainers: BTreeSet<Identity>,
}

impl MaintainerRegistry {
    /// Creates an empty registry owned by `owner`.
    pub fn new(owner: Identity) -> Self {
        Self {
            owner,
            maintainers: BTreeSet::new(),
        }
    }

    /// The owner identity.
    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    /// Membership query; callable by anyone.
    pub fn is_maintainer(&self, identity: &Identity) -> bool {
        self.maintainers.contains(identity)
    }

    /// Current maintainers in ascending order.
    pub fn maintainers(&self) -> impl Iterator<Item = &Identity> {
        self.maintainers.iter()
    }

    /// Number of maintainers.
    pub fn len(&self) -> usize {
        self.maintainers.len()
    }

    /// Whether no maintainer has been added yet.
    pub fn is_empty(&self) -> bool {
        self.maintainers.is_empty()
    }

    /// Fails with `Unauthorized` unless `caller` is the owner.
    pub fn require_owner(&self, caller: &Identity) -> ApprovalResult<()> {
        if caller == &self.owner {
            Ok(())
        } else {
            Err(ApprovalError::Unauthorized {
                role: Role::Owner,
                caller: *caller,
            })
        }
    }

    /// Fails with `Unauthorized` unless `caller` is a maintainer.
    pub fn require_maintainer(&self, caller: &Identity) -> ApprovalResult<()> {
        if self.is_maintainer(caller) {
            Ok(())
        } else {
            Err(ApprovalError::Unauthorized {
                role: Role::Maintainer,
                caller: *caller,
            })
        }
    }

    /// Adds `identity` on behalf of `caller`.
    ///
    /// Returns `true` when the identity was newly added and `false` when it
    /// was already a maintainer.
    pub fn add_maintainer(&mut self, caller: &Identity, identity: Identity) -> ApprovalResult<bool> {
        self.require_owner(caller)?;
        if identity == self.owner {
            return Err(ApprovalError::OwnerCannotBeMaintainer);
        }
        Ok(self.maintainers.insert(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> Identity {
        Identity::new([byte; 32])
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = MaintainerRegistry::new(id(0));
        assert!(registry.is_empty());
        assert_eq!(registry.owner(), &id(0));
        assert!(!registry.is_maintainer(&id(0)));
    }

    #[test]
    fn test_owner_adds_maintainer() {
        let mut registry = MaintainerRegistry::new(id(0));
        assert!(registry.add_maintainer(&id(0), id(1)).unwrap());
        assert!(registry.is_maintainer(&id(1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut registry = MaintainerRegistry::new(id(0));
        assert!(registry.add_maintainer(&id(0), id(1)).unwrap());
        assert!(!registry.add_maintainer(&id(0), id(1)).unwrap());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_maintainer_cannot_add_maintainer() {
        let mut registry = MaintainerRegistry::new(id(0));
        registry.add_maintainer(&id(0), id(1)).unwrap();

        let err = registry.add_maintainer(&id(1), id(2)).unwrap_err();
        assert_eq!(
            err,
            ApprovalError::Unauthorized {
                role: Role::Owner,
                caller: id(1)
            }
        );
        assert!(!registry.is_maintainer(&id(2)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_owner_cannot_become_maintainer() {
        let mut registry = MaintainerRegistry::new(id(0));
        let err = registry.add_maintainer(&id(0), id(0)).unwrap_err();
        assert_eq!(err, ApprovalError::OwnerCannotBeMaintainer);
        assert!(!registry.is_maintainer(&id(0)));
    }

    #[test]
    fn test_require_maintainer() {
        let mut registry = MaintainerRegistry::new(id(0));
        registry.add_maintainer(&id(0), id(1)).unwrap();

        assert!(registry.require_maintainer(&id(1)).is_ok());
        assert!(registry.require_maintainer(&id(0)).is_err());
        assert!(registry.require_maintainer(&id(7)).is_err());
    }

    #[test]
    fn test_maintainers_sorted() {
        let mut registry = MaintainerRegistry::new(id(0));
        for b in [5u8, 2, 9] {
            registry.add_maintainer(&id(0), id(b)).unwrap();
        }
        let listed: Vec<_> = registry.maintainers().copied().collect();
        assert_eq!(listed, vec![id(2), id(5), id(9)]);
    }
}
