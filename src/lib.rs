//! Aiakos - Multi-Party Release Approval Gate
//!
//! A release is approved once enough designated maintainers have
//! independently confirmed the same (version, content hash) pair.
//!
//! Key principles:
//! - One fixed owner manages an append-only maintainer set
//! - The first approval fixes a version's hash; disagreeing hashes are rejected
//! - Approval is monotonic: an approved release stays approved
//! - Every mutation is serialized, persisted atomically, then published
//!
//! The crate attests releases; it never stores or moves the artifacts.

pub mod identity;
pub mod ledger;
pub mod serialization;
