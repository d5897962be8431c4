//! Principal identities for the approval gate.
//!
//! An [`Identity`] is an opaque 32-byte principal identifier. Two principals
//! are the same principal iff their bytes match exactly; nothing else about
//! the value is interpreted.
//!
//! # Rendering
//!
//! Identities render as 64 lowercase hex characters. Parsing accepts the same
//! form with an optional `0x` prefix and either letter case.
//!
//! # Derived identities
//!
//! Operators rarely want to pass raw bytes around, so [`derive_identity`]
//! maps a human label (e.g. `"alice"`) to a stable identity using
//! HKDF-SHA256 over a deployment salt followed by HMAC-SHA256 over the label.
//! The same label and salt always yield the same identity; changing the salt
//! yields an unrelated identity for every label.

use hkdf::Hkdf;
use ring::hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length in bytes of every identity.
pub const IDENTITY_LEN: usize = 32;

/// An opaque, unique principal identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    /// Creates an identity from its raw bytes.
    pub const fn new(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes of the identity.
    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// Short form used in log lines and CLI listings (first 4 bytes).
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({}…)", self.short())
    }
}

/// Errors produced when parsing a hex-encoded 32-byte value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityParseError {
    /// The input is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// The input decodes to the wrong number of bytes.
    #[error("expected {len} bytes, got {0}", len = IDENTITY_LEN)]
    InvalidLength(usize),
}

/// Decodes 64 hex characters (optional `0x` prefix) into 32 bytes.
///
/// Shared by [`Identity`] and the ledger's content hash type.
pub(crate) fn decode_hex32(s: &str) -> Result<[u8; IDENTITY_LEN], IdentityParseError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let bytes = hex::decode(digits).map_err(|e| IdentityParseError::InvalidHex(e.to_string()))?;
    if bytes.len() != IDENTITY_LEN {
        return Err(IdentityParseError::InvalidLength(bytes.len()));
    }

    let mut arr = [0u8; IDENTITY_LEN];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

impl FromStr for Identity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex32(s).map(Self)
    }
}

/// Expands the deployment salt into an HMAC key.
fn derive_label_key(salt: &[u8]) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(b"aiakos-identity-v1"), salt);
    let mut key = [0u8; 32];
    hk.expand(b"hmac-sha256-key", &mut key)
        .expect("HKDF expand should never fail with valid length");
    key
}

/// Derives a stable identity from a human label and a deployment salt.
///
/// # Example
///
/// ```
/// use aiakos::identity::derive_identity;
///
/// let alice = derive_identity("alice", b"release-team");
/// assert_eq!(alice, derive_identity("alice", b"release-team"));
/// assert_ne!(alice, derive_identity("bob", b"release-team"));
/// ```
pub fn derive_identity(label: &str, salt: &[u8]) -> Identity {
    let key_bytes = derive_label_key(salt);
    let key = hmac::Key::new(hmac::HMAC_SHA256, &key_bytes);
    let tag = hmac::sign(&key, label.as_bytes());

    let mut bytes = [0u8; IDENTITY_LEN];
    bytes.copy_from_slice(tag.as_ref());
    Identity(bytes)
}
