//! Release records and content hashes.

use crate::identity::{decode_hex32, Identity, IdentityParseError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// A 32-byte content digest identifying release artifact content.
///
/// Compared for exact equality only. The all-zero value is what
/// [`ReleaseInfo`] reports for a version that has no entry.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Wraps raw digest bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The all-zero hash.
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// SHA-256 of `data`.
    pub fn digest(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// SHA-256 of everything readable from `reader`.
    pub fn digest_reader<R: Read>(mut reader: R) -> std::io::Result<Self> {
        let mut hasher = Sha256::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Self(hasher.finalize().into()))
    }

    /// SHA-256 of the file at `path`.
    pub fn digest_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::digest_reader(std::io::BufReader::new(file))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", hex::encode(self.0))
    }
}

impl FromStr for ContentHash {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex32(s).map(Self)
    }
}

/// Accumulated approval state for one version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Hash fixed by the first approval.
    pub hash: ContentHash,

    /// Maintainers who approved with the matching hash.
    pub approvers: BTreeSet<Identity>,

    /// Set once the approver count reaches the quorum; never cleared.
    pub approved: bool,
}

impl Release {
    /// Entry created by a first approval.
    pub(crate) fn first_approval(hash: ContentHash, approver: Identity) -> Self {
        let mut approvers = BTreeSet::new();
        approvers.insert(approver);
        Self {
            hash,
            approvers,
            approved: false,
        }
    }

    /// Number of distinct approvals so far.
    pub fn approvals(&self) -> usize {
        self.approvers.len()
    }

    /// Lifecycle stage of this entry.
    pub fn status(&self) -> ReleaseStatus {
        if self.approved {
            ReleaseStatus::Approved
        } else {
            ReleaseStatus::PendingApproval
        }
    }
}

/// Per-version lifecycle: `Unknown -> PendingApproval -> Approved`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseStatus {
    Unknown,
    PendingApproval,
    Approved,
}

impl fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::PendingApproval => write!(f, "pending approval"),
            Self::Approved => write!(f, "approved"),
        }
    }
}

/// Answer to a release info query.
///
/// `exists == false` means nobody has ever submitted an approval for the
/// version; the remaining fields then hold their defaults. Serializes the
/// hash as hex, matching what the CLI accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub version: String,
    #[serde(with = "hex_hash")]
    pub hash: ContentHash,
    pub approved: bool,
    pub exists: bool,
    pub approvals: usize,
}

impl ReleaseInfo {
    /// Info for a version without an entry.
    pub fn missing(version: &str) -> Self {
        Self {
            version: version.to_string(),
            hash: ContentHash::zero(),
            approved: false,
            exists: false,
            approvals: 0,
        }
    }

    /// Info describing an existing entry.
    pub fn from_release(version: &str, release: &Release) -> Self {
        Self {
            version: version.to_string(),
            hash: release.hash,
            approved: release.approved,
            exists: true,
            approvals: release.approvals(),
        }
    }

    /// Lifecycle stage reported by this info.
    pub fn status(&self) -> ReleaseStatus {
        match (self.exists, self.approved) {
            (false, _) => ReleaseStatus::Unknown,
            (true, false) => ReleaseStatus::PendingApproval,
            (true, true) => ReleaseStatus::Approved,
        }
    }
}

/// Hex string (de)serialization for a [`ContentHash`] field.
mod hex_hash {
    use super::ContentHash;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(hash: &ContentHash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(hash)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ContentHash, D::Error> {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(D::Error::custom)
    }
}
