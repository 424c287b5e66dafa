//! Domain-separated leaf and node hashing
//!
//! ```text
//! leaf = H(0x00 || canonical_json(entry))
//! node = H(0x01 || left || right)
//! ```
//!
//! The tag byte keeps a leaf digest from ever being replayed as an internal
//! node inside a forged proof (and the reverse).

use crate::canonical::canonicalize;
use crate::model::{Hash, HASH_LEN};
use crate::{Error, Result};
use blake2::digest::consts::U32;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Digest;
use std::fmt;
use std::str::FromStr;

/// Tag prefixed to canonical entry bytes before hashing a leaf
pub const LEAF_TAG: u8 = 0x00;

/// Tag prefixed to the child pair before hashing an internal node
pub const NODE_TAG: u8 = 0x01;

type Blake2b256 = blake2::Blake2b<U32>;

/// The digest primitive behind leaves and nodes
///
/// Every variant produces [`HASH_LEN`] bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "blake2b-256")]
    Blake2b256,
    #[serde(rename = "blake3")]
    Blake3,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 3] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Blake2b256,
        HashAlgorithm::Blake3,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake2b256 => "blake2b-256",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Hash the concatenation of `parts`
    pub fn digest_parts(&self, parts: &[&[u8]]) -> Hash {
        let mut out = [0u8; HASH_LEN];
        match self {
            HashAlgorithm::Sha256 => {
                let mut hasher = sha2::Sha256::new();
                for part in parts {
                    hasher.update(part);
                }
                out.copy_from_slice(&hasher.finalize());
            }
            HashAlgorithm::Blake2b256 => {
                let mut hasher = Blake2b256::new();
                for part in parts {
                    hasher.update(part);
                }
                out.copy_from_slice(&hasher.finalize());
            }
            HashAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                for part in parts {
                    hasher.update(part);
                }
                out = *hasher.finalize().as_bytes();
            }
        }
        Hash::from_bytes(out)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "blake2b-256" | "blake2b256" | "blake2b" => Ok(HashAlgorithm::Blake2b256),
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(Error::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Computes leaf and node hashes with a fixed algorithm
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MerkleHasher {
    algorithm: HashAlgorithm,
}

impl MerkleHasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        MerkleHasher { algorithm }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash a log entry as a leaf
    pub fn leaf_hash(&self, entry: &Value) -> Hash {
        self.leaf_hash_canonical(&canonicalize(entry))
    }

    /// Hash an already-canonicalized entry as a leaf
    pub fn leaf_hash_canonical(&self, canonical: &str) -> Hash {
        self.algorithm
            .digest_parts(&[&[LEAF_TAG], canonical.as_bytes()])
    }

    /// Hash two children into their parent. Order matters.
    pub fn node_hash(&self, left: &Hash, right: &Hash) -> Hash {
        self.algorithm
            .digest_parts(&[&[NODE_TAG], left.as_bytes(), right.as_bytes()])
    }

    /// Hex-string form of [`MerkleHasher::node_hash`]
    pub fn node_hash_hex(&self, left: &str, right: &str) -> Result<String> {
        let left = parse_hex(left)?;
        let right = parse_hex(right)?;
        Ok(self.node_hash(&left, &right).to_hex())
    }
}

fn parse_hex(s: &str) -> Result<Hash> {
    Hash::from_hex(s).map_err(|e| Error::InvalidHash(format!("{:?}: {}", s, e)))
}

/// Leaf hash with the default algorithm
pub fn leaf_hash(entry: &Value) -> Hash {
    MerkleHasher::default().leaf_hash(entry)
}

/// Node hash with the default algorithm
pub fn node_hash(left: &Hash, right: &Hash) -> Hash {
    MerkleHasher::default().node_hash(left, right)
}
