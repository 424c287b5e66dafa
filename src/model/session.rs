//! Notarized session record

use super::{Hash, MerkleProof};
use crate::canonical::canonicalize;
use crate::hasher::{HashAlgorithm, MerkleHasher};
use crate::tree::build_tree;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Everything stored for one notarized session log
///
/// Entries are kept in canonical form, which is exactly what was hashed into
/// the leaves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub algorithm: HashAlgorithm,
    pub entries: Vec<String>,
    pub leaf_hashes: Vec<Hash>,
    pub root: Hash,
    /// One proof per entry, same order
    pub proofs: Vec<MerkleProof>,
    /// 1 on submit, incremented by every recompute
    pub revision: u64,
    /// Unix millis
    pub created_at: u64,
    /// Unix millis
    pub updated_at: u64,
}

impl SessionRecord {
    /// Notarize `entries` as a new session (revision 1)
    pub fn build(
        session_id: impl Into<String>,
        algorithm: HashAlgorithm,
        entries: &[Value],
    ) -> Result<Self> {
        let hasher = MerkleHasher::new(algorithm);
        let canonical: Vec<String> = entries.iter().map(canonicalize).collect();
        let leaves: Vec<Hash> = canonical
            .iter()
            .map(|c| hasher.leaf_hash_canonical(c))
            .collect();
        let (root, leaf_hashes, proofs) = build_tree(&hasher, &leaves)?.into_parts();

        let now = now_millis();
        Ok(SessionRecord {
            session_id: session_id.into(),
            algorithm,
            entries: canonical,
            leaf_hashes,
            root,
            proofs,
            revision: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild from a replacement log, keeping identity and creation time
    pub fn recomputed(&self, algorithm: HashAlgorithm, entries: &[Value]) -> Result<Self> {
        let mut next = SessionRecord::build(self.session_id.clone(), algorithm, entries)?;
        next.revision = self.revision + 1;
        next.created_at = self.created_at;
        Ok(next)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_hashes.len()
    }

    pub fn hasher(&self) -> MerkleHasher {
        MerkleHasher::new(self.algorithm)
    }

    pub fn proof(&self, index: usize) -> Result<&MerkleProof> {
        self.proofs.get(index).ok_or(Error::ProofIndexOutOfRange {
            index,
            leaves: self.leaf_count(),
        })
    }

    /// Parse the stored canonical entries back into JSON values
    pub fn entries(&self) -> Result<Vec<Value>> {
        self.entries
            .iter()
            .map(|e| serde_json::from_str(e).map_err(Error::from))
            .collect()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_record() {
        let entries = vec![json!({"type": "bet", "amount": 10}), json!({"type": "win"})];
        let record = SessionRecord::build("s1", HashAlgorithm::Sha256, &entries).unwrap();

        assert_eq!(record.session_id, "s1");
        assert_eq!(record.revision, 1);
        assert_eq!(record.leaf_count(), 2);
        assert_eq!(record.entries[0], r#"{"amount":10,"type":"bet"}"#);
        assert_eq!(record.entries().unwrap(), entries);
        assert_eq!(record.leaf_hashes[1], record.hasher().leaf_hash(&entries[1]));
    }

    #[test]
    fn test_build_empty_rejected() {
        assert!(matches!(
            SessionRecord::build("s1", HashAlgorithm::Sha256, &[]),
            Err(Error::EmptyTree)
        ));
    }

    #[test]
    fn test_recomputed_bumps_revision() {
        let record = SessionRecord::build("s1", HashAlgorithm::Sha256, &[json!(1)]).unwrap();
        let next = record
            .recomputed(HashAlgorithm::Sha256, &[json!(1), json!(2)])
            .unwrap();

        assert_eq!(next.revision, 2);
        assert_eq!(next.created_at, record.created_at);
        assert_ne!(next.root, record.root);
    }

    #[test]
    fn test_proof_out_of_range() {
        let record = SessionRecord::build("s1", HashAlgorithm::Sha256, &[json!(1)]).unwrap();
        assert!(record.proof(0).unwrap().is_empty());
        assert!(matches!(
            record.proof(1),
            Err(Error::ProofIndexOutOfRange { index: 1, leaves: 1 })
        ));
    }

    #[test]
    fn test_bincode_roundtrip() {
        let entries = vec![json!("a"), json!("b"), json!("c")];
        let record = SessionRecord::build("s1", HashAlgorithm::Blake2b256, &entries).unwrap();
        let bytes = bincode::serialize(&record).unwrap();
        let back: SessionRecord = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, record);
    }
}
