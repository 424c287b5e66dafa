//! Inclusion proof verification
//!
//! Verification is a trust boundary: proofs and roots usually come from an
//! audit submission. Nothing here returns an error; every anomaly ends up as
//! `verified: false` with a message saying what went wrong.

use crate::hasher::MerkleHasher;
use crate::model::{Direction, Hash, ProofStep, RawProofStep};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MSG_VALID: &str = "proof valid";
pub const MSG_MISMATCH: &str = "fraud detected - mismatch";

/// Outcome of a proof check
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub verified: bool,
    /// Root recomputed from the entry and proof; absent when the proof could
    /// not be walked at all
    pub computed_hash: Option<Hash>,
    pub message: String,
}

impl Verification {
    fn malformed(message: String) -> Self {
        Verification {
            verified: false,
            computed_hash: None,
            message,
        }
    }
}

/// Recompute the root for `entry` along `proof`
pub fn compute_root(hasher: &MerkleHasher, entry: &Value, proof: &[ProofStep]) -> Hash {
    proof
        .iter()
        .fold(hasher.leaf_hash(entry), |running, step| match step.direction {
            Direction::Left => hasher.node_hash(&step.sibling, &running),
            Direction::Right => hasher.node_hash(&running, &step.sibling),
        })
}

/// Check a typed proof against a claimed root
pub fn verify_proof(
    hasher: &MerkleHasher,
    entry: &Value,
    proof: &[ProofStep],
    claimed_root: &Hash,
) -> Verification {
    let computed = compute_root(hasher, entry, proof);
    let verified = computed == *claimed_root;
    Verification {
        verified,
        computed_hash: Some(computed),
        message: if verified { MSG_VALID } else { MSG_MISMATCH }.to_string(),
    }
}

/// Check an untrusted, string-typed proof against a hex root
pub fn verify_submission(
    hasher: &MerkleHasher,
    entry: &Value,
    proof: &[RawProofStep],
    claimed_root: &str,
) -> Verification {
    let mut steps = Vec::with_capacity(proof.len());
    for (i, raw) in proof.iter().enumerate() {
        match raw.parse() {
            Ok(step) => steps.push(step),
            Err(e) => return Verification::malformed(format!("malformed proof step {}: {}", i, e)),
        }
    }

    let root = match Hash::from_hex(claimed_root) {
        Ok(root) => root,
        Err(_) => {
            // The proof itself was usable, so still report what it yields
            let computed = compute_root(hasher, entry, &steps);
            return Verification {
                verified: false,
                computed_hash: Some(computed),
                message: format!("malformed root {:?}", claimed_root),
            };
        }
    };

    verify_proof(hasher, entry, &steps, &root)
}
