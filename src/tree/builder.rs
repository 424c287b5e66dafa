//! Binary merkle tree over an ordered list of leaf hashes

use crate::hasher::MerkleHasher;
use crate::model::{Direction, Hash, MerkleProof, ProofStep};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A fully built merkle tree
///
/// `levels[0]` holds the leaves and the last level holds only the root. On a
/// level with an odd count the last hash is paired with itself, so level
/// `k + 1` always has `ceil(len(level k) / 2)` entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
    proofs: Vec<MerkleProof>,
}

/// Build a tree over pre-hashed leaves, in order
pub fn build_tree(hasher: &MerkleHasher, leaves: &[Hash]) -> Result<MerkleTree> {
    if leaves.is_empty() {
        return Err(Error::EmptyTree);
    }

    let mut levels = vec![leaves.to_vec()];
    let mut proofs: Vec<MerkleProof> = vec![Vec::new(); leaves.len()];
    // Position of each original leaf's ancestor within the current level
    let mut positions: Vec<usize> = (0..leaves.len()).collect();

    while levels[levels.len() - 1].len() > 1 {
        let current = &levels[levels.len() - 1];

        for (proof, pos) in proofs.iter_mut().zip(positions.iter_mut()) {
            let step = if *pos % 2 == 0 {
                // Unpaired last node is its own right sibling
                let sibling = current.get(*pos + 1).unwrap_or(&current[*pos]);
                ProofStep::new(*sibling, Direction::Right)
            } else {
                ProofStep::new(current[*pos - 1], Direction::Left)
            };
            proof.push(step);
            *pos /= 2;
        }

        let next: Vec<Hash> = current
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                hasher.node_hash(left, right)
            })
            .collect();
        levels.push(next);
    }

    let tree = MerkleTree { levels, proofs };
    tracing::debug!(
        leaves = leaves.len(),
        depth = tree.depth(),
        root = %tree.root().short(),
        algorithm = %hasher.algorithm(),
        "built merkle tree"
    );
    Ok(tree)
}

impl MerkleTree {
    /// Leaf-hash each entry, in order, then build the tree
    pub fn from_entries(hasher: &MerkleHasher, entries: &[Value]) -> Result<Self> {
        let leaves: Vec<Hash> = entries.iter().map(|e| hasher.leaf_hash(e)).collect();
        build_tree(hasher, &leaves)
    }

    pub fn root(&self) -> Hash {
        // build_tree guarantees a non-empty top level
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaves(&self) -> &[Hash] {
        &self.levels[0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of hashing rounds between a leaf and the root
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn levels(&self) -> &[Vec<Hash>] {
        &self.levels
    }

    /// Proof for the leaf at `index`, or `None` if out of range
    pub fn proof(&self, index: usize) -> Option<&MerkleProof> {
        self.proofs.get(index)
    }

    pub fn proofs(&self) -> &[MerkleProof] {
        &self.proofs
    }

    /// Split into root and proofs for storage
    pub fn into_parts(self) -> (Hash, Vec<Hash>, Vec<MerkleProof>) {
        let root = self.root();
        let mut levels = self.levels;
        let leaves = levels.swap_remove(0);
        (root, leaves, self.proofs)
    }
}
