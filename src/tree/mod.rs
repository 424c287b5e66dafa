//! Merkle tree construction

mod builder;

pub use builder::{build_tree, MerkleTree};
