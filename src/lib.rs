//! # session_notary
//!
//! Merkle notarization of game session logs.
//!
//! Every event in a session log is canonicalized (sorted-key JSON), hashed as
//! a domain-separated leaf, and reduced into a binary merkle tree. The root
//! commits to the whole log; each entry gets an inclusion proof that anyone
//! can check offline against that root.
//!
//! ## Core Concepts
//!
//! - **Leaves**: `H(0x00 || canonical_json(entry))`
//! - **Nodes**: `H(0x01 || left || right)`, odd levels duplicate their last hash
//! - **Proofs**: sibling hashes with the side they sit on, leaf-most first
//! - **Sessions**: a stored log with its root and proofs, keyed by session id
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use session_notary::{verify_proof, MerkleHasher, MerkleTree};
//!
//! let hasher = MerkleHasher::default();
//! let log = vec![
//!     json!({"type": "bet", "amount": 10}),
//!     json!({"type": "win", "amount": 15}),
//! ];
//! let tree = MerkleTree::from_entries(&hasher, &log)?;
//! let proof = tree.proof(1).unwrap();
//! assert!(verify_proof(&hasher, &log[1], proof, &tree.root()).verified);
//! # Ok::<(), session_notary::Error>(())
//! ```

pub mod canonical;
pub mod config;
pub mod hasher;
pub mod model;
pub mod store;
pub mod tree;
pub mod verify;

mod error;
mod notary;

pub use canonical::canonicalize;
pub use config::NotaryConfig;
pub use error::{Error, Result};
pub use hasher::{leaf_hash, node_hash, HashAlgorithm, MerkleHasher, LEAF_TAG, NODE_TAG};
pub use model::{
    Direction, Hash, LogEntry, MerkleProof, ProofStep, RawProofStep, SessionRecord, HASH_LEN,
};
pub use notary::Notary;
pub use store::{FileStore, MemoryStore, SessionStore};
pub use tree::{build_tree, MerkleTree};
pub use verify::{verify_proof, verify_submission, Verification};

/// Store file format version
pub const VERSION: u32 = 1;

/// Magic bytes for store file identification
pub const MAGIC: &[u8; 8] = b"NOTARYDB";
