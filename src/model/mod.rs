//! Core data model types for session_notary

mod hash;
mod proof;
mod session;

pub use hash::{Hash, HASH_LEN};
pub use proof::{Direction, MalformedStep, MerkleProof, ProofStep, RawProofStep};
pub use session::SessionRecord;

/// A notarized event: any JSON value
pub type LogEntry = serde_json::Value;
