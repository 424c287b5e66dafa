//! Error types for session_notary

use thiserror::Error;

/// Result type alias for session_notary operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in session_notary operations
///
/// Proof verification never produces one of these: a malformed or forged
/// proof is reported as an unverified [`crate::Verification`] instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot build a merkle tree over zero leaves")]
    EmptyTree,

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session already exists: {0}")]
    SessionExists(String),

    #[error("Proof index {index} out of range (tree has {leaves} leaves)")]
    ProofIndexOutOfRange { index: usize, leaves: usize },

    #[error("Invalid store file: {0}")]
    InvalidFile(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Config error: {0}")]
    Config(String),
}
