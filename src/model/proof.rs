//! Inclusion proof types

use super::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the running hash a proof sibling sits on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The sibling is the left child: `parent = node(sibling, running)`
    Left,
    /// The sibling is the right child: `parent = node(running, sibling)`
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Parse the wire form. Only the exact lowercase words are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a merkle proof
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub sibling: Hash,
    pub direction: Direction,
}

impl ProofStep {
    pub fn new(sibling: Hash, direction: Direction) -> Self {
        ProofStep { sibling, direction }
    }
}

/// Ordered proof steps, leaf-most sibling first
pub type MerkleProof = Vec<ProofStep>;

/// A proof step as submitted by an untrusted client
///
/// Nothing is validated at deserialization time so that a bad step can be
/// reported as a failed verification rather than a parse error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProofStep {
    #[serde(default)]
    pub sibling: String,
    #[serde(default)]
    pub direction: String,
}

/// Why a submitted proof step could not be used
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MalformedStep {
    Direction(String),
    Sibling(String),
}

impl fmt::Display for MalformedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedStep::Direction(d) => write!(f, "invalid direction {:?}", d),
            MalformedStep::Sibling(s) => write!(f, "invalid sibling hash {:?}", s),
        }
    }
}

impl RawProofStep {
    pub fn new(sibling: impl Into<String>, direction: impl Into<String>) -> Self {
        RawProofStep {
            sibling: sibling.into(),
            direction: direction.into(),
        }
    }

    /// Validate into a typed step
    pub fn parse(&self) -> Result<ProofStep, MalformedStep> {
        let direction = Direction::parse(&self.direction)
            .ok_or_else(|| MalformedStep::Direction(self.direction.clone()))?;
        let sibling = Hash::from_hex(&self.sibling)
            .map_err(|_| MalformedStep::Sibling(self.sibling.clone()))?;
        Ok(ProofStep { sibling, direction })
    }
}

impl From<&ProofStep> for RawProofStep {
    fn from(step: &ProofStep) -> Self {
        RawProofStep {
            sibling: step.sibling.to_hex(),
            direction: step.direction.as_str().to_string(),
        }
    }
}
