//! Fixed-size digest type shared by leaves, nodes and roots

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Length in bytes of every digest the engine produces
pub const HASH_LEN: usize = 32;

/// A 32-byte digest: a leaf hash, an internal node hash or a merkle root
///
/// Serializes as lowercase hex in human-readable formats (JSON) and as raw
/// bytes otherwise (bincode).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; HASH_LEN]);

impl Hash {
    /// Create a hash from raw bytes
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Hash(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Convert to lowercase hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    ///
    /// Accepts either case; anything that does not decode to exactly
    /// [`HASH_LEN`] bytes is rejected.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != HASH_LEN {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; HASH_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Hash(arr))
    }

    /// Get a short prefix for display (first 8 chars)
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.short())
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::str::FromStr for Hash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Hash::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <[u8; HASH_LEN]>::deserialize(deserializer)?;
            Ok(Hash(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Hash {
        let mut bytes = [0u8; HASH_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        Hash::from_bytes(bytes)
    }

    #[test]
    fn test_hash_hex_is_lowercase() {
        let h = Hash::from_bytes([0xAB; HASH_LEN]);
        assert_eq!(h.to_hex(), "ab".repeat(HASH_LEN));
    }

    #[test]
    fn test_hash_from_hex_accepts_uppercase() {
        let h = Hash::from_hex(&"AB".repeat(HASH_LEN)).unwrap();
        assert_eq!(h, Hash::from_bytes([0xab; HASH_LEN]));
    }

    #[test]
    fn test_hash_from_hex_rejects_wrong_length() {
        assert!(Hash::from_hex("abcd").is_err());
        assert!(Hash::from_hex(&"00".repeat(HASH_LEN + 1)).is_err());
        assert!(Hash::from_hex(&"zz".repeat(HASH_LEN)).is_err());
    }

    #[test]
    fn test_hash_json_is_hex_string() {
        let h = sample();
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", h.to_hex()));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn test_hash_bincode_is_raw_bytes() {
        let h = sample();
        let encoded = bincode::serialize(&h).unwrap();
        assert_eq!(encoded.len(), HASH_LEN);
        let back: Hash = bincode::deserialize(&encoded).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn test_hash_short() {
        assert_eq!(sample().short(), "00010203");
    }
}
