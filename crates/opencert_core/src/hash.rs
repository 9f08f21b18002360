//! Keccak-256 hashes for document digests and Merkle paths.
//!
//! Hashes render as `0x`-prefixed lowercase hex, the form document stores
//! are queried with.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// A Keccak-256 hash (256 bits / 32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hash([u8; 32]);

impl Hash {
    /// The number of bytes in a hash
    pub const LEN: usize = 32;

    /// Compute Keccak-256 hash of data
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        let mut out = [0u8; 32];
        out.copy_from_slice(&Keccak256::digest(data));
        Self(out)
    }

    /// The all-zero hash
    #[must_use]
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Create from bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get as bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to `0x`-prefixed lowercase hex
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, with or without the `0x` prefix
    ///
    /// # Errors
    ///
    /// Returns error if hex is invalid or not 32 bytes
    pub fn from_hex(input: &str) -> CoreResult<Self> {
        let digits = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .unwrap_or(input);
        let bytes = decode_exact::<32>(digits, input, "hash")?;
        Ok(Self(bytes))
    }

    /// Combine two sibling hashes into their parent.
    ///
    /// Operands are sorted bytewise before hashing, so
    /// `a.combine(&b) == b.combine(&a)`.
    #[must_use]
    pub fn combine(&self, other: &Hash) -> Self {
        let (first, second) = if self <= other { (self, other) } else { (other, self) };
        let mut combined = [0u8; 64];
        combined[..32].copy_from_slice(&first.0);
        combined[32..].copy_from_slice(&second.0);
        Self::compute(&combined)
    }
}

/// Decode hex digits into exactly `N` bytes.
pub(crate) fn decode_exact<const N: usize>(
    digits: &str,
    original: &str,
    kind: &'static str,
) -> CoreResult<[u8; N]> {
    let bytes = hex::decode(digits).map_err(|_| CoreError::InvalidHex {
        input: original.to_string(),
    })?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| CoreError::InvalidLength {
        kind,
        expected: N,
        actual,
    })
}

impl Default for Hash {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Hash {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Hash> for String {
    fn from(hash: Hash) -> Self {
        hash.to_hex()
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}
