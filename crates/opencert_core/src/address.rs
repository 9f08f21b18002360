//! Ethereum addresses and issuer identifiers.

use crate::error::{CoreError, CoreResult};
use crate::hash::decode_exact;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 20-byte Ethereum account or contract address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// The number of bytes in an address
    pub const LEN: usize = 20;

    /// Create from bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get as bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse a `0x`-prefixed, 40 digit hex address (any case)
    ///
    /// # Errors
    ///
    /// Returns error if the prefix is missing, hex is invalid, or not 20 bytes
    pub fn from_hex(input: &str) -> CoreResult<Self> {
        let digits = input
            .strip_prefix("0x")
            .or_else(|| input.strip_prefix("0X"))
            .ok_or_else(|| CoreError::MissingPrefix {
                input: input.to_string(),
            })?;
        Ok(Self(decode_exact::<20>(digits, input, "address")?))
    }

    /// Lowercase `0x`-prefixed rendering
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_hex()
    }
}

/// How a certificate names one of its issuers' document stores.
///
/// Anything that parses as an address is an address; every other
/// non-empty string is treated as an ENS name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IssuerRef {
    /// Human-readable ENS name, e.g. `govtech.sg.opencerts.eth`
    EnsName(String),
    /// Raw chain address
    EthereumAddress(Address),
}

impl IssuerRef {
    /// Classify an identifier string
    ///
    /// # Errors
    ///
    /// Returns error if the identifier is empty
    pub fn parse(input: &str) -> CoreResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyIdentifier);
        }
        Ok(match Address::from_hex(trimmed) {
            Ok(address) => Self::EthereumAddress(address),
            Err(_) => Self::EnsName(trimmed.to_string()),
        })
    }

    /// The address, if this is an address reference
    #[must_use]
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Self::EthereumAddress(address) => Some(address),
            Self::EnsName(_) => None,
        }
    }

    /// The ENS name, if this is a name reference
    #[must_use]
    pub fn as_ens_name(&self) -> Option<&str> {
        match self {
            Self::EnsName(name) => Some(name),
            Self::EthereumAddress(_) => None,
        }
    }
}

impl fmt::Display for IssuerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnsName(name) => write!(f, "{}", name),
            Self::EthereumAddress(address) => write!(f, "{}", address),
        }
    }
}

impl FromStr for IssuerRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IssuerRef {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IssuerRef> for String {
    fn from(issuer: IssuerRef) -> Self {
        issuer.to_string()
    }
}

impl From<Address> for IssuerRef {
    fn from(address: Address) -> Self {
        Self::EthereumAddress(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0xd2536C3cc7eb51447F6dA8d60Ba6344A79590b4F";

    #[test]
    fn test_address_parse_is_case_insensitive() {
        let address = Address::from_hex(CHECKSUMMED).unwrap();
        assert_eq!(address.to_hex(), CHECKSUMMED.to_lowercase());
        assert_eq!(Address::from_hex(&CHECKSUMMED.to_lowercase()).unwrap(), address);
        let upper_prefix = format!("0X{}", &CHECKSUMMED[2..]);
        assert_eq!(Address::from_hex(&upper_prefix).unwrap(), address);
    }

    #[test]
    fn test_address_requires_prefix() {
        let err = Address::from_hex(&CHECKSUMMED[2..]).unwrap_err();
        assert!(matches!(err, CoreError::MissingPrefix { .. }));
    }

    #[test]
    fn test_address_wrong_length() {
        let err = Address::from_hex("0xd2536c3c").unwrap_err();
        assert!(matches!(err, CoreError::InvalidLength { expected: 20, .. }));
    }

    #[test]
    fn test_issuer_ref_classifies_addresses() {
        let issuer = IssuerRef::parse(CHECKSUMMED).unwrap();
        assert!(issuer.as_address().is_some());
        assert!(issuer.as_ens_name().is_none());
    }

    #[test]
    fn test_issuer_ref_classifies_ens_names() {
        let issuer = IssuerRef::parse("govtech-test.sg.opencerts.eth").unwrap();
        assert_eq!(issuer.as_ens_name(), Some("govtech-test.sg.opencerts.eth"));

        // Almost an address is still a name.
        let issuer = IssuerRef::parse("0xd2536C3cc7eb").unwrap();
        assert!(matches!(issuer, IssuerRef::EnsName(_)));
    }

    #[test]
    fn test_issuer_ref_rejects_empty() {
        assert_eq!(IssuerRef::parse("  "), Err(CoreError::EmptyIdentifier));
    }

    #[test]
    fn test_issuer_ref_serde_string_form() {
        let issuer: IssuerRef = serde_json::from_str(&format!("\"{}\"", CHECKSUMMED)).unwrap();
        let json = serde_json::to_string(&issuer).unwrap();
        assert_eq!(json, format!("\"{}\"", CHECKSUMMED.to_lowercase()));
    }
}
