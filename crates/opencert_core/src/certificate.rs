//! Certificates: a document payload plus the Merkle signature over it.

use crate::address::IssuerRef;
use crate::chain::{build_chain, HashChain};
use crate::digest::document_digest;
use crate::error::CoreResult;
use crate::hash::Hash;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Signature type tag written by certificate issuers
pub const MERKLE_PROOF_TYPE: &str = "SHA3MerkleProof";

/// A signed certificate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    /// The certificate payload
    pub data: CertificateData,
    /// Merkle signature over the payload
    pub signature: MerkleSignature,
}

impl Certificate {
    /// Create a new certificate
    #[must_use]
    pub fn new(data: CertificateData, signature: MerkleSignature) -> Self {
        Self { data, signature }
    }

    /// Sign `data` as a leaf whose path to the root runs through `proof`.
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be encoded for hashing
    pub fn seal(data: CertificateData, proof: Vec<Hash>) -> CoreResult<Self> {
        let target_hash = document_digest(&data)?;
        let merkle_root = build_chain(target_hash, &proof).root();
        Ok(Self {
            data,
            signature: MerkleSignature::new(target_hash, proof, merkle_root),
        })
    }

    /// Certificate ID, empty if the issuer did not set one
    #[must_use]
    pub fn id(&self) -> &str {
        self.data.id.as_deref().unwrap_or("")
    }

    /// The leaf hash this certificate claims
    #[must_use]
    pub fn target_hash(&self) -> Hash {
        self.signature.target_hash
    }

    /// Merkle siblings, leaf to root
    #[must_use]
    pub fn proof(&self) -> &[Hash] {
        &self.signature.proof
    }

    /// Declared Merkle root
    #[must_use]
    pub fn merkle_root(&self) -> Hash {
        self.signature.merkle_root
    }

    /// Path from the target hash to the reconstructed root
    #[must_use]
    pub fn hash_chain(&self) -> HashChain {
        build_chain(self.signature.target_hash, &self.signature.proof)
    }

    /// Get the certificate as JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse certificate from JSON
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The certificate payload that the target hash commits to
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CertificateData {
    /// Certificate ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Issuers, in certificate order
    #[serde(default)]
    pub issuers: Vec<Issuer>,
    /// All other document fields, hashed but not interpreted
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CertificateData {
    /// Create an empty payload with the given ID
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            issuers: Vec::new(),
            fields: Map::new(),
        }
    }

    /// Add an issuer
    #[must_use]
    pub fn with_issuer(mut self, issuer: Issuer) -> Self {
        self.issuers.push(issuer);
        self
    }

    /// Add a document field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Identity string of the first issuer, if any
    #[must_use]
    pub fn first_issuer_identity(&self) -> Option<String> {
        self.issuers
            .first()
            .map(|issuer| issuer.certificate_store.to_string())
    }
}

/// One issuer named by a certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    /// Display name the issuer gave itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Where the issuer's document store lives
    pub certificate_store: IssuerRef,
}

impl Issuer {
    /// Create an issuer with only a store reference
    #[must_use]
    pub fn new(certificate_store: IssuerRef) -> Self {
        Self {
            name: None,
            certificate_store,
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Merkle proof signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleSignature {
    /// Signature type, normally [`MERKLE_PROOF_TYPE`]
    #[serde(rename = "type")]
    pub kind: String,
    /// Leaf hash of the document
    pub target_hash: Hash,
    /// Sibling hashes from leaf to root
    #[serde(default)]
    pub proof: Vec<Hash>,
    /// Root of the batch the document was issued in
    pub merkle_root: Hash,
}

impl MerkleSignature {
    /// Create a new signature of the default type
    #[must_use]
    pub fn new(target_hash: Hash, proof: Vec<Hash>, merkle_root: Hash) -> Self {
        Self {
            kind: MERKLE_PROOF_TYPE.to_string(),
            target_hash,
            proof,
            merkle_root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use serde_json::json;

    fn sample_data() -> CertificateData {
        CertificateData::new("certificate-id")
            .with_issuer(Issuer::new(IssuerRef::EthereumAddress(
                Address::from_hex("0xd2536C3cc7eb51447F6dA8d60Ba6344A79590b4F").unwrap(),
            )))
            .with_field("recipient", json!({ "name": "Jane Tan" }))
    }

    #[test]
    fn test_seal_is_self_consistent() {
        let proof = vec![Hash::compute(b"p0"), Hash::compute(b"p1")];
        let cert = Certificate::seal(sample_data(), proof.clone()).unwrap();

        assert_eq!(cert.target_hash(), document_digest(&cert.data).unwrap());
        assert_eq!(cert.proof(), proof.as_slice());
        assert_eq!(cert.hash_chain().len(), 3);
        assert!(cert.hash_chain().reaches(&cert.merkle_root()));
        assert_eq!(cert.signature.kind, MERKLE_PROOF_TYPE);
    }

    #[test]
    fn test_certificate_to_from_json() {
        let cert = Certificate::seal(sample_data(), vec![]).unwrap();
        let json = cert.to_json().unwrap();
        assert!(json.contains("\"certificateStore\""));
        assert!(json.contains("\"targetHash\""));
        assert!(json.contains("\"merkleRoot\""));

        let restored = Certificate::from_json(&json).unwrap();
        assert_eq!(restored, cert);
        assert_eq!(restored.id(), "certificate-id");
    }

    #[test]
    fn test_parse_published_shape() {
        let json = json!({
            "data": {
                "id": "abc",
                "issuers": [
                    { "name": "GovTech", "certificateStore": "govtech.sg.opencerts.eth" },
                    { "certificateStore": "0x007d40224f6562461633ccfbaffd359ebb2fc9ba" }
                ],
                "course": "Rust"
            },
            "signature": {
                "type": "SHA3MerkleProof",
                "targetHash": "f7432b3219b2aa4122e289f44901830fa32f224ee9dfce28565677f1d279b2c7",
                "merkleRoot": "0xf7432b3219b2aa4122e289f44901830fa32f224ee9dfce28565677f1d279b2c7"
            }
        });

        let cert: Certificate = serde_json::from_value(json).unwrap();
        assert_eq!(cert.data.issuers.len(), 2);
        assert_eq!(cert.data.issuers[0].name.as_deref(), Some("GovTech"));
        assert!(cert.data.issuers[1].certificate_store.as_address().is_some());
        assert_eq!(cert.data.fields.get("course"), Some(&json!("Rust")));
        assert!(cert.proof().is_empty());
        assert_eq!(cert.target_hash(), cert.merkle_root());
    }

    #[test]
    fn test_invalid_json() {
        assert!(Certificate::from_json("{").is_err());
    }

    #[test]
    fn test_first_issuer_identity() {
        assert_eq!(
            sample_data().first_issuer_identity().as_deref(),
            Some("0xd2536c3cc7eb51447f6da8d60ba6344a79590b4f")
        );
        assert_eq!(CertificateData::default().first_issuer_identity(), None);
    }
}
