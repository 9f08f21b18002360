//! Content hash verification.

use opencert_core::{document_digest, Certificate};
use std::sync::Arc;

/// Cryptographic check that a certificate's payload reproduces its
/// declared Merkle root
pub trait DocumentHashCheck: Send + Sync {
    /// Whether the payload hashes to the target and the proof reaches the root
    fn verify_document_hash(&self, certificate: &Certificate) -> bool;
}

/// Recomputes the canonical digest and walks the proof.
#[derive(Debug, Clone, Copy, Default)]
pub struct MerkleDocumentHashCheck;

impl DocumentHashCheck for MerkleDocumentHashCheck {
    fn verify_document_hash(&self, certificate: &Certificate) -> bool {
        let digest_matches = document_digest(&certificate.data)
            .map(|digest| digest == certificate.target_hash())
            .unwrap_or(false);
        digest_matches && certificate.hash_chain().reaches(&certificate.merkle_root())
    }
}

/// Validates a certificate's embedded content hash
#[derive(Clone)]
pub struct SignatureHashVerifier {
    check: Arc<dyn DocumentHashCheck>,
}

impl SignatureHashVerifier {
    /// Create a verifier over a hash check
    #[must_use]
    pub fn new(check: Arc<dyn DocumentHashCheck>) -> Self {
        Self { check }
    }

    /// Whether the certificate is hash-valid
    #[must_use]
    pub fn verify(&self, certificate: &Certificate) -> bool {
        self.check.verify_document_hash(certificate)
    }
}

impl Default for SignatureHashVerifier {
    fn default() -> Self {
        Self::new(Arc::new(MerkleDocumentHashCheck))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencert_core::{CertificateData, Hash, Issuer, IssuerRef};
    use serde_json::json;

    fn sealed(proof: Vec<Hash>) -> Certificate {
        let data = CertificateData::new("cert-1")
            .with_issuer(Issuer::new(IssuerRef::parse("issuer.opencerts.eth").unwrap()))
            .with_field("name", json!("Jane"));
        Certificate::seal(data, proof).unwrap()
    }

    #[test]
    fn test_sealed_certificate_verifies() {
        let verifier = SignatureHashVerifier::default();
        assert!(verifier.verify(&sealed(vec![])));
        assert!(verifier.verify(&sealed(vec![Hash::compute(b"p0"), Hash::compute(b"p1")])));
    }

    #[test]
    fn test_tampered_data_fails() {
        let mut cert = sealed(vec![Hash::compute(b"p0")]);
        cert.data = cert.data.with_field("name", json!("Mallory"));
        assert!(!SignatureHashVerifier::default().verify(&cert));
    }

    #[test]
    fn test_wrong_root_fails() {
        let mut cert = sealed(vec![Hash::compute(b"p0")]);
        cert.signature.merkle_root = Hash::compute(b"other root");
        assert!(!SignatureHashVerifier::default().verify(&cert));
    }

    #[test]
    fn test_delegates_to_injected_check() {
        struct Always(bool);
        impl DocumentHashCheck for Always {
            fn verify_document_hash(&self, _certificate: &Certificate) -> bool {
                self.0
            }
        }

        let mut cert = sealed(vec![]);
        cert.signature.merkle_root = Hash::compute(b"garbage");
        assert!(SignatureHashVerifier::new(Arc::new(Always(true))).verify(&cert));
        assert!(!SignatureHashVerifier::new(Arc::new(Always(false))).verify(&sealed(vec![])));
    }
}
