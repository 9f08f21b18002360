//! Verdict events and the per-run report.

use crate::error::VerifyError;
use opencert_core::{Address, CertificateData, Hash};
use serde::Serialize;
use std::fmt;

/// The five independent checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Every issuer has a reachable document store
    Store,
    /// Issuers resolve to legible identities
    Issuer,
    /// Payload matches the signed target hash
    Hash,
    /// Every store records the target hash as issued
    Issued,
    /// No store revokes any hash on the Merkle path
    Revocation,
}

impl CheckKind {
    /// All checks in report order
    pub const ALL: [CheckKind; 5] = [
        Self::Store,
        Self::Issuer,
        Self::Hash,
        Self::Issued,
        Self::Revocation,
    ];

    /// Short lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Issuer => "issuer",
            Self::Hash => "hash",
            Self::Issued => "issued",
            Self::Revocation => "revocation",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Terminal outcome of one check. Failures snapshot the certificate data
/// so a reporter can render them without re-deriving state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerdictEvent {
    /// All issuer stores resolved and answered
    StoreOk {
        /// Resolved store addresses, in issuer order
        stores: Vec<Address>,
    },
    /// A store could not be resolved or queried
    StoreFail {
        /// What went wrong
        error: VerifyError,
    },
    /// Issuers resolved
    IssuerOk {
        /// Display names, address lookups first
        names: Vec<String>,
    },
    /// Issuer identity could not be established
    IssuerFail {
        /// What went wrong
        error: VerifyError,
        /// Certificate data snapshot
        certificate: CertificateData,
    },
    /// Content hash is valid
    HashOk,
    /// Content hash is invalid
    HashFail {
        /// What went wrong
        error: VerifyError,
        /// Certificate data snapshot
        certificate: CertificateData,
    },
    /// Issued on every store
    IssuedOk,
    /// Not issued on some store
    IssuedFail {
        /// What went wrong
        error: VerifyError,
        /// Certificate data snapshot
        certificate: CertificateData,
    },
    /// No hash on the path is revoked
    RevocationOk,
    /// Some hash on the path is revoked, or a store could not be read
    RevocationFail {
        /// What went wrong
        error: VerifyError,
        /// Certificate data snapshot
        certificate: CertificateData,
        /// The offending hash when a store reported one
        revoked_hash: Option<Hash>,
    },
}

impl VerdictEvent {
    /// Build the store verdict
    #[must_use]
    pub fn store(outcome: Result<Vec<Address>, VerifyError>) -> Self {
        match outcome {
            Ok(stores) => Self::StoreOk { stores },
            Err(error) => Self::StoreFail { error },
        }
    }

    /// Build the issuer verdict
    #[must_use]
    pub fn issuer(
        outcome: Result<Vec<String>, VerifyError>,
        certificate: &CertificateData,
    ) -> Self {
        match outcome {
            Ok(names) => Self::IssuerOk { names },
            Err(error) => Self::IssuerFail {
                error,
                certificate: certificate.clone(),
            },
        }
    }

    /// Build the hash verdict
    #[must_use]
    pub fn hash(outcome: Result<(), VerifyError>, certificate: &CertificateData) -> Self {
        match outcome {
            Ok(()) => Self::HashOk,
            Err(error) => Self::HashFail {
                error,
                certificate: certificate.clone(),
            },
        }
    }

    /// Build the issuance verdict
    #[must_use]
    pub fn issued(outcome: Result<(), VerifyError>, certificate: &CertificateData) -> Self {
        match outcome {
            Ok(()) => Self::IssuedOk,
            Err(error) => Self::IssuedFail {
                error,
                certificate: certificate.clone(),
            },
        }
    }

    /// Build the revocation verdict
    #[must_use]
    pub fn revocation(outcome: Result<(), VerifyError>, certificate: &CertificateData) -> Self {
        match outcome {
            Ok(()) => Self::RevocationOk,
            Err(error) => {
                let revoked_hash = match &error {
                    VerifyError::Revoked { hash } => Some(*hash),
                    _ => None,
                };
                Self::RevocationFail {
                    error,
                    certificate: certificate.clone(),
                    revoked_hash,
                }
            }
        }
    }

    /// Which check produced this event
    #[must_use]
    pub fn kind(&self) -> CheckKind {
        match self {
            Self::StoreOk { .. } | Self::StoreFail { .. } => CheckKind::Store,
            Self::IssuerOk { .. } | Self::IssuerFail { .. } => CheckKind::Issuer,
            Self::HashOk | Self::HashFail { .. } => CheckKind::Hash,
            Self::IssuedOk | Self::IssuedFail { .. } => CheckKind::Issued,
            Self::RevocationOk | Self::RevocationFail { .. } => CheckKind::Revocation,
        }
    }

    /// The failure, if this is a failure event
    #[must_use]
    pub fn error(&self) -> Option<&VerifyError> {
        match self {
            Self::StoreFail { error }
            | Self::IssuerFail { error, .. }
            | Self::HashFail { error, .. }
            | Self::IssuedFail { error, .. }
            | Self::RevocationFail { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Whether the check passed
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error().is_none()
    }

    /// Human-readable summary
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::StoreOk { stores } => format!("{} document store(s) found", stores.len()),
            Self::IssuerOk { names } => format!("Issued by {}", names.join(", ")),
            Self::HashOk => "Certificate data matches target hash".to_string(),
            Self::IssuedOk => "Certificate has been issued".to_string(),
            Self::RevocationOk => "Certificate has not been revoked".to_string(),
            failed => failed
                .error()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

/// Every verdict from one run, in check order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    /// ID of the verified certificate
    pub certificate_id: String,
    /// One event per check
    pub events: Vec<VerdictEvent>,
}

impl VerificationReport {
    /// Create a report
    #[must_use]
    pub fn new(certificate_id: String, events: Vec<VerdictEvent>) -> Self {
        Self {
            certificate_id,
            events,
        }
    }

    /// Whether every check passed
    #[must_use]
    pub fn valid(&self) -> bool {
        !self.events.is_empty() && self.events.iter().all(VerdictEvent::is_ok)
    }

    /// The event for one check
    #[must_use]
    pub fn event(&self, kind: CheckKind) -> Option<&VerdictEvent> {
        self.events.iter().find(|event| event.kind() == kind)
    }

    /// Failed events
    #[must_use]
    pub fn failures(&self) -> Vec<&VerdictEvent> {
        self.events.iter().filter(|event| !event.is_ok()).collect()
    }

    /// Get summary
    #[must_use]
    pub fn summary(&self) -> String {
        let passed = self.events.iter().filter(|event| event.is_ok()).count();
        format!(
            "Certificate {} {}: {}/{} checks passed",
            self.certificate_id,
            if self.valid() { "VALID" } else { "INVALID" },
            passed,
            self.events.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> CertificateData {
        CertificateData::new("cert-7")
    }

    #[test]
    fn test_revocation_fail_carries_hash() {
        let hash = Hash::compute(b"revoked");
        let event = VerdictEvent::revocation(Err(VerifyError::Revoked { hash }), &data());
        assert_eq!(event.kind(), CheckKind::Revocation);
        assert!(!event.is_ok());
        match event {
            VerdictEvent::RevocationFail {
                revoked_hash,
                certificate,
                ..
            } => {
                assert_eq!(revoked_hash, Some(hash));
                assert_eq!(certificate, data());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_revocation_fault_has_no_hash() {
        let event = VerdictEvent::revocation(
            Err(VerifyError::StoreQueryFault {
                message: "rpc down".into(),
            }),
            &data(),
        );
        assert!(matches!(
            event,
            VerdictEvent::RevocationFail {
                revoked_hash: None,
                ..
            }
        ));
        assert_eq!(event.message(), "rpc down");
    }

    #[test]
    fn test_messages() {
        let ok = VerdictEvent::issuer(Ok(vec!["A".into(), "B".into()]), &data());
        assert_eq!(ok.message(), "Issued by A, B");

        let fail = VerdictEvent::hash(Err(VerifyError::HashMismatch), &data());
        assert_eq!(fail.message(), "Certificate data does not match target hash");
    }

    #[test]
    fn test_report_validity() {
        let passing = VerificationReport::new(
            "cert-7".into(),
            vec![
                VerdictEvent::store(Ok(vec![])),
                VerdictEvent::HashOk,
                VerdictEvent::IssuedOk,
            ],
        );
        assert!(passing.valid());
        assert!(passing.summary().contains("VALID"));
        assert_eq!(passing.event(CheckKind::Hash), Some(&VerdictEvent::HashOk));
        assert!(passing.event(CheckKind::Revocation).is_none());

        let failing = VerificationReport::new(
            "cert-7".into(),
            vec![
                VerdictEvent::HashOk,
                VerdictEvent::issued(Err(VerifyError::NotIssued), &data()),
            ],
        );
        assert!(!failing.valid());
        assert_eq!(failing.failures().len(), 1);
        assert!(failing.summary().contains("1/2"));

        assert!(!VerificationReport::new("x".into(), vec![]).valid());
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(VerdictEvent::IssuedOk).unwrap();
        assert_eq!(json["type"], "issued_ok");

        let failed = VerdictEvent::issued(Err(VerifyError::NotIssued), &data());
        let json = serde_json::to_value(failed).unwrap();
        assert_eq!(json["type"], "issued_fail");
        assert_eq!(json["error"]["kind"], "not_issued");
        assert_eq!(json["certificate"]["id"], "cert-7");
    }
}
