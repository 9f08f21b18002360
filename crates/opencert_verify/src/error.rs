//! Verification error types.
//!
//! [`GatewayError`] is what collaborators return. [`VerifyError`] is what a
//! check reports: substantive negatives carry fixed messages, while faults
//! pass the collaborator's message through.

use opencert_core::Hash;
use serde::Serialize;

/// Message for a certificate whose issuers resolve to no identity
pub const ISSUER_IDENTITY_MISSING: &str = "Issuer identity missing in certificate";

/// Failure of an external lookup or store read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum GatewayError {
    /// Name or registry lookup failed
    #[error("{0}")]
    ResolutionFault(String),

    /// No document store could be located for an identifier
    #[error("Document store {store} could not be resolved: {reason}")]
    StoreUnresolved {
        /// The identifier that was looked up
        store: String,
        /// Why it failed
        reason: String,
    },

    /// A store read failed in transport or backend
    #[error("{0}")]
    QueryFault(String),

    /// A call exceeded its deadline
    #[error("{operation} timed out after {millis}ms")]
    Timeout {
        /// Name of the call
        operation: String,
        /// Deadline that was exceeded
        millis: u64,
    },
}

/// Outcome of a failed verification check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerifyError {
    /// No issuer resolved to a legible identity
    #[error("Issuer identity missing in certificate")]
    IssuerIdentityMissing,

    /// Name or registry lookup fault
    #[error("{message}")]
    IdentityLookup {
        /// Underlying fault message
        message: String,
    },

    /// Document digest or Merkle path does not match the signature
    #[error("Certificate data does not match target hash")]
    HashMismatch,

    /// At least one store does not record the target hash as issued
    #[error("Certificate has not been issued")]
    NotIssued,

    /// A store flags a hash on the certificate's Merkle path
    #[error("Certificate has been revoked, revoked hash: {hash}")]
    Revoked {
        /// The first flagged hash
        hash: Hash,
    },

    /// An issuer's document store cannot be located or is not a store
    #[error("Document store {store} could not be resolved: {reason}")]
    StoreUnresolved {
        /// The issuer's store identifier
        store: String,
        /// Why it failed
        reason: String,
    },

    /// Certificate names no issuers, so there is nothing to query
    #[error("Certificate does not name any document store")]
    NoStores,

    /// Transport or backend fault while reading a store
    #[error("{message}")]
    StoreQueryFault {
        /// Underlying fault message
        message: String,
    },
}

impl VerifyError {
    /// Whether this is an infrastructure fault rather than a verdict on
    /// the certificate itself
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::IdentityLookup { .. } | Self::StoreQueryFault { .. }
        )
    }

    /// Map a name resolver failure
    #[must_use]
    pub fn from_lookup(err: GatewayError) -> Self {
        Self::IdentityLookup {
            message: err.to_string(),
        }
    }

    /// Map a store read failure
    #[must_use]
    pub fn from_query(err: GatewayError) -> Self {
        Self::StoreQueryFault {
            message: err.to_string(),
        }
    }

    /// Map a failure while locating `store`
    #[must_use]
    pub fn from_resolution(store: &str, err: GatewayError) -> Self {
        match err {
            GatewayError::StoreUnresolved { reason, .. } => Self::StoreUnresolved {
                store: store.to_string(),
                reason,
            },
            GatewayError::QueryFault(reason) => Self::StoreUnresolved {
                store: store.to_string(),
                reason,
            },
            other => Self::StoreQueryFault {
                message: format!("{}: {}", store, other),
            },
        }
    }
}
