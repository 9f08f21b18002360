//! OpenCert Core Types
//!
//! This crate contains pure types and logic with no I/O.
//! Hashes, addresses and certificates serialize to the same JSON shape the
//! certificate issuers publish.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod certificate;
pub mod chain;
pub mod digest;
pub mod error;
pub mod hash;

// Re-exports
pub use address::{Address, IssuerRef};
pub use certificate::{Certificate, CertificateData, Issuer, MerkleSignature};
pub use chain::{build_chain, HashChain};
pub use digest::document_digest;
pub use error::{CoreError, CoreResult};
pub use hash::Hash;
