//! Certificate verification for OpenCert.
//!
//! This crate checks a certificate against the document stores and name
//! registries it points at. Every external read goes through an injected
//! trait object, so a run can be replayed against canned answers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod ledger;
pub mod orchestrator;
pub mod report;
pub mod signature;
pub mod verdict;

pub use config::{ConfigError, VerifierConfig};
pub use error::{GatewayError, VerifyError};
pub use gateway::{DocumentStoreGateway, NameResolver, StoreHandle};
pub use identity::IssuerIdentityResolver;
pub use ledger::{MemoryLedger, StoreRecord};
pub use orchestrator::{StoreHandles, VerificationOrchestrator};
pub use report::{
    AnalyticsRecord, AnalyticsSink, CollectingReporter, ErrorKind, NoopAnalytics,
    TracingAnalytics, TracingReporter, VerdictReporter,
};
pub use signature::{DocumentHashCheck, MerkleDocumentHashCheck, SignatureHashVerifier};
pub use verdict::{CheckKind, VerdictEvent, VerificationReport};
