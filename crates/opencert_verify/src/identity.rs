//! Issuer identity resolution.

use crate::error::VerifyError;
use crate::gateway::{with_deadline, NameResolver};
use opencert_core::{Address, IssuerRef};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Resolves a certificate's issuer identifiers into display names.
///
/// ENS names and addresses are each looked up in a single batch. Results
/// are returned address names first, then ENS names, each group in
/// certificate order.
#[derive(Clone)]
pub struct IssuerIdentityResolver {
    resolver: Arc<dyn NameResolver>,
    call_timeout: Option<Duration>,
}

impl IssuerIdentityResolver {
    /// Create a resolver with no call deadline
    #[must_use]
    pub fn new(resolver: Arc<dyn NameResolver>) -> Self {
        Self {
            resolver,
            call_timeout: None,
        }
    }

    /// Bound each batch lookup
    #[must_use]
    pub fn with_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Resolve `issuers` to display names
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::IssuerIdentityMissing`] if nothing resolves, or
    /// [`VerifyError::IdentityLookup`] if a lookup faults
    pub async fn resolve(&self, issuers: &[IssuerRef]) -> Result<Vec<String>, VerifyError> {
        let (ens_names, addresses) = partition(issuers);

        let mut ens_resolved = Vec::new();
        if !ens_names.is_empty() {
            debug!(count = ens_names.len(), "resolving ENS names");
            ens_resolved = with_deadline(
                self.call_timeout,
                "resolveEnsNamesToText",
                self.resolver.resolve_ens_batch(&ens_names),
            )
            .await
            .map_err(VerifyError::from_lookup)?;
        }

        let mut resolved = Vec::new();
        if !addresses.is_empty() {
            debug!(count = addresses.len(), "looking up issuer addresses");
            resolved = with_deadline(
                self.call_timeout,
                "lookupEthereumAddresses",
                self.resolver.resolve_address_batch(&addresses),
            )
            .await
            .map_err(VerifyError::from_lookup)?;
        }

        resolved.extend(ens_resolved);
        if resolved.is_empty() {
            return Err(VerifyError::IssuerIdentityMissing);
        }
        Ok(resolved)
    }
}

fn partition(issuers: &[IssuerRef]) -> (Vec<String>, Vec<Address>) {
    let mut ens_names = Vec::new();
    let mut addresses = Vec::new();
    for issuer in issuers {
        match issuer {
            IssuerRef::EnsName(name) => ens_names.push(name.clone()),
            IssuerRef::EthereumAddress(address) => addresses.push(*address),
        }
    }
    (ens_names, addresses)
}
