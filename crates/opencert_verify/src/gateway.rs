//! External collaborators: document stores and name resolution.

use crate::error::GatewayError;
use async_trait::async_trait;
use opencert_core::{Address, Hash, IssuerRef};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Read-only view of one issuer's on-chain document store
#[async_trait]
pub trait StoreHandle: Send + Sync {
    /// Contract address of the store
    fn address(&self) -> Address;

    /// Whether the store records `hash` as issued
    ///
    /// # Errors
    ///
    /// Returns error if the read fails
    async fn is_issued(&self, hash: &Hash) -> Result<bool, GatewayError>;

    /// Whether the store records `hash` as revoked
    ///
    /// # Errors
    ///
    /// Returns error if the read fails
    async fn is_revoked(&self, hash: &Hash) -> Result<bool, GatewayError>;

    /// Minimal proof that a document store answers at this address.
    ///
    /// Defaults to a throwaway `is_issued` read of the zero hash.
    ///
    /// # Errors
    ///
    /// Returns error if the contract does not answer as a document store
    async fn probe(&self) -> Result<(), GatewayError> {
        self.is_issued(&Hash::zero()).await.map(|_| ())
    }
}

/// Locates document stores from issuer identifiers
#[async_trait]
pub trait DocumentStoreGateway: Send + Sync {
    /// Resolve an address, or an ENS name pointing at one, to a store
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StoreUnresolved`] if no store can be located
    async fn resolve_store(
        &self,
        store: &IssuerRef,
    ) -> Result<Arc<dyn StoreHandle>, GatewayError>;
}

/// Turns issuer identifiers into display names, one batch per kind
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve ENS names to their text records
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ResolutionFault`] if the lookup fails
    async fn resolve_ens_batch(&self, names: &[String]) -> Result<Vec<String>, GatewayError>;

    /// Look addresses up in the issuer registry
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ResolutionFault`] if the lookup fails
    async fn resolve_address_batch(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<String>, GatewayError>;
}

/// Await `call`, failing with [`GatewayError::Timeout`] once `limit` passes.
pub(crate) async fn with_deadline<T, F>(
    limit: Option<Duration>,
    operation: &str,
    call: F,
) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match limit {
        None => call.await,
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| {
                Err(GatewayError::Timeout {
                    operation: operation.to_string(),
                    millis: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })
            }),
    }
}
