//! In-memory ledger snapshot.
//!
//! Stands in for the chain and the name registries: document stores with
//! their issued and revoked hashes, ENS records, and the issuer registry.
//! Loadable from JSON so a verification can be replayed offline.

use crate::config::{read_file, ConfigError};
use crate::error::GatewayError;
use crate::gateway::{DocumentStoreGateway, NameResolver, StoreHandle};
use async_trait::async_trait;
use indexmap::IndexMap;
use opencert_core::{Address, Hash, IssuerRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// State of one document store contract
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreRecord {
    /// Hashes recorded as issued
    pub issued: BTreeSet<Hash>,
    /// Hashes recorded as revoked
    pub revoked: BTreeSet<Hash>,
}

/// Snapshot of stores and name records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoryLedger {
    /// Document stores by contract address
    pub stores: IndexMap<Address, StoreRecord>,
    /// ENS name to address records
    pub ens_addresses: IndexMap<String, Address>,
    /// ENS name to display text records
    pub ens_text: IndexMap<String, String>,
    /// Issuer registry names by address
    pub registry: IndexMap<Address, String>,
}

impl MemoryLedger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy an empty store at `address`
    #[must_use]
    pub fn with_store(mut self, address: Address) -> Self {
        self.stores.entry(address).or_default();
        self
    }

    /// Record `hash` as issued by the store at `address`
    #[must_use]
    pub fn issue(mut self, address: Address, hash: Hash) -> Self {
        self.stores.entry(address).or_default().issued.insert(hash);
        self
    }

    /// Record `hash` as revoked by the store at `address`
    #[must_use]
    pub fn revoke(mut self, address: Address, hash: Hash) -> Self {
        self.stores.entry(address).or_default().revoked.insert(hash);
        self
    }

    /// Point an ENS name at `address` with display `text`
    #[must_use]
    pub fn with_ens_name(mut self, name: &str, address: Address, text: &str) -> Self {
        self.ens_addresses.insert(name.to_string(), address);
        self.ens_text.insert(name.to_string(), text.to_string());
        self
    }

    /// Register an issuer name for `address`
    #[must_use]
    pub fn register(mut self, address: Address, name: &str) -> Self {
        self.registry.insert(address, name.to_string());
        self
    }

    /// Parse a ledger snapshot
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a ledger snapshot file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&read_file(path.as_ref())?)
    }
}

/// A store handle backed by a ledger snapshot
#[derive(Debug, Clone)]
pub struct LedgerStore {
    address: Address,
    record: StoreRecord,
}

#[async_trait]
impl StoreHandle for LedgerStore {
    fn address(&self) -> Address {
        self.address
    }

    async fn is_issued(&self, hash: &Hash) -> Result<bool, GatewayError> {
        Ok(self.record.issued.contains(hash))
    }

    async fn is_revoked(&self, hash: &Hash) -> Result<bool, GatewayError> {
        Ok(self.record.revoked.contains(hash))
    }
}

#[async_trait]
impl DocumentStoreGateway for MemoryLedger {
    async fn resolve_store(
        &self,
        store: &IssuerRef,
    ) -> Result<Arc<dyn StoreHandle>, GatewayError> {
        let address = match store {
            IssuerRef::EthereumAddress(address) => *address,
            IssuerRef::EnsName(name) => *self.ens_addresses.get(name).ok_or_else(|| {
                GatewayError::StoreUnresolved {
                    store: name.clone(),
                    reason: "ENS name has no address record".to_string(),
                }
            })?,
        };

        let record = self
            .stores
            .get(&address)
            .ok_or_else(|| GatewayError::StoreUnresolved {
                store: store.to_string(),
                reason: format!("no document store contract at {}", address),
            })?;

        Ok(Arc::new(LedgerStore {
            address,
            record: record.clone(),
        }))
    }
}

#[async_trait]
impl NameResolver for MemoryLedger {
    async fn resolve_ens_batch(&self, names: &[String]) -> Result<Vec<String>, GatewayError> {
        Ok(names
            .iter()
            .filter_map(|name| self.ens_text.get(name).cloned())
            .collect())
    }

    async fn resolve_address_batch(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<String>, GatewayError> {
        Ok(addresses
            .iter()
            .filter_map(|address| self.registry.get(address).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_address() -> Address {
        Address::from_hex("0x007d40224f6562461633ccfbaffd359ebb2fc9ba").unwrap()
    }

    #[tokio::test]
    async fn test_resolve_store_by_address() {
        let target = Hash::compute(b"doc");
        let ledger = MemoryLedger::new().issue(store_address(), target);

        let store = ledger
            .resolve_store(&IssuerRef::EthereumAddress(store_address()))
            .await
            .unwrap();
        assert_eq!(store.address(), store_address());
        assert!(store.is_issued(&target).await.unwrap());
        assert!(!store.is_revoked(&target).await.unwrap());
        assert!(store.probe().await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_store_by_ens_name() {
        let ledger = MemoryLedger::new()
            .with_store(store_address())
            .with_ens_name("govtech.opencerts.eth", store_address(), "GovTech");

        let store = ledger
            .resolve_store(&IssuerRef::parse("govtech.opencerts.eth").unwrap())
            .await
            .unwrap();
        assert_eq!(store.address(), store_address());
    }

    #[tokio::test]
    async fn test_unknown_store_is_unresolved() {
        let ledger = MemoryLedger::new();
        let err = ledger
            .resolve_store(&IssuerRef::EthereumAddress(store_address()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, GatewayError::StoreUnresolved { .. }));

        let err = ledger
            .resolve_store(&IssuerRef::parse("nobody.eth").unwrap())
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("nobody.eth"));
    }

    #[tokio::test]
    async fn test_name_batches_skip_unknown_entries() {
        let ledger = MemoryLedger::new()
            .with_ens_name("a.eth", store_address(), "Issuer A")
            .register(store_address(), "Registry A");

        let names = ledger
            .resolve_ens_batch(&["a.eth".to_string(), "b.eth".to_string()])
            .await
            .unwrap();
        assert_eq!(names, vec!["Issuer A".to_string()]);

        let names = ledger
            .resolve_address_batch(&[Address::from_bytes([1u8; 20]), store_address()])
            .await
            .unwrap();
        assert_eq!(names, vec!["Registry A".to_string()]);
    }

    #[test]
    fn test_json_snapshot() {
        let json = r#"{
            "stores": {
                "0x007d40224f6562461633ccfbaffd359ebb2fc9ba": {
                    "issued": [
                        "0x1111111111111111111111111111111111111111111111111111111111111111"
                    ],
                    "revoked": []
                }
            },
            "ensText": { "govtech.opencerts.eth": "GovTech" },
            "registry": {
                "0x007d40224f6562461633ccfbaffd359ebb2fc9ba": "Government Technology Agency"
            }
        }"#;

        let ledger = MemoryLedger::from_json(json).unwrap();
        assert_eq!(ledger.stores.len(), 1);
        assert_eq!(ledger.stores[&store_address()].issued.len(), 1);
        assert!(ledger.ens_addresses.is_empty());
        assert_eq!(
            ledger.registry.get(&store_address()).map(String::as_str),
            Some("Government Technology Agency")
        );

        let encoded = serde_json::to_string(&ledger).unwrap();
        assert_eq!(MemoryLedger::from_json(&encoded).unwrap(), ledger);
    }
}
