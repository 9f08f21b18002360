//! Verification orchestrator.
//!
//! Runs the five checks over one certificate and emits one verdict per
//! check. The store check runs first because it produces the handles the
//! issuance and revocation checks query; the rest run concurrently and no
//! check's outcome gates another.

use crate::config::VerifierConfig;
use crate::error::{GatewayError, VerifyError};
use crate::gateway::{with_deadline, DocumentStoreGateway, NameResolver, StoreHandle};
use crate::identity::IssuerIdentityResolver;
use crate::report::{
    AnalyticsRecord, AnalyticsSink, ErrorKind, NoopAnalytics, TracingReporter, VerdictReporter,
};
use crate::signature::{DocumentHashCheck, SignatureHashVerifier};
use crate::verdict::{VerdictEvent, VerificationReport};
use futures::future::join_all;
use opencert_core::{Address, Certificate, CertificateData, IssuerRef};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info_span, Instrument};

/// Resolved document stores, one per issuer
pub type StoreHandles = Vec<Arc<dyn StoreHandle>>;

/// Sequences the verification checks over injected collaborators
///
/// # Panics
///
/// With a non-zero `call_timeout_ms` every external call runs under
/// `tokio::time::timeout`, so the checks panic unless polled on a Tokio
/// runtime with the time driver enabled.
pub struct VerificationOrchestrator {
    gateway: Arc<dyn DocumentStoreGateway>,
    identity: IssuerIdentityResolver,
    hash_verifier: SignatureHashVerifier,
    reporter: Arc<dyn VerdictReporter>,
    analytics: Arc<dyn AnalyticsSink>,
    config: VerifierConfig,
}

impl VerificationOrchestrator {
    /// Create an orchestrator with the default hash check, a tracing
    /// reporter, no analytics, and default configuration
    #[must_use]
    pub fn new(gateway: Arc<dyn DocumentStoreGateway>, names: Arc<dyn NameResolver>) -> Self {
        let config = VerifierConfig::default();
        Self {
            gateway,
            identity: IssuerIdentityResolver::new(names).with_timeout(config.call_timeout()),
            hash_verifier: SignatureHashVerifier::default(),
            reporter: Arc::new(TracingReporter),
            analytics: Arc::new(NoopAnalytics),
            config,
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: VerifierConfig) -> Self {
        self.identity = self.identity.with_timeout(config.call_timeout());
        self.config = config;
        self
    }

    /// Replace the content hash check
    #[must_use]
    pub fn with_hash_check(mut self, check: Arc<dyn DocumentHashCheck>) -> Self {
        self.hash_verifier = SignatureHashVerifier::new(check);
        self
    }

    /// Replace the verdict reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn VerdictReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replace the analytics sink
    #[must_use]
    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = analytics;
        self
    }

    /// Run every check and report each verdict in check order
    pub async fn verify(&self, certificate: &Certificate) -> VerificationReport {
        let span = info_span!("verify", certificate_id = certificate.id());
        async move {
            let data = &certificate.data;
            let stores = self.resolve_stores(certificate).await;

            let (issuer, hash, issued, revocation) = match &stores {
                Ok(handles) => {
                    futures::join!(
                        self.issuer_outcome(certificate),
                        async { self.hash_outcome(certificate) },
                        self.issued_outcome(certificate, handles),
                        self.revocation_outcome(certificate, handles),
                    )
                }
                // Without handles the store error stands in for both
                // store-backed verdicts.
                Err(err) => {
                    let (issuer, hash) = futures::join!(
                        self.issuer_outcome(certificate),
                        async { self.hash_outcome(certificate) },
                    );
                    (issuer, hash, Err(err.clone()), Err(err.clone()))
                }
            };

            let events = vec![
                VerdictEvent::store(stores.map(|handles| addresses(&handles))),
                VerdictEvent::issuer(issuer, data),
                VerdictEvent::hash(hash, data),
                VerdictEvent::issued(issued, data),
                VerdictEvent::revocation(revocation, data),
            ];
            for event in &events {
                self.emit(event, data);
            }

            VerificationReport::new(certificate.id().to_string(), events)
        }
        .instrument(span)
        .await
    }

    /// Locate and probe every issuer's document store
    ///
    /// # Errors
    ///
    /// Returns the first failing issuer's error, in issuer order
    pub async fn check_store(
        &self,
        certificate: &Certificate,
    ) -> Result<StoreHandles, VerifyError> {
        let outcome = self.resolve_stores(certificate).await;
        let event = VerdictEvent::store(
            outcome
                .as_ref()
                .map(|handles| addresses(handles))
                .map_err(|err| err.clone()),
        );
        self.emit(&event, &certificate.data);
        outcome
    }

    /// Resolve issuer identities
    ///
    /// # Errors
    ///
    /// Returns error if no identity resolves or a lookup faults
    pub async fn check_issuer(
        &self,
        certificate: &Certificate,
    ) -> Result<Vec<String>, VerifyError> {
        let outcome = self.issuer_outcome(certificate).await;
        let event = VerdictEvent::issuer(outcome.clone(), &certificate.data);
        self.emit(&event, &certificate.data);
        outcome
    }

    /// Check the content hash; returns whether it is valid
    pub fn check_hash(&self, certificate: &Certificate) -> bool {
        let outcome = self.hash_outcome(certificate);
        let valid = outcome.is_ok();
        self.emit(&VerdictEvent::hash(outcome, &certificate.data), &certificate.data);
        valid
    }

    /// Check the target hash is issued on every store; returns whether it is
    pub async fn check_issued(
        &self,
        certificate: &Certificate,
        stores: &[Arc<dyn StoreHandle>],
    ) -> bool {
        let outcome = self.issued_outcome(certificate, stores).await;
        let issued = outcome.is_ok();
        self.emit(&VerdictEvent::issued(outcome, &certificate.data), &certificate.data);
        issued
    }

    /// Check no store revokes any hash on the Merkle path; returns whether
    /// the certificate is unrevoked
    pub async fn check_not_revoked(
        &self,
        certificate: &Certificate,
        stores: &[Arc<dyn StoreHandle>],
    ) -> bool {
        let outcome = self.revocation_outcome(certificate, stores).await;
        let clear = outcome.is_ok();
        self.emit(&VerdictEvent::revocation(outcome, &certificate.data), &certificate.data);
        clear
    }

    fn emit(&self, event: &VerdictEvent, data: &CertificateData) {
        self.reporter.report(event);
        if event.is_ok() {
            return;
        }
        if let Some(kind) = ErrorKind::for_check(event.kind()) {
            self.analytics
                .record(AnalyticsRecord::new(&self.config.analytics_category, kind, data));
        }
    }

    async fn resolve_stores(&self, certificate: &Certificate) -> Result<StoreHandles, VerifyError> {
        let issuers = &certificate.data.issuers;
        if issuers.is_empty() {
            return Err(VerifyError::NoStores);
        }

        let timeout = self.config.call_timeout();
        let resolved = self
            .gather(issuers.iter().map(|issuer| {
                let store = &issuer.certificate_store;
                async move {
                    debug!(store = %store, "resolving document store");
                    let name = store.to_string();
                    let handle =
                        with_deadline(timeout, "resolveStore", self.gateway.resolve_store(store))
                            .await
                            .map_err(|err| VerifyError::from_resolution(&name, err))?;
                    with_deadline(timeout, "probe", handle.probe())
                        .await
                        .map_err(|err| VerifyError::from_resolution(&name, err))?;
                    Ok::<_, VerifyError>(handle)
                }
            }))
            .await;

        resolved.into_iter().collect()
    }

    async fn issuer_outcome(&self, certificate: &Certificate) -> Result<Vec<String>, VerifyError> {
        let refs: Vec<IssuerRef> = certificate
            .data
            .issuers
            .iter()
            .map(|issuer| issuer.certificate_store.clone())
            .collect();
        self.identity.resolve(&refs).await
    }

    fn hash_outcome(&self, certificate: &Certificate) -> Result<(), VerifyError> {
        if self.hash_verifier.verify(certificate) {
            Ok(())
        } else {
            Err(VerifyError::HashMismatch)
        }
    }

    async fn issued_outcome(
        &self,
        certificate: &Certificate,
        stores: &[Arc<dyn StoreHandle>],
    ) -> Result<(), VerifyError> {
        if stores.is_empty() {
            return Err(VerifyError::NoStores);
        }

        let target = certificate.target_hash();
        let answers = self
            .query_stores(stores, "isIssued", move |store| async move {
                store.is_issued(&target).await
            })
            .await;

        // A definite "not issued" outranks a fault on another store.
        if answers.iter().any(|answer| matches!(answer, Ok(false))) {
            return Err(VerifyError::NotIssued);
        }
        first_fault(answers)
    }

    async fn revocation_outcome(
        &self,
        certificate: &Certificate,
        stores: &[Arc<dyn StoreHandle>],
    ) -> Result<(), VerifyError> {
        if stores.is_empty() {
            return Err(VerifyError::NoStores);
        }

        // Every store clears a hash before the next one is asked about.
        for hash in certificate.hash_chain() {
            let answers = self
                .query_stores(stores, "isRevoked", move |store| async move {
                    store.is_revoked(&hash).await
                })
                .await;

            if answers.iter().any(|answer| matches!(answer, Ok(true))) {
                return Err(VerifyError::Revoked { hash });
            }
            first_fault(answers)?;
        }
        Ok(())
    }

    /// Ask every store the same question, each under the call deadline.
    async fn query_stores<'a, F, Fut>(
        &self,
        stores: &'a [Arc<dyn StoreHandle>],
        operation: &'static str,
        query: F,
    ) -> Vec<Result<bool, GatewayError>>
    where
        F: Fn(&'a Arc<dyn StoreHandle>) -> Fut,
        Fut: Future<Output = Result<bool, GatewayError>>,
    {
        let timeout = self.config.call_timeout();
        self.gather(stores.iter().map(|store| {
            debug!(operation, store = %store.address(), "querying document store");
            with_deadline(timeout, operation, query(store))
        }))
        .await
    }

    /// Await every future, concurrently or in order per configuration.
    /// Results keep input order either way.
    async fn gather<I, Fut, T>(&self, futures: I) -> Vec<T>
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = T>,
    {
        if self.config.concurrent_store_queries {
            join_all(futures).await
        } else {
            let mut results = Vec::new();
            for future in futures {
                results.push(future.await);
            }
            results
        }
    }
}

fn first_fault(answers: Vec<Result<bool, GatewayError>>) -> Result<(), VerifyError> {
    match answers.into_iter().find_map(Result::err) {
        Some(err) => Err(VerifyError::from_query(err)),
        None => Ok(()),
    }
}

fn addresses(handles: &[Arc<dyn StoreHandle>]) -> Vec<Address> {
    handles.iter().map(|handle| handle.address()).collect()
}
