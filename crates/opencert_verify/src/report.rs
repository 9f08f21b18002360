//! Verdict sinks: reporters and analytics.

use crate::verdict::{CheckKind, VerdictEvent};
use opencert_core::CertificateData;
use serde::Serialize;
use std::sync::Mutex;
use tracing::{info, warn};

/// Default analytics category
pub const CERTIFICATE_ERROR: &str = "CERTIFICATE_ERROR";

/// Receives verdict events in emission order
pub trait VerdictReporter: Send + Sync {
    /// Handle one event
    fn report(&self, event: &VerdictEvent);
}

/// Writes each verdict as a structured log line
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl VerdictReporter for TracingReporter {
    fn report(&self, event: &VerdictEvent) {
        match event.error() {
            None => info!(check = %event.kind(), detail = %event.message(), "check passed"),
            Some(error) => warn!(
                check = %event.kind(),
                infrastructure = error.is_infrastructure(),
                detail = %error,
                "check failed"
            ),
        }
    }
}

/// Keeps every event it is given
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<VerdictEvent>>,
}

impl CollectingReporter {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far
    #[must_use]
    pub fn events(&self) -> Vec<VerdictEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl VerdictReporter for CollectingReporter {
    fn report(&self, event: &VerdictEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Failure categories recorded by analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum ErrorKind {
    /// Issuer identity failure
    Issuer = 0,
    /// Content hash failure
    Hash = 1,
    /// Issuance failure
    Issued = 2,
    /// Revocation failure
    Revocation = 3,
}

impl ErrorKind {
    /// Category for a check, if that check is tracked
    #[must_use]
    pub fn for_check(kind: CheckKind) -> Option<Self> {
        match kind {
            CheckKind::Issuer => Some(Self::Issuer),
            CheckKind::Hash => Some(Self::Hash),
            CheckKind::Issued => Some(Self::Issued),
            CheckKind::Revocation => Some(Self::Revocation),
            CheckKind::Store => None,
        }
    }
}

/// One telemetry record for a failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsRecord {
    /// Fixed category label
    pub category: String,
    /// Identity string of the first issuer
    pub action: String,
    /// Certificate ID
    pub label: String,
    /// [`ErrorKind`] discriminant
    pub value: u8,
}

impl AnalyticsRecord {
    /// Build the record for a failure on `certificate`
    #[must_use]
    pub fn new(category: &str, kind: ErrorKind, certificate: &CertificateData) -> Self {
        Self {
            category: category.to_string(),
            action: certificate.first_issuer_identity().unwrap_or_default(),
            label: certificate.id.clone().unwrap_or_default(),
            value: kind as u8,
        }
    }
}

/// Fire-and-forget telemetry; must never block or fail a run
pub trait AnalyticsSink: Send + Sync {
    /// Record one failure
    fn record(&self, record: AnalyticsRecord);
}

/// Discards every record
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn record(&self, _record: AnalyticsRecord) {}
}

/// Logs records at info level under the `analytics` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn record(&self, record: AnalyticsRecord) {
        info!(
            target: "analytics",
            category = %record.category,
            action = %record.action,
            label = %record.label,
            value = record.value,
            "send event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VerifyError;
    use opencert_core::{Issuer, IssuerRef};

    const ISSUER: &str = "0xd2536C3cc7eb51447F6dA8d60Ba6344A79590b4F";

    fn data() -> CertificateData {
        CertificateData::new("certificate-id")
            .with_issuer(Issuer::new(IssuerRef::parse(ISSUER).unwrap()))
            .with_issuer(Issuer::new(IssuerRef::parse("second.eth").unwrap()))
    }

    #[test]
    fn test_error_kind_values() {
        assert_eq!(ErrorKind::Issuer as u8, 0);
        assert_eq!(ErrorKind::Hash as u8, 1);
        assert_eq!(ErrorKind::Issued as u8, 2);
        assert_eq!(ErrorKind::Revocation as u8, 3);
        assert_eq!(ErrorKind::for_check(CheckKind::Store), None);
    }

    #[test]
    fn test_record_keyed_by_first_issuer() {
        for (kind, value) in [
            (ErrorKind::Issuer, 0),
            (ErrorKind::Hash, 1),
            (ErrorKind::Issued, 2),
            (ErrorKind::Revocation, 3),
        ] {
            let record = AnalyticsRecord::new(CERTIFICATE_ERROR, kind, &data());
            assert_eq!(
                record,
                AnalyticsRecord {
                    category: "CERTIFICATE_ERROR".into(),
                    action: ISSUER.to_lowercase(),
                    label: "certificate-id".into(),
                    value,
                }
            );
        }
    }

    #[test]
    fn test_record_without_issuers() {
        let record = AnalyticsRecord::new("X", ErrorKind::Hash, &CertificateData::default());
        assert_eq!(record.action, "");
        assert_eq!(record.label, "");
    }

    #[test]
    fn test_collecting_reporter_keeps_order() {
        let reporter = CollectingReporter::new();
        reporter.report(&VerdictEvent::HashOk);
        reporter.report(&VerdictEvent::issued(Err(VerifyError::NotIssued), &data()));
        let events = reporter.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], VerdictEvent::HashOk);
        assert_eq!(events[1].kind(), CheckKind::Issued);
    }

    #[test]
    fn test_tracing_sinks_do_not_panic_without_subscriber() {
        TracingReporter.report(&VerdictEvent::RevocationOk);
        TracingReporter.report(&VerdictEvent::hash(Err(VerifyError::HashMismatch), &data()));
        TracingAnalytics.record(AnalyticsRecord::new(CERTIFICATE_ERROR, ErrorKind::Hash, &data()));
        NoopAnalytics.record(AnalyticsRecord::new(CERTIFICATE_ERROR, ErrorKind::Hash, &data()));
    }
}
