//! Subcommand implementations and their terminal rendering.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use console::style;
use opencert_core::{build_chain, document_digest, Certificate, Hash, HashChain};
use opencert_verify::{
    MemoryLedger, TracingAnalytics, VerdictEvent, VerificationOrchestrator, VerificationReport,
    VerifierConfig,
};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Read and parse a certificate file
pub fn load_certificate(path: &Path) -> Result<Certificate> {
    let json = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("cannot read certificate {}", path.display()))?;
    Certificate::from_json(&json)
        .wrap_err_with(|| format!("malformed certificate {}", path.display()))
}

/// Run every check on the certificate at `certificate` against the ledger
/// snapshot at `ledger`
pub async fn verify(
    certificate: &Path,
    ledger: &Path,
    config: Option<&Path>,
) -> Result<VerificationReport> {
    let certificate = load_certificate(certificate)?;
    let ledger = Arc::new(MemoryLedger::from_file(ledger)?);
    let config = match config {
        Some(path) => VerifierConfig::from_file(path)?,
        None => VerifierConfig::default(),
    };
    info!(
        stores = ledger.stores.len(),
        registry = ledger.registry.len(),
        "ledger loaded"
    );

    let orchestrator = VerificationOrchestrator::new(ledger.clone(), ledger)
        .with_config(config)
        .with_analytics(Arc::new(TracingAnalytics));
    Ok(orchestrator.verify(&certificate).await)
}

/// One line per check, then the summary
pub fn render_report(report: &VerificationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Certificate {}", style(&report.certificate_id).bold());
    for event in &report.events {
        let _ = writeln!(
            out,
            "  {} {:<10} {}",
            status(event),
            event.kind(),
            event.message()
        );
    }
    let _ = writeln!(out, "{}", report.summary());
    out
}

fn status(event: &VerdictEvent) -> String {
    match event.error() {
        None => style("PASS").green().to_string(),
        Some(error) if error.is_infrastructure() => style("ERROR").yellow().to_string(),
        Some(_) => style("FAIL").red().to_string(),
    }
}

/// Recomputed hash state of one certificate
#[derive(Debug)]
pub struct Inspection {
    /// Canonical digest of the certificate data
    pub digest: Hash,
    /// Target hash declared by the signature
    pub target_hash: Hash,
    /// Chain from the declared target along the proof
    pub chain: HashChain,
    /// Merkle root declared by the signature
    pub merkle_root: Hash,
}

impl Inspection {
    /// Whether the digest and the proof both check out
    pub fn hash_valid(&self) -> bool {
        self.digest == self.target_hash && self.chain.reaches(&self.merkle_root)
    }

    /// Render for the terminal
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digest       {}", self.digest);
        let _ = writeln!(
            out,
            "target hash  {} {}",
            self.target_hash,
            verdict(self.digest == self.target_hash, "matches", "differs")
        );
        out.push_str(&render_chain_lines(&self.chain));
        let _ = writeln!(
            out,
            "merkle root  {} {}",
            self.merkle_root,
            verdict(self.chain.reaches(&self.merkle_root), "reached", "not reached")
        );
        out
    }
}

fn verdict(ok: bool, pass: &str, fail: &str) -> String {
    if ok {
        style(pass).green().to_string()
    } else {
        style(fail).red().to_string()
    }
}

/// Recompute the digest and Merkle path of the certificate at `path`
pub fn inspect(path: &Path) -> Result<Inspection> {
    let certificate = load_certificate(path)?;
    Ok(Inspection {
        digest: document_digest(&certificate.data)?,
        target_hash: certificate.target_hash(),
        chain: certificate.hash_chain(),
        merkle_root: certificate.merkle_root(),
    })
}

/// Render the chain built from `target` along `proof`, root last
pub fn render_chain(target: Hash, proof: &[Hash]) -> String {
    let chain = build_chain(target, proof);
    let mut out = render_chain_lines(&chain);
    let _ = writeln!(out, "root         {}", chain.root());
    out
}

fn render_chain_lines(chain: &HashChain) -> String {
    let mut out = String::new();
    for (step, hash) in chain.iter().enumerate() {
        let _ = writeln!(out, "chain[{}]     {}", step, hash);
    }
    out
}
