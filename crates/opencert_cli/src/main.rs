//! OpenCert CLI
//!
//! Verifies certificate files against a ledger snapshot and inspects
//! their Merkle proofs.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use opencert_core::Hash;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "opencert=info,analytics=info";

#[derive(Parser)]
#[command(name = "opencert")]
#[command(version, about = "OpenCert certificate verifier", long_about = None)]
struct Cli {
    /// Write logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a certificate against a ledger snapshot
    Verify {
        /// Path to certificate JSON
        #[arg(short, long)]
        certificate: PathBuf,
        /// Path to ledger snapshot JSON
        #[arg(short, long)]
        ledger: PathBuf,
        /// Path to verifier config JSON
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recompute a certificate's digest and Merkle path
    Digest {
        /// Path to certificate JSON
        #[arg(short, long)]
        certificate: PathBuf,
    },
    /// Build the hash chain for a target and proof
    Chain {
        /// Target hash
        #[arg(short, long)]
        target: Hash,
        /// Proof hashes, in order
        #[arg(short, long, num_args = 0..)]
        proof: Vec<Hash>,
    },
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::Verify {
            certificate,
            ledger,
            config,
            json,
        } => {
            let report = commands::verify(&certificate, &ledger, config.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", commands::render_report(&report));
            }
            Ok(exit_code(report.valid()))
        }
        Commands::Digest { certificate } => {
            let inspection = commands::inspect(&certificate)?;
            print!("{}", inspection.render());
            Ok(exit_code(inspection.hash_valid()))
        }
        Commands::Chain { target, proof } => {
            print!("{}", commands::render_chain(target, &proof));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
