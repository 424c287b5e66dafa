//! notary CLI - Command line interface for session_notary
//!
//! Canonicalizes and hashes log entries, builds merkle trees, verifies
//! inclusion proofs and manages a store of notarized sessions.
//!
//! JSON arguments may be given inline, as `@path/to/file.json`, or as `-` to
//! read standard input.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use session_notary::{
    canonicalize, HashAlgorithm, MerkleHasher, MerkleTree, Notary, NotaryConfig, RawProofStep,
    Verification,
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set once an argument has consumed standard input
static STDIN_TAKEN: AtomicBool = AtomicBool::new(false);

#[derive(Parser)]
#[command(name = "notary")]
#[command(about = "Merkle notarization of game session logs")]
#[command(version)]
struct Cli {
    /// Path to the session store file
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Hash algorithm: sha256, blake2b-256 or blake3
    #[arg(short, long, value_parser = parse_algorithm)]
    algorithm: Option<HashAlgorithm>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    // === Engine Commands ===
    /// Print the canonical form of a JSON value
    Canonicalize {
        /// JSON value, @file or -
        input: String,
    },

    /// Leaf-hash a JSON log entry
    LeafHash {
        /// JSON value, @file or -
        input: String,
    },

    /// Hash two hex digests into their parent node
    NodeHash {
        /// Left child (hex)
        left: String,
        /// Right child (hex)
        right: String,
    },

    /// Build a merkle tree over a JSON array of log entries
    Build {
        /// JSON array, @file or -
        input: String,
    },

    /// Verify an entry against a root with an inclusion proof
    Verify {
        /// The log entry (JSON value, @file or -)
        #[arg(short, long)]
        entry: String,
        /// Proof steps: JSON array of {"sibling", "direction"}, @file or -
        #[arg(short, long)]
        proof: String,
        /// Claimed root (hex)
        #[arg(short, long)]
        root: String,
    },

    // === Session Commands ===
    /// Manage notarized sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Notarize a new session log
    Submit {
        /// Session id
        id: String,
        /// JSON array of log entries, @file or -
        input: String,
    },

    /// Replace a session's log and rebuild its tree
    Recompute {
        /// Session id
        id: String,
        /// JSON array of log entries, @file or -
        input: String,
    },

    /// Show a stored session
    Show {
        /// Session id
        id: String,
    },

    /// List stored session ids
    List,

    /// Print the proof for one entry of a session
    Proof {
        /// Session id
        id: String,
        /// Entry index
        index: usize,
    },

    /// Verify an entry against a session's stored root
    Audit {
        /// Session id
        id: String,
        /// Entry index
        index: usize,
        /// The log entry (JSON value, @file or -)
        entry: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing(&cli.log_level);

    let needs_store = matches!(cli.command, Commands::Session { .. });
    let mut config = match NotaryConfig::load() {
        Ok(config) => config,
        // Engine commands never touch the store, so a broken config file
        // only costs them its algorithm setting
        Err(e) if !needs_store => {
            tracing::warn!(error = %e, "ignoring unusable config; using defaults");
            NotaryConfig::default()
        }
        Err(e) => return Err(e.into()),
    };
    if let Some(path) = &cli.store {
        config.store_path = path.clone();
    }
    if let Some(alg) = cli.algorithm {
        config.algorithm = alg;
    }
    let hasher = MerkleHasher::new(config.algorithm);

    match cli.command {
        Commands::Canonicalize { input } => {
            let value = read_json(&input)?;
            output(
                &cli.format,
                &serde_json::json!({ "canonical": canonicalize(&value) }),
            );
        }

        Commands::LeafHash { input } => {
            let value = read_json(&input)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "algorithm": config.algorithm.name(),
                    "leaf_hash": hasher.leaf_hash(&value).to_hex()
                }),
            );
        }

        Commands::NodeHash { left, right } => {
            let node = hasher.node_hash_hex(&left, &right)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "algorithm": config.algorithm.name(),
                    "node_hash": node
                }),
            );
        }

        Commands::Build { input } => {
            let entries = read_entries(&input)?;
            let tree = MerkleTree::from_entries(&hasher, &entries)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "algorithm": config.algorithm.name(),
                    "root": tree.root(),
                    "leaf_count": tree.leaf_count(),
                    "depth": tree.depth(),
                    "leaves": tree.leaves(),
                    "proofs": tree.proofs()
                }),
            );
        }

        Commands::Verify { entry, proof, root } => {
            let entry = read_json(&entry)?;
            let proof: Vec<RawProofStep> = serde_json::from_value(read_json(&proof)?)
                .context("proof must be an array of {\"sibling\", \"direction\"} objects")?;
            let result = session_notary::verify_submission(&hasher, &entry, &proof, &root);
            report_verification(&cli.format, &result);
        }

        Commands::Session { command } => {
            let notary = Notary::open(&config)?;
            run_session(&cli.format, &notary, command)?;
        }
    }

    Ok(())
}

fn run_session(
    format: &OutputFormat,
    notary: &Notary,
    command: SessionCommands,
) -> anyhow::Result<()> {
    match command {
        SessionCommands::Submit { id, input } => {
            let entries = read_entries(&input)?;
            let record = notary.submit(&id, &entries)?;
            output(
                format,
                &serde_json::json!({
                    "status": "ok",
                    "session": record.session_id,
                    "root": record.root,
                    "leaf_count": record.leaf_count(),
                    "revision": record.revision
                }),
            );
        }

        SessionCommands::Recompute { id, input } => {
            let entries = read_entries(&input)?;
            let record = notary.recompute(&id, &entries)?;
            output(
                format,
                &serde_json::json!({
                    "status": "ok",
                    "session": record.session_id,
                    "root": record.root,
                    "leaf_count": record.leaf_count(),
                    "revision": record.revision
                }),
            );
        }

        SessionCommands::Show { id } => match notary.session(&id)? {
            Some(record) => {
                output(
                    format,
                    &serde_json::json!({
                        "session": record.session_id,
                        "algorithm": record.algorithm.name(),
                        "root": record.root,
                        "revision": record.revision,
                        "created_at": record.created_at,
                        "updated_at": record.updated_at,
                        "entries": record.entries()?,
                        "leaf_hashes": record.leaf_hashes,
                        "proofs": record.proofs
                    }),
                );
            }
            None => {
                output(
                    format,
                    &serde_json::json!({
                        "status": "error",
                        "message": format!("Session not found: {}", id)
                    }),
                );
                std::process::exit(1);
            }
        },

        SessionCommands::List => {
            let sessions = notary.sessions()?;
            output(
                format,
                &serde_json::json!({
                    "count": sessions.len(),
                    "sessions": sessions
                }),
            );
        }

        SessionCommands::Proof { id, index } => {
            let proof = notary.proof(&id, index)?;
            output(
                format,
                &serde_json::json!({
                    "session": id,
                    "index": index,
                    "proof": proof
                }),
            );
        }

        SessionCommands::Audit { id, index, entry } => {
            let entry = read_json(&entry)?;
            let result = notary.audit_session(&id, index, &entry)?;
            report_verification(format, &result);
        }
    }

    Ok(())
}

/// Initialize the `tracing` subscriber on stderr.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the given level.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_algorithm(s: &str) -> Result<HashAlgorithm, String> {
    s.parse().map_err(|e: session_notary::Error| e.to_string())
}

/// Read a JSON argument: inline text, `@file`, or `-` for stdin
fn read_json(arg: &str) -> anyhow::Result<Value> {
    let text = if arg == "-" {
        if STDIN_TAKEN.swap(true, Ordering::SeqCst) {
            anyhow::bail!("Standard input (-) can only be used for one argument");
        }
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else if let Some(path) = arg.strip_prefix('@') {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
    } else {
        arg.to_string()
    };
    serde_json::from_str(&text).context("Invalid JSON input")
}

fn read_entries(arg: &str) -> anyhow::Result<Vec<Value>> {
    match read_json(arg)? {
        Value::Array(entries) => Ok(entries),
        _ => anyhow::bail!("Expected a JSON array of log entries"),
    }
}

/// Print a verification result; exits non-zero when not verified
fn report_verification(format: &OutputFormat, result: &Verification) {
    output(
        format,
        &serde_json::json!({
            "verified": result.verified,
            "computed_hash": result.computed_hash,
            "message": result.message
        }),
    );
    if !result.verified {
        std::process::exit(1);
    }
}

fn output(format: &OutputFormat, value: &Value) {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::Text => serde_json::to_string_pretty(value),
    };
    match rendered {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("failed to render output: {}", e),
    }
}
