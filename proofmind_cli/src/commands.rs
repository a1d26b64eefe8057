use clap::{Parser, Subcommand, ValueEnum};
use proofmind_core::{CertificateCategory, ProviderKind};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "proofmind")]
#[command(about = "Issue and inspect ProofMind certificates on MultiversX")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PROOFMIND_CONFIG_PATH", default_value = "config.toml")]
    pub config: PathBuf,

    /// PEM file holding the signing key
    #[arg(short, long, env = "PROOFMIND_KEY_PATH", default_value = "wallet.pem")]
    pub key: PathBuf,

    /// Directory for the persisted wallet session
    #[arg(long, env = "PROOFMIND_SESSION_DIR", default_value = ".proofmind")]
    pub session_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Plain,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new signing key and write it as PEM
    NewKey {
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Connect the signing key and remember the session
    Connect {
        #[arg(short, long, default_value = "extension", value_parser = parse_kind)]
        provider: ProviderKind,
    },

    /// End the remembered session
    Disconnect,

    /// Show the remembered session and refreshed balance
    Status,

    /// Issue a new certificate
    Certify {
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: String,
        #[arg(long, value_parser = parse_category)]
        category: Option<CertificateCategory>,
        /// JSON document attached to the certificate
        #[arg(long)]
        metadata: Option<String>,
        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Wait for the transaction to finish
        #[arg(short, long)]
        wait: bool,
    },

    /// Update fields of an existing certificate. Fields are ordered text,
    /// category, metadata, tags; giving one requires all earlier ones.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long, value_parser = parse_category)]
        category: Option<CertificateCategory>,
        #[arg(long)]
        metadata: Option<String>,
        /// Replacement tag (repeatable). Omit to keep the current tags.
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(short, long)]
        wait: bool,
    },

    /// Fetch one certificate
    Get {
        id: String,
        /// Owner address; defaults to the connected wallet
        #[arg(long)]
        owner: Option<String>,
    },

    /// List an owner's certificates
    List {
        #[arg(long)]
        owner: Option<String>,
    },

    /// Dashboard counters and category breakdown for an owner
    Stats {
        #[arg(long)]
        owner: Option<String>,
    },

    /// Contract-wide certificate count, optionally for one category
    Total {
        #[arg(long, value_parser = parse_category)]
        category: Option<CertificateCategory>,
    },

    /// Check a transaction by hash
    TxStatus {
        hash: String,
        #[arg(short, long)]
        wait: bool,
    },
}

fn parse_kind(value: &str) -> Result<ProviderKind, String> {
    value.parse()
}

fn parse_category(value: &str) -> Result<CertificateCategory, String> {
    value.parse()
}
