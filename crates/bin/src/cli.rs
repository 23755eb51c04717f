//! CLI argument definitions for the Tabula binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tabula::DocumentFormat;

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// SQLite database file (default)
    Sqlite,
    /// PostgreSQL database
    Postgres,
    /// In-memory with a JSON snapshot file
    Inmemory,
}

/// Tabula document store
#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(about = "Tabula: JSON documents in a relational table")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub backend_config: BackendConfig,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where documents live. Shared by every command.
#[derive(Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "TABULA_BACKEND", global = true)]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores tabula.db
    /// For InMemory: stores tabula.json
    #[arg(short = 'D', long, env = "TABULA_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "TABULA_POSTGRES_URL", global = true)]
    pub postgres_url: Option<String>,

    /// Prefix for the document table name
    #[arg(long, default_value = "", env = "TABULA_TABLE_PREFIX", global = true)]
    pub table_prefix: String,

    /// Payload format for new writes (json or cbor)
    #[arg(long, default_value = "json", env = "TABULA_FORMAT", global = true)]
    pub format: DocumentFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a document
    Get {
        key: String,
    },
    /// Store a document, replacing any existing one
    Put(PutArgs),
    /// Store a document only if the key is unused
    PutNew(PutArgs),
    /// Merge a JSON object into a stored document
    Merge {
        key: String,
        /// JSON object to merge in
        content: String,
    },
    /// Remove documents
    Rm {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// List stored keys with their metadata
    Keys,
    /// Print the number of stored documents
    Count,
    /// Print the value at a dotted path inside a document
    At {
        key: String,
        /// Dotted path, e.g. `address.city` or `items.0.sku`
        path: String,
    },
    /// Show backend details
    Info,
}

/// Arguments for the put commands
#[derive(Args, Debug)]
pub struct PutArgs {
    pub key: String,

    /// JSON object to store
    pub content: String,

    /// Schema key recorded with the document
    #[arg(short, long)]
    pub schema: Option<String>,
}
