//! Store creation and utility functions.

use std::path::PathBuf;

use tabula::{
    DocumentStore, StoreConfig,
    store::{InMemory, SqlStore},
};

use crate::cli::{Backend, BackendConfig};

const SQLITE_FILE: &str = "tabula.db";
const SNAPSHOT_FILE: &str = "tabula.json";

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

/// Human-readable description of the configured backend
pub fn backend_label(args: &BackendConfig) -> String {
    let data_dir = data_dir(args);
    match args.backend {
        Backend::Sqlite => format!("sqlite ({})", data_dir.join(SQLITE_FILE).display()),
        Backend::Postgres => match &args.postgres_url {
            Some(url) => format!("postgres ({})", redact_postgres_url(url)),
            None => "postgres".to_string(),
        },
        Backend::Inmemory => format!("inmemory ({})", data_dir.join(SNAPSHOT_FILE).display()),
    }
}

fn data_dir(args: &BackendConfig) -> PathBuf {
    args.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

/// A store opened from the command line.
///
/// The in-memory store is written back to its snapshot file on [`finish`].
///
/// [`finish`]: OpenedStore::finish
pub enum OpenedStore {
    Memory { store: InMemory, snapshot: PathBuf },
    Sql(SqlStore),
}

impl OpenedStore {
    pub fn store(&mut self) -> &mut dyn DocumentStore {
        match self {
            OpenedStore::Memory { store, .. } => store,
            OpenedStore::Sql(store) => store,
        }
    }

    /// Persist pending state and release the store.
    pub async fn finish(self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            OpenedStore::Memory { store, snapshot } => {
                store.save_to_file(&snapshot).await?;
                tracing::debug!("Saved snapshot to {}", snapshot.display());
            }
            OpenedStore::Sql(mut store) => store.close().await?,
        }
        Ok(())
    }
}

/// Open the store selected by the command line
pub async fn open_store(args: &BackendConfig) -> Result<OpenedStore, Box<dyn std::error::Error>> {
    let data_dir = data_dir(args);

    let config = match args.backend {
        Backend::Sqlite => {
            // Ensure data directory exists
            tokio::fs::create_dir_all(&data_dir).await?;
            let db_path = data_dir.join(SQLITE_FILE);
            tracing::info!("Using SQLite backend at {}", db_path.display());
            StoreConfig::sqlite(db_path)
        }
        Backend::Postgres => {
            let url = args
                .postgres_url
                .as_ref()
                .ok_or("PostgreSQL backend requires --postgres-url or TABULA_POSTGRES_URL")?;
            tracing::info!("Connecting to PostgreSQL at {}", redact_postgres_url(url));
            StoreConfig::postgres(url.clone())
        }
        Backend::Inmemory => {
            tokio::fs::create_dir_all(&data_dir).await?;
            let snapshot = data_dir.join(SNAPSHOT_FILE);
            tracing::info!(
                "Using in-memory backend with persistence at {}",
                snapshot.display()
            );
            let store = InMemory::load_from_file(&snapshot)
                .await?
                .with_write_format(args.format);
            return Ok(OpenedStore::Memory { store, snapshot });
        }
    };

    let config = config
        .with_table_prefix(args.table_prefix.clone())
        .with_format(args.format);
    match SqlStore::open(&config).await {
        Ok(store) => Ok(OpenedStore::Sql(store)),
        Err(e) => Err(format!("Failed to open {}: {e}", backend_label(args)).into()),
    }
}
