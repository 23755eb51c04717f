//! Store configuration.
//!
//! A [`StoreConfig`] picks the backend and tunes the SQL adapter. It
//! deserializes from any serde format:
//!
//! ```
//! use tabula::store::{Backend, StoreConfig};
//!
//! let config: StoreConfig = serde_json::from_str(r#"{
//!     "backend": { "type": "sqlite", "path": "/tmp/docs.db" },
//!     "table_prefix": "APP_",
//!     "format": "cbor"
//! }"#)?;
//! assert_eq!(config.table_name(), "APP_CONTENT_STORE");
//! assert!(matches!(config.backend, Backend::Sqlite { .. }));
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{codec::DocumentFormat, constants::CONTENT_TABLE, store::sql::Dialect};

/// Where documents live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Backend {
    /// Records in process memory, lost on drop.
    #[default]
    InMemory,
    /// A SQLite database private to the connection, lost on close.
    SqliteInMemory,
    /// A SQLite database file, created if missing.
    Sqlite { path: PathBuf },
    /// A PostgreSQL server.
    Postgres { url: String },
    /// Any database URL sqlx understands.
    Url { url: String },
}

impl Backend {
    /// The sqlx connection URL, or `None` for the in-memory store.
    pub fn connection_url(&self) -> Option<String> {
        match self {
            Backend::InMemory => None,
            // Unique name per call so two stores never share a database
            Backend::SqliteInMemory => Some(format!(
                "sqlite:file:tabula_{}?mode=memory&cache=shared",
                uuid::Uuid::new_v4().simple()
            )),
            Backend::Sqlite { path } => Some(format!("sqlite:{}?mode=rwc", path.display())),
            Backend::Postgres { url } | Backend::Url { url } => Some(url.clone()),
        }
    }
}

/// Everything needed to open a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: Backend,
    /// Prepended to the table name.
    pub table_prefix: String,
    /// Skip detection and use this dialect's statements.
    pub dialect: Option<Dialect>,
    /// Format used for new writes. Reads follow each record's own code.
    pub format: DocumentFormat,
    /// Statement templates by name, applied over the dialect defaults.
    pub statement_overrides: BTreeMap<String, String>,
}

impl StoreConfig {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Backend::InMemory)
    }

    pub fn sqlite_in_memory() -> Self {
        Self::new(Backend::SqliteInMemory)
    }

    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self::new(Backend::Sqlite { path: path.into() })
    }

    pub fn postgres(url: impl Into<String>) -> Self {
        Self::new(Backend::Postgres { url: url.into() })
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Replace the template `name` with `sql`.
    pub fn with_statement(mut self, name: impl Into<String>, sql: impl Into<String>) -> Self {
        self.statement_overrides.insert(name.into(), sql.into());
        self
    }

    /// The full table name, prefix included.
    pub fn table_name(&self) -> String {
        format!("{}{CONTENT_TABLE}", self.table_prefix)
    }
}
