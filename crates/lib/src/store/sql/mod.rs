//! SQL document store.
//!
//! [`SqlStore`] keeps every document as one row of a single table reached
//! through sqlx's `Any` driver, so the same code serves SQLite, PostgreSQL
//! and MySQL.
//!
//! ## Opening
//!
//! On open the store detects the [`Dialect`] from the connection (unless the
//! configuration names one), renders its statements, creates the table if a
//! probe query fails, and prepares every statement once. Multi-key reads and
//! removals are cut into batches of 1, 4, 11 or 51 keys so only four
//! statement shapes per operation ever reach the server.
//!
//! ## Writes
//!
//! Whether a write replaced an existing row is learned per dialect. MySQL
//! reports an upsert that updated a row as two affected rows. Other engines
//! run an update and, when it touched nothing, an insert inside one
//! transaction. `created_at` is only set by the insert.

pub mod dialect;
mod schema;
pub mod statements;

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use sqlx::{
    Any, AnyConnection, Connection, Row,
    any::{AnyArguments, AnyRow},
};
use tracing::{debug, info, warn};

pub use dialect::{Dialect, Placeholders, WriteStrategy};
pub use statements::{StatementTemplates, Statements};

use crate::{
    Result,
    clock::{Clock, SystemClock},
    codec::DocumentFormat,
    document::Document,
    store::{
        Backend, DocumentStore, RecordMetadata, StoreConfig, StoreError, WriteOutcome,
        batch::batches, distinct_keys, validate_key,
    },
};

/// Extension trait for sqlx Result types to simplify error handling.
///
/// Similar to `anyhow::Context`, this trait adds a method to convert
/// sqlx errors to `StoreError::SqlxError` with a context message.
pub(crate) trait SqlxResultExt<T> {
    /// Convert sqlx error to StoreError with context message.
    fn sql_context(self, context: &str) -> Result<T>;
}

impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn sql_context(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            StoreError::SqlxError {
                reason: format!("{context}: {e}"),
                source: Some(e),
            }
            .into()
        })
    }
}

type AnyQuery<'q> = sqlx::query::Query<'q, Any, AnyArguments<'q>>;

/// Column values of one row, in table column order.
#[derive(Clone, Copy)]
struct RowValues<'a> {
    key: &'a str,
    schema_key: Option<&'a str>,
    format: i64,
    now: i64,
    payload: &'a [u8],
}

impl<'a> RowValues<'a> {
    /// Bind for the insert and upsert statements.
    fn bind_insert(self, query: AnyQuery<'a>) -> AnyQuery<'a> {
        query
            .bind(self.key)
            .bind(self.schema_key)
            .bind(self.format)
            .bind(self.now)
            .bind(self.now)
            .bind(self.payload)
    }

    /// Bind for the update statement, which leaves `created_at` alone.
    fn bind_update(self, query: AnyQuery<'a>) -> AnyQuery<'a> {
        query
            .bind(self.schema_key)
            .bind(self.format)
            .bind(self.now)
            .bind(self.payload)
            .bind(self.key)
    }
}

/// Decode a `(doc_key, schema_key, format, payload)` row.
fn decode_row(row: &AnyRow) -> Result<Document> {
    let key: String = row.try_get(0).sql_context("Failed to read doc_key")?;
    let schema_key: Option<String> = row.try_get(1).sql_context("Failed to read schema_key")?;
    let code: i64 = row.try_get(2).sql_context("Failed to read format")?;
    let payload: Vec<u8> = row.try_get(3).sql_context("Failed to read payload")?;
    let format = DocumentFormat::from_code(code)?;
    Ok(format.decode(&key, &payload, schema_key)?)
}

/// Names the keys of a batch for error messages: `[a]`, or `[a .. z] (n keys)`.
fn describe_batch(batch: &[&str]) -> String {
    match batch {
        [] => "[]".to_string(),
        [only] => format!("[{only}]"),
        [first, .., last] => format!("[{first} .. {last}] ({} keys)", batch.len()),
    }
}

/// A document store over one SQL table.
pub struct SqlStore {
    conn: Option<AnyConnection>,
    dialect: Dialect,
    table: String,
    statements: Statements,
    format: DocumentFormat,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SqlStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlStore")
            .field("dialect", &self.dialect)
            .field("table", &self.table)
            .field("format", &self.format)
            .field("open", &self.conn.is_some())
            .finish()
    }
}

impl SqlStore {
    /// Connect to the database named by `config` and initialize the table.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let url = config
            .backend
            .connection_url()
            .ok_or_else(|| StoreError::InvalidConfig {
                reason: "the in-memory backend has no SQL connection".to_string(),
            })?;

        // Install any driver support
        sqlx::any::install_default_drivers();

        let mut conn = AnyConnection::connect(&url)
            .await
            .sql_context("Failed to connect to database")?;

        if url.starts_with("sqlite:") {
            configure_sqlite(&mut conn, url.contains("mode=memory")).await?;
        }

        Self::from_connection(conn, config).await
    }

    /// Connect to any database URL sqlx understands, with default settings.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::open(&StoreConfig::new(Backend::Url {
            url: url.to_string(),
        }))
        .await
    }

    /// Open a SQLite database file, creating it if missing.
    pub async fn open_sqlite<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::open(&StoreConfig::sqlite(path.as_ref())).await
    }

    /// Create a private in-memory SQLite database. Useful for testing.
    pub async fn sqlite_in_memory() -> Result<Self> {
        Self::open(&StoreConfig::sqlite_in_memory()).await
    }

    /// Initialize a store over an existing connection.
    pub async fn from_connection(mut conn: AnyConnection, config: &StoreConfig) -> Result<Self> {
        let backend_name = conn.backend_name().to_string();
        let dialect = match config.dialect {
            Some(dialect) => dialect,
            None => {
                let detected = Dialect::detect(&backend_name);
                info!(backend = %backend_name, %detected, "detected SQL dialect");
                detected
            }
        };

        let mut templates = StatementTemplates::for_dialect(dialect);
        templates.overlay(
            config
                .statement_overrides
                .iter()
                .map(|(name, sql)| (name.as_str(), sql.as_str())),
        );
        let table = config.table_name();
        let statements = Statements::render(&templates, &table, dialect)?;

        schema::ensure_table(&mut conn, &statements, &table, dialect).await?;
        schema::prepare_all(&mut conn, &statements).await?;

        Ok(Self {
            conn: Some(conn),
            dialect,
            table,
            statements,
            format: config.format,
            clock: Arc::new(SystemClock),
        })
    }

    /// Use `clock` for record timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Table name, prefix included.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The SQL this store runs.
    pub fn statements(&self) -> &Statements {
        &self.statements
    }

    /// Format used for new writes.
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    fn parts(&mut self) -> std::result::Result<(&mut AnyConnection, &Statements), StoreError> {
        let conn = self.conn.as_mut().ok_or(StoreError::Closed)?;
        Ok((conn, &self.statements))
    }
}

async fn configure_sqlite(conn: &mut AnyConnection, in_memory: bool) -> Result<()> {
    let pragmas = if in_memory {
        "PRAGMA busy_timeout = 5000;"
    } else {
        // WAL for concurrent readers; NORMAL sync is safe with WAL
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;"
    };
    sqlx::query(pragmas)
        .execute(&mut *conn)
        .await
        .sql_context("Failed to configure SQLite")?;
    Ok(())
}

async fn update_then_insert(
    conn: &mut AnyConnection,
    statements: &Statements,
    row: RowValues<'_>,
) -> Result<WriteOutcome> {
    let updated = row
        .bind_update(sqlx::query(&statements.update_document))
        .execute(&mut *conn)
        .await
        .sql_context(&format!("Failed to update document {}", row.key))?
        .rows_affected();
    if updated > 0 {
        return Ok(WriteOutcome::Overwritten);
    }

    row.bind_insert(sqlx::query(&statements.insert_document))
        .execute(&mut *conn)
        .await
        .sql_context(&format!("Failed to insert document {}", row.key))?;
    Ok(WriteOutcome::Inserted)
}

#[async_trait]
impl DocumentStore for SqlStore {
    async fn size(&mut self) -> Result<u64> {
        let (conn, statements) = self.parts()?;
        let row = sqlx::query(&statements.count_all_documents)
            .fetch_one(&mut *conn)
            .await
            .sql_context("Failed to count documents")?;
        let count: i64 = row.try_get(0).sql_context("Failed to read document count")?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn has(&mut self, key: &str) -> Result<bool> {
        let (conn, statements) = self.parts()?;
        let row = sqlx::query(&statements.has_document)
            .bind(key)
            .fetch_optional(&mut *conn)
            .await
            .sql_context(&format!("Failed to check document {key}"))?;
        Ok(row.is_some())
    }

    async fn read(&mut self, key: &str) -> Result<Document> {
        let (conn, statements) = self.parts()?;
        let row = sqlx::query(&statements.read_document)
            .bind(key)
            .fetch_optional(&mut *conn)
            .await
            .sql_context(&format!("Failed to read document {key}"))?;
        match row {
            Some(row) => decode_row(&row),
            None => Err(StoreError::DocumentNotFound {
                key: key.to_string(),
            }
            .into()),
        }
    }

    async fn read_multiple(&mut self, keys: &[String]) -> Result<Vec<Document>> {
        let (conn, statements) = self.parts()?;
        let keys = distinct_keys(keys);
        let mut documents = Vec::with_capacity(keys.len());
        for (shape, batch) in batches(&keys) {
            let mut query = sqlx::query(statements.read_batch(shape));
            for key in batch {
                query = query.bind(*key);
            }
            let rows = query.fetch_all(&mut *conn).await.sql_context(&format!(
                "Failed to read documents {}",
                describe_batch(batch)
            ))?;
            debug!(batch = shape.size(), found = rows.len(), "read batch");
            for row in &rows {
                documents.push(decode_row(row)?);
            }
        }
        Ok(documents)
    }

    async fn all_keys(&mut self) -> Result<Vec<String>> {
        let (conn, statements) = self.parts()?;
        let rows = sqlx::query(&statements.read_all_keys)
            .fetch_all(&mut *conn)
            .await
            .sql_context("Failed to list document keys")?;
        rows.iter()
            .map(|row| row.try_get::<String, _>(0).sql_context("Failed to read doc_key"))
            .collect()
    }

    async fn all_documents(&mut self) -> Result<Vec<Document>> {
        let (conn, statements) = self.parts()?;
        let rows = sqlx::query(&statements.read_all_documents)
            .fetch_all(&mut *conn)
            .await
            .sql_context("Failed to read all documents")?;
        rows.iter().map(decode_row).collect()
    }

    async fn metadata(&mut self, key: &str) -> Result<RecordMetadata> {
        let (conn, statements) = self.parts()?;
        let row = sqlx::query(&statements.read_metadata)
            .bind(key)
            .fetch_optional(&mut *conn)
            .await
            .sql_context(&format!("Failed to read metadata of {key}"))?
            .ok_or_else(|| StoreError::DocumentNotFound {
                key: key.to_string(),
            })?;
        Ok(RecordMetadata {
            schema_key: row.try_get(0).sql_context("Failed to read schema_key")?,
            format: row.try_get(1).sql_context("Failed to read format")?,
            created_at: row.try_get(2).sql_context("Failed to read created_at")?,
            modified_at: row.try_get(3).sql_context("Failed to read modified_at")?,
        })
    }

    async fn write(&mut self, document: &Document) -> Result<WriteOutcome> {
        validate_key(document.key())?;
        let payload = self.format.encode(document)?;
        let row = RowValues {
            key: document.key(),
            schema_key: document.schema_key(),
            format: self.format.code(),
            now: self.clock.now_timestamp(),
            payload: &payload,
        };
        let (conn, statements) = self.parts()?;

        let outcome = match statements.write_document.as_deref() {
            Some(upsert) => {
                let affected = row
                    .bind_insert(sqlx::query(upsert))
                    .execute(&mut *conn)
                    .await
                    .sql_context(&format!("Failed to write document {}", row.key))?
                    .rows_affected();
                WriteOutcome::from_upsert_rows(affected)
            }
            None => {
                let mut tx = conn
                    .begin()
                    .await
                    .sql_context("Failed to begin transaction")?;
                match update_then_insert(&mut *tx, statements, row).await {
                    Ok(outcome) => {
                        tx.commit()
                            .await
                            .sql_context("Failed to commit transaction")?;
                        outcome
                    }
                    Err(primary) => {
                        if let Err(secondary) = tx.rollback().await {
                            warn!(key = row.key, error = %secondary, "rollback failed after write error");
                        }
                        return Err(primary);
                    }
                }
            }
        };
        debug!(key = row.key, ?outcome, "wrote document");
        Ok(outcome)
    }

    async fn write_if_absent(&mut self, document: &Document) -> Result<bool> {
        validate_key(document.key())?;
        let payload = self.format.encode(document)?;
        let row = RowValues {
            key: document.key(),
            schema_key: document.schema_key(),
            format: self.format.code(),
            now: self.clock.now_timestamp(),
            payload: &payload,
        };
        let (conn, statements) = self.parts()?;
        let affected = row
            .bind_insert(sqlx::query(&statements.insert_if_absent))
            .execute(&mut *conn)
            .await
            .sql_context(&format!("Failed to insert document {}", row.key))?
            .rows_affected();
        debug!(key = row.key, inserted = affected > 0, "conditional insert");
        Ok(affected > 0)
    }

    async fn remove(&mut self, key: &str) -> Result<()> {
        let (conn, statements) = self.parts()?;
        sqlx::query(&statements.remove_document)
            .bind(key)
            .execute(&mut *conn)
            .await
            .sql_context(&format!("Failed to remove document {key}"))?;
        Ok(())
    }

    async fn remove_multiple(&mut self, keys: &[String]) -> Result<()> {
        let (conn, statements) = self.parts()?;
        let keys = distinct_keys(keys);
        for (shape, batch) in batches(&keys) {
            let mut query = sqlx::query(statements.remove_batch(shape));
            for key in batch {
                query = query.bind(*key);
            }
            let removed = query
                .execute(&mut *conn)
                .await
                .sql_context(&format!(
                    "Failed to remove documents {}",
                    describe_batch(batch)
                ))?
                .rows_affected();
            debug!(batch = shape.size(), removed, "removed batch");
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let Some(mut conn) = self.conn.take() else {
            return Err(StoreError::Closed.into());
        };
        let released = conn
            .clear_cached_statements()
            .await
            .sql_context("Failed to release prepared statements");
        let closed = conn
            .close()
            .await
            .sql_context("Failed to close connection");

        match (released, closed) {
            (Ok(()), Ok(())) => {
                info!(table = %self.table, "closed SQL store");
                Ok(())
            }
            (Err(primary), Err(secondary)) => {
                warn!(error = %secondary, "closing connection failed after statement release failed");
                Err(primary)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        }
    }
}
