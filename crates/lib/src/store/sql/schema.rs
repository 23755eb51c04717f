//! Table bootstrap.
//!
//! The content table is probed with a query that returns no rows. If the
//! probe fails the table is assumed missing and created. Every statement the
//! store runs is then prepared once, which both checks the SQL against the
//! live schema and warms the connection's statement cache.

use sqlx::{AnyConnection, Executor};
use tracing::{debug, info};

use super::{SqlxResultExt, dialect::Dialect, statements::Statements};
use crate::{Result, store::StoreError};

/// Probe for the table and create it when absent. Returns whether it was
/// created.
pub async fn ensure_table(
    conn: &mut AnyConnection,
    statements: &Statements,
    table: &str,
    dialect: Dialect,
) -> Result<bool> {
    if sqlx::query(&statements.table_exists)
        .execute(&mut *conn)
        .await
        .is_ok()
    {
        debug!(table, "content table present");
        return Ok(false);
    }

    info!(table, %dialect, "creating content table");
    sqlx::query(&statements.create_table)
        .execute(&mut *conn)
        .await
        .map_err(|e| StoreError::SqlxError {
            reason: format!("Error creating table {table} in {dialect} database: {e}"),
            source: Some(e),
        })?;
    Ok(true)
}

/// Prepare every statement shape on `conn`.
pub async fn prepare_all(conn: &mut AnyConnection, statements: &Statements) -> Result<()> {
    for sql in statements.prepared() {
        (&mut *conn)
            .prepare(sql)
            .await
            .sql_context(&format!("Failed to prepare statement: {sql}"))?;
    }
    Ok(())
}
