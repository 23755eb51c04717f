//! SQL dialect detection.
//!
//! The dialect decides which statement templates override the defaults, how
//! parameters are written and how a write learns whether it replaced a row.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Database products with known statement differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Mysql,
    Postgres,
    Derby,
    Hsql,
    H2,
    Sqlite,
    Db2,
    Db2Zos,
    Informix,
    Interbase,
    Firebird,
    SqlServer,
    Access,
    Oracle,
    Sybase,
    Cassandra,
    /// Nothing recognized; default statements only.
    Unknown,
}

/// How bound parameters are written in statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholders {
    /// `$1, $2, ...`
    Numbered,
    /// `?, ?, ...`
    Positional,
}

/// How a write finds out whether it replaced an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// One upsert statement whose affected-row count is 2 on update.
    Upsert,
    /// An update, then an insert when nothing was updated, in one transaction.
    UpdateThenInsert,
}

impl Dialect {
    pub const ALL: [Dialect; 17] = [
        Dialect::Mysql,
        Dialect::Postgres,
        Dialect::Derby,
        Dialect::Hsql,
        Dialect::H2,
        Dialect::Sqlite,
        Dialect::Db2,
        Dialect::Db2Zos,
        Dialect::Informix,
        Dialect::Interbase,
        Dialect::Firebird,
        Dialect::SqlServer,
        Dialect::Access,
        Dialect::Oracle,
        Dialect::Sybase,
        Dialect::Cassandra,
        Dialect::Unknown,
    ];

    /// Recognize a dialect from a product or backend name such as
    /// `"PostgreSQL"`, `"SQLite"` or `"Microsoft SQL Server"`.
    pub fn detect(product_name: &str) -> Self {
        let name = product_name.to_ascii_lowercase();
        let has = |needle: &str| name.contains(needle);

        if has("mysql") || has("mariadb") {
            Dialect::Mysql
        } else if has("postgres") {
            Dialect::Postgres
        } else if has("derby") {
            Dialect::Derby
        } else if has("hsql") {
            Dialect::Hsql
        } else if has("h2") {
            Dialect::H2
        } else if has("sqlite") {
            Dialect::Sqlite
        } else if has("db2") && (has("390") || has("z/os")) {
            Dialect::Db2Zos
        } else if has("db2") {
            Dialect::Db2
        } else if has("informix") {
            Dialect::Informix
        } else if has("interbase") {
            Dialect::Interbase
        } else if has("firebird") {
            Dialect::Firebird
        } else if has("sqlserver") || has("sql server") {
            Dialect::SqlServer
        } else if has("access") {
            Dialect::Access
        } else if has("oracle") {
            Dialect::Oracle
        } else if has("sybase") || has("adaptive server") {
            Dialect::Sybase
        } else if has("cassandra") {
            Dialect::Cassandra
        } else {
            Dialect::Unknown
        }
    }

    /// Lowercase name, as used in configuration.
    pub const fn name(self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Derby => "derby",
            Dialect::Hsql => "hsql",
            Dialect::H2 => "h2",
            Dialect::Sqlite => "sqlite",
            Dialect::Db2 => "db2",
            Dialect::Db2Zos => "db2_zos",
            Dialect::Informix => "informix",
            Dialect::Interbase => "interbase",
            Dialect::Firebird => "firebird",
            Dialect::SqlServer => "sql_server",
            Dialect::Access => "access",
            Dialect::Oracle => "oracle",
            Dialect::Sybase => "sybase",
            Dialect::Cassandra => "cassandra",
            Dialect::Unknown => "unknown",
        }
    }

    pub const fn placeholders(self) -> Placeholders {
        match self {
            Dialect::Postgres | Dialect::Sqlite => Placeholders::Numbered,
            _ => Placeholders::Positional,
        }
    }

    pub const fn write_strategy(self) -> WriteStrategy {
        match self {
            Dialect::Mysql => WriteStrategy::Upsert,
            _ => WriteStrategy::UpdateThenInsert,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dialect| dialect.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| StoreError::InvalidConfig {
                reason: format!("unknown SQL dialect '{s}'"),
            })
    }
}
