//! Statement templates and their rendered SQL.
//!
//! Templates are plain SQL with three kinds of markers:
//!
//! - `{table}` is replaced by the table name, prefix included
//! - `{keys}` is replaced by one parameter per key of a batch shape
//! - `?` is a bound parameter, rewritten to `$n` for numbered dialects
//!
//! Defaults are overlaid by dialect-specific templates and then by
//! configured overrides, so any single statement can be replaced without
//! restating the rest.

use std::collections::BTreeMap;

use super::dialect::{Dialect, Placeholders, WriteStrategy};
use crate::store::{
    StoreError,
    batch::{BATCH_LADDER, BatchShape},
};

pub const TABLE_EXISTS: &str = "table_exists_query";
pub const CREATE_TABLE: &str = "create_table";
pub const HAS_DOCUMENT: &str = "has_document";
pub const READ_DOCUMENT: &str = "read_document";
pub const READ_DOCUMENTS: &str = "read_documents";
pub const READ_METADATA: &str = "read_metadata";
pub const WRITE_DOCUMENT: &str = "write_document";
pub const UPDATE_DOCUMENT: &str = "update_document";
pub const INSERT_DOCUMENT: &str = "insert_document";
pub const INSERT_IF_ABSENT: &str = "insert_if_absent";
pub const REMOVE_DOCUMENT: &str = "remove_document";
pub const REMOVE_DOCUMENTS: &str = "remove_documents";
pub const READ_ALL_DOCUMENTS: &str = "read_all_documents";
pub const READ_ALL_KEYS: &str = "read_all_keys";
pub const COUNT_ALL_DOCUMENTS: &str = "count_all_documents";

const COLUMNS: &str = "doc_key, schema_key, format, created_at, modified_at, payload";

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    (TABLE_EXISTS, "SELECT 1 FROM {table} WHERE 1 = 0"),
    (
        CREATE_TABLE,
        "CREATE TABLE {table} (\
         doc_key VARCHAR(512) NOT NULL PRIMARY KEY, \
         schema_key VARCHAR(512), \
         format BIGINT NOT NULL, \
         created_at BIGINT NOT NULL, \
         modified_at BIGINT NOT NULL, \
         payload BLOB NOT NULL)",
    ),
    (HAS_DOCUMENT, "SELECT 1 FROM {table} WHERE doc_key = ?"),
    (
        READ_DOCUMENT,
        "SELECT doc_key, schema_key, format, payload FROM {table} WHERE doc_key = ?",
    ),
    (
        READ_DOCUMENTS,
        "SELECT doc_key, schema_key, format, payload FROM {table} WHERE doc_key IN ({keys})",
    ),
    (
        READ_METADATA,
        "SELECT schema_key, format, created_at, modified_at FROM {table} WHERE doc_key = ?",
    ),
    (
        UPDATE_DOCUMENT,
        "UPDATE {table} SET schema_key = ?, format = ?, modified_at = ?, payload = ? WHERE doc_key = ?",
    ),
    (
        INSERT_DOCUMENT,
        "INSERT INTO {table} ({columns}) VALUES (?, ?, ?, ?, ?, ?)",
    ),
    (
        INSERT_IF_ABSENT,
        "INSERT INTO {table} ({columns}) VALUES (?, ?, ?, ?, ?, ?) ON CONFLICT (doc_key) DO NOTHING",
    ),
    (REMOVE_DOCUMENT, "DELETE FROM {table} WHERE doc_key = ?"),
    (
        REMOVE_DOCUMENTS,
        "DELETE FROM {table} WHERE doc_key IN ({keys})",
    ),
    (
        READ_ALL_DOCUMENTS,
        "SELECT doc_key, schema_key, format, payload FROM {table}",
    ),
    (READ_ALL_KEYS, "SELECT doc_key FROM {table}"),
    (COUNT_ALL_DOCUMENTS, "SELECT COUNT(*) FROM {table}"),
];

const SQLITE_TEMPLATES: &[(&str, &str)] = &[(
    CREATE_TABLE,
    "CREATE TABLE {table} (\
     doc_key TEXT NOT NULL PRIMARY KEY, \
     schema_key TEXT, \
     format INTEGER NOT NULL, \
     created_at INTEGER NOT NULL, \
     modified_at INTEGER NOT NULL, \
     payload BLOB NOT NULL)",
)];

const POSTGRES_TEMPLATES: &[(&str, &str)] = &[(
    CREATE_TABLE,
    "CREATE TABLE {table} (\
     doc_key TEXT NOT NULL PRIMARY KEY, \
     schema_key TEXT, \
     format BIGINT NOT NULL, \
     created_at BIGINT NOT NULL, \
     modified_at BIGINT NOT NULL, \
     payload BYTEA NOT NULL)",
)];

const MYSQL_TEMPLATES: &[(&str, &str)] = &[
    (
        CREATE_TABLE,
        "CREATE TABLE {table} (\
         doc_key VARCHAR(512) NOT NULL PRIMARY KEY, \
         schema_key VARCHAR(512), \
         format BIGINT NOT NULL, \
         created_at BIGINT NOT NULL, \
         modified_at BIGINT NOT NULL, \
         payload LONGBLOB NOT NULL)",
    ),
    (
        WRITE_DOCUMENT,
        "INSERT INTO {table} ({columns}) VALUES (?, ?, ?, ?, ?, ?) \
         ON DUPLICATE KEY UPDATE schema_key = VALUES(schema_key), format = VALUES(format), \
         modified_at = VALUES(modified_at), payload = VALUES(payload)",
    ),
    (
        INSERT_IF_ABSENT,
        "INSERT IGNORE INTO {table} ({columns}) VALUES (?, ?, ?, ?, ?, ?)",
    ),
];

const SQL_SERVER_TEMPLATES: &[(&str, &str)] = &[(
    CREATE_TABLE,
    "CREATE TABLE {table} (\
     doc_key NVARCHAR(512) NOT NULL PRIMARY KEY, \
     schema_key NVARCHAR(512), \
     format BIGINT NOT NULL, \
     created_at BIGINT NOT NULL, \
     modified_at BIGINT NOT NULL, \
     payload VARBINARY(MAX) NOT NULL)",
)];

const ORACLE_TEMPLATES: &[(&str, &str)] = &[(
    CREATE_TABLE,
    "CREATE TABLE {table} (\
     doc_key VARCHAR2(512) NOT NULL PRIMARY KEY, \
     schema_key VARCHAR2(512), \
     format NUMBER(19) NOT NULL, \
     created_at NUMBER(19) NOT NULL, \
     modified_at NUMBER(19) NOT NULL, \
     payload BLOB NOT NULL)",
)];

fn dialect_templates(dialect: Dialect) -> &'static [(&'static str, &'static str)] {
    match dialect {
        Dialect::Sqlite => SQLITE_TEMPLATES,
        Dialect::Postgres => POSTGRES_TEMPLATES,
        Dialect::Mysql => MYSQL_TEMPLATES,
        Dialect::SqlServer => SQL_SERVER_TEMPLATES,
        Dialect::Oracle => ORACLE_TEMPLATES,
        _ => &[],
    }
}

/// Named statement templates for one dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementTemplates {
    templates: BTreeMap<String, String>,
}

impl StatementTemplates {
    /// Defaults overlaid with the templates specific to `dialect`.
    pub fn for_dialect(dialect: Dialect) -> Self {
        let mut templates = Self {
            templates: BTreeMap::new(),
        };
        templates.overlay(DEFAULT_TEMPLATES.iter().copied());
        templates.overlay(dialect_templates(dialect).iter().copied());
        templates
    }

    /// Replace templates by name.
    pub fn overlay<I, K, V>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, sql) in overrides {
            self.templates.insert(name.into(), sql.into());
        }
    }

    pub fn get(&self, name: &str) -> Result<&str, StoreError> {
        self.templates
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| StoreError::MissingStatement {
                name: name.to_string(),
            })
    }

    /// Names of every template, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

/// Expand markers in `template` for `table` and a batch of `keys` parameters.
pub fn render(template: &str, table: &str, keys: usize, placeholders: Placeholders) -> String {
    let key_params = vec!["?"; keys].join(", ");
    let sql = template
        .replace("{table}", table)
        .replace("{columns}", COLUMNS)
        .replace("{keys}", &key_params);

    match placeholders {
        Placeholders::Positional => sql,
        Placeholders::Numbered => {
            let mut numbered = String::with_capacity(sql.len() + 8);
            let mut n = 0;
            for c in sql.chars() {
                if c == '?' {
                    n += 1;
                    numbered.push('$');
                    numbered.push_str(&n.to_string());
                } else {
                    numbered.push(c);
                }
            }
            numbered
        }
    }
}

/// Fully rendered SQL for every operation, kept for the store's lifetime.
#[derive(Debug, Clone)]
pub struct Statements {
    pub table_exists: String,
    pub create_table: String,
    pub has_document: String,
    pub read_document: String,
    pub read_metadata: String,
    pub write_document: Option<String>,
    pub update_document: String,
    pub insert_document: String,
    pub insert_if_absent: String,
    pub remove_document: String,
    pub read_all_documents: String,
    pub read_all_keys: String,
    pub count_all_documents: String,
    read_batches: [String; BATCH_LADDER.len()],
    remove_batches: [String; BATCH_LADDER.len()],
}

impl Statements {
    /// Render every statement the store runs.
    ///
    /// The single upsert statement is only required when the dialect writes
    /// through an upsert.
    pub fn render(
        templates: &StatementTemplates,
        table: &str,
        dialect: Dialect,
    ) -> Result<Self, StoreError> {
        let placeholders = dialect.placeholders();
        let one = |name: &str| -> Result<String, StoreError> {
            Ok(render(templates.get(name)?, table, 1, placeholders))
        };
        let shaped = |name: &str| -> Result<[String; BATCH_LADDER.len()], StoreError> {
            let template = templates.get(name)?;
            Ok(BATCH_LADDER.map(|size| render(template, table, size, placeholders)))
        };

        let write_document = match dialect.write_strategy() {
            WriteStrategy::Upsert => Some(one(WRITE_DOCUMENT)?),
            WriteStrategy::UpdateThenInsert => None,
        };

        Ok(Self {
            table_exists: one(TABLE_EXISTS)?,
            create_table: one(CREATE_TABLE)?,
            has_document: one(HAS_DOCUMENT)?,
            read_document: one(READ_DOCUMENT)?,
            read_metadata: one(READ_METADATA)?,
            write_document,
            update_document: one(UPDATE_DOCUMENT)?,
            insert_document: one(INSERT_DOCUMENT)?,
            insert_if_absent: one(INSERT_IF_ABSENT)?,
            remove_document: one(REMOVE_DOCUMENT)?,
            read_all_documents: one(READ_ALL_DOCUMENTS)?,
            read_all_keys: one(READ_ALL_KEYS)?,
            count_all_documents: one(COUNT_ALL_DOCUMENTS)?,
            read_batches: shaped(READ_DOCUMENTS)?,
            remove_batches: shaped(REMOVE_DOCUMENTS)?,
        })
    }

    pub fn read_batch(&self, shape: BatchShape) -> &str {
        &self.read_batches[shape.index()]
    }

    pub fn remove_batch(&self, shape: BatchShape) -> &str {
        &self.remove_batches[shape.index()]
    }

    /// Every statement that is prepared when the store opens. Table probing
    /// and creation are excluded since the table may not exist yet.
    pub fn prepared(&self) -> impl Iterator<Item = &str> {
        [
            &self.has_document,
            &self.read_document,
            &self.read_metadata,
            &self.update_document,
            &self.insert_document,
            &self.insert_if_absent,
            &self.remove_document,
            &self.read_all_documents,
            &self.read_all_keys,
            &self.count_all_documents,
        ]
        .into_iter()
        .chain(self.write_document.iter())
        .chain(self.read_batches.iter())
        .chain(self.remove_batches.iter())
        .map(String::as_str)
    }
}
