//! Store info command - shows backend, table and document count.

use crate::backend::{OpenedStore, backend_label};
use crate::cli::BackendConfig;
use crate::output::{OutputFormat, print_json};

/// Run the info command
pub async fn run(
    opened: &mut OpenedStore,
    args: &BackendConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend_str = backend_label(args);
    let (table, dialect, payload_format) = match opened {
        OpenedStore::Memory { store, .. } => (None, None, store.format()),
        OpenedStore::Sql(store) => (
            Some(store.table().to_string()),
            Some(store.dialect()),
            store.format(),
        ),
    };
    let documents = opened.store().size().await?;

    match format {
        OutputFormat::Human => {
            println!("Backend:     {backend_str}");
            if let (Some(table), Some(dialect)) = (&table, dialect) {
                println!("Dialect:     {dialect}");
                println!("Table:       {table}");
            }
            println!("Format:      {payload_format}");
            println!("Documents:   {documents}");
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "backend": backend_str,
            "dialect": dialect.map(|d| d.name()),
            "table": table,
            "format": payload_format.name(),
            "documents": documents,
        }))?,
    }

    Ok(())
}
