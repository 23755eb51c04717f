//! Commands that look at the whole store.

use tabula::{DocumentStore, clock::millis_to_rfc3339};

use crate::output::{OutputFormat, print_json, print_table};

/// Run the `keys` command
pub async fn keys(
    store: &mut dyn DocumentStore,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut keys = store.all_keys().await?;
    keys.sort();

    match format {
        OutputFormat::Human => {
            if keys.is_empty() {
                println!("No documents found.");
                return Ok(());
            }

            let mut rows = Vec::with_capacity(keys.len());
            for key in &keys {
                let meta = store.metadata(key).await?;
                rows.push(vec![
                    key.clone(),
                    meta.schema_key.unwrap_or_default(),
                    timestamp(meta.modified_at),
                ]);
            }
            print_table(&["KEY", "SCHEMA", "MODIFIED"], &rows);
        }
        OutputFormat::Json => {
            let mut entries = Vec::with_capacity(keys.len());
            for key in &keys {
                let meta = store.metadata(key).await?;
                entries.push(serde_json::json!({
                    "key": key,
                    "schema_key": meta.schema_key,
                    "format": meta.format,
                    "created_at": timestamp(meta.created_at),
                    "modified_at": timestamp(meta.modified_at),
                }));
            }
            print_json(&entries)?;
        }
    }

    Ok(())
}

/// Run the `count` command
pub async fn count(
    store: &mut dyn DocumentStore,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let size = store.size().await?;
    match format {
        OutputFormat::Human => println!("{size}"),
        OutputFormat::Json => print_json(&serde_json::json!({ "count": size }))?,
    }
    Ok(())
}

fn timestamp(millis: i64) -> String {
    millis_to_rfc3339(u64::try_from(millis).unwrap_or_default())
}
