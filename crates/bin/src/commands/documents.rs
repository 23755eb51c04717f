//! Commands that read or change single documents.

use serde_json::Value;
use tabula::{Document, DocumentStore, Path, json};

use crate::cli::PutArgs;
use crate::output::{OutputFormat, print_json, print_value};

/// Parse a command-line JSON object.
fn parse_object(content: &str) -> Result<json::Object, Box<dyn std::error::Error>> {
    let value: Value = serde_json::from_str(content)?;
    Ok(json::into_object(value)?)
}

fn document_from_args(args: &PutArgs) -> Result<Document, Box<dyn std::error::Error>> {
    let document = Document::new(&args.key, parse_object(&args.content)?);
    Ok(match &args.schema {
        Some(schema) => document.with_schema_key(schema),
        None => document,
    })
}

/// Run the `get` command
pub async fn get(
    store: &mut dyn DocumentStore,
    key: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = store.read(key).await?;
    match format {
        OutputFormat::Human => print_value(&document.to_value())?,
        OutputFormat::Json => print_json(&serde_json::json!({
            "key": document.key(),
            "schema_key": document.schema_key(),
            "content": document.content(),
        }))?,
    }
    Ok(())
}

/// Run the `put` command
pub async fn put(
    store: &mut dyn DocumentStore,
    args: &PutArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = document_from_args(args)?;
    let outcome = store.write(&document).await?;
    match format {
        OutputFormat::Human => println!("{}: {outcome:?}", document.key()),
        OutputFormat::Json => print_json(&serde_json::json!({
            "key": document.key(),
            "outcome": outcome,
        }))?,
    }
    Ok(())
}

/// Run the `put-new` command
pub async fn put_new(
    store: &mut dyn DocumentStore,
    args: &PutArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = document_from_args(args)?;
    let inserted = store.write_if_absent(&document).await?;
    match format {
        OutputFormat::Human if inserted => println!("{}: Inserted", document.key()),
        OutputFormat::Human => println!("{}: already exists, left unchanged", document.key()),
        OutputFormat::Json => print_json(&serde_json::json!({
            "key": document.key(),
            "inserted": inserted,
        }))?,
    }
    Ok(())
}

/// Run the `merge` command
pub async fn merge(
    store: &mut dyn DocumentStore,
    key: &str,
    content: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let incoming = parse_object(content)?;
    let merged = store.merge(key, &incoming).await?;
    match format {
        OutputFormat::Human => print_value(&merged.to_value())?,
        OutputFormat::Json => print_json(&merged.to_value())?,
    }
    Ok(())
}

/// Run the `rm` command
pub async fn remove(
    store: &mut dyn DocumentStore,
    keys: &[String],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match keys {
        [key] => store.remove(key).await?,
        _ => store.remove_multiple(keys).await?,
    }
    match format {
        OutputFormat::Human => println!("Removed {} key(s)", keys.len()),
        OutputFormat::Json => print_json(&serde_json::json!({ "removed": keys }))?,
    }
    Ok(())
}

/// Run the `at` command
pub async fn at(
    store: &mut dyn DocumentStore,
    key: &str,
    path: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::parse(path)?;
    let document = store.read(key).await?;
    let value = document
        .value_at_path(&path)?
        .ok_or_else(|| format!("No value at '{path}' in '{key}'"))?;
    match format {
        OutputFormat::Human => print_value(value)?,
        OutputFormat::Json => print_json(value)?,
    }
    Ok(())
}
