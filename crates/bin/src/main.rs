mod backend;
mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tabula=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let mut opened = backend::open_store(&cli.backend_config).await?;
    let result = run(&cli.command, &mut opened, &cli, format).await;

    // Persist and close even when the command failed; report the command's error first
    match (result, opened.finish().await) {
        (Err(e), Err(close_err)) => {
            tracing::warn!("Closing the store failed: {close_err}");
            Err(e)
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    }
}

async fn run(
    command: &Commands,
    opened: &mut backend::OpenedStore,
    cli: &Cli,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    use commands::{documents, info, listing};

    match command {
        Commands::Get { key } => documents::get(opened.store(), key, format).await,
        Commands::Put(args) => documents::put(opened.store(), args, format).await,
        Commands::PutNew(args) => documents::put_new(opened.store(), args, format).await,
        Commands::Merge { key, content } => {
            documents::merge(opened.store(), key, content, format).await
        }
        Commands::Rm { keys } => documents::remove(opened.store(), keys, format).await,
        Commands::Keys => listing::keys(opened.store(), format).await,
        Commands::Count => listing::count(opened.store(), format).await,
        Commands::At { key, path } => documents::at(opened.store(), key, path, format).await,
        Commands::Info => info::run(opened, &cli.backend_config, format).await,
    }
}
