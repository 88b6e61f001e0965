//! Relstream CLI - stream documents through a relation-extraction model.

use clap::Parser;
use relstream_cli::commands;
use relstream_cli::{Cli, Command, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Watch(args) => commands::execute_watch(args, config).await?,
        Command::Process(args) => commands::execute_process(args, config).await?,
    }
    Ok(())
}
