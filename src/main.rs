use anyhow::{Context, Result};
use clap::Parser;
use stackrelay::cli::{Cli, Commands};
use stackrelay::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli.resolve_config()?;

    // Tracing first so validation warnings are logged
    stackrelay::init_tracing(&config.log);
    config.validate()?;

    match &cli.command {
        Some(Commands::Template(args)) => commands::template::run(&config, args),
        Some(Commands::Status(args)) => block_on(commands::status::run(&config, args)),
        Some(Commands::Deploy(_)) | None => block_on(commands::deploy::run(&config)),
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(future)
}
