//! chinook CLI - customer lookups and purchase reports for a Chinook database
//!
//! A thin caller over `chinook-core`: every subcommand maps to one store
//! operation and renders its result as text or JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chinook_core::SqliteCustomerStore;
use clap::Parser;

mod commands;
mod config;
mod render;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "chinook",
    author,
    version,
    about = "Customer lookups, paging and purchase reports over a Chinook SQLite database"
)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Database URL (overrides config file and environment)
    #[arg(long, global = true, value_name = "URL")]
    database: Option<String>,

    /// Path to a TOML config file (default: ~/.chinook/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env may carry RUST_LOG, so it is read before the filter is built
    let dotenv = config::load_dotenv();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug })?;
    config::log_dotenv(&dotenv);

    let store_config = config::resolve(cli.config.as_deref(), cli.database.as_deref())?;
    let store = SqliteCustomerStore::connect(&store_config)
        .await
        .with_context(|| format!("Failed to open {}", store_config.database_url))?;

    commands::run(&store, cli.command, render::Format::from_flag(cli.json)).await
}
