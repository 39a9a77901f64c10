//! Rollcall CLI entry point

mod cli;
mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::error;

use cli::Cli;
use rollcall_core::Result;
use rollcall_runtime::{AppContext, FileIdentityStore, SqliteStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let (db_path, identity_path) = data_paths(cli.data_dir)?;

    let store = Arc::new(SqliteStore::open(&db_path)?);
    let identity = FileIdentityStore::new(identity_path);

    let ctx = AppContext::builder().with_store(store).build()?;
    ctx.init().await?;

    let outcome = commands::execute(cli.command, cli.no_radio, &ctx, &identity).await;
    ctx.dispose().await;
    outcome
}

fn data_paths(data_dir: Option<PathBuf>) -> Result<(PathBuf, PathBuf)> {
    match data_dir {
        Some(dir) => Ok((dir.join("rollcall.db"), dir.join("identity.json"))),
        None => Ok((
            SqliteStore::default_path()?,
            FileIdentityStore::default_path()?,
        )),
    }
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
