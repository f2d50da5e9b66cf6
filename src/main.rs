use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use sqlpatch::{Config, Patcher};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Applies and rolls back SQL patches.
#[derive(Debug, Parser)]
#[command(name = "sqlpatch", version)]
struct Cli {
    /// Configuration file (defaults to ./sqlpatch.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `patcher.patches_directory_path`.
    #[arg(long, global = true)]
    patches_directory_path: Option<String>,

    /// Overrides `basic.database_url`.
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the applied-state table if missing.
    Init,
    /// Apply every outstanding patch as one batch.
    Patch,
    /// Roll back the last applied batch.
    Rollback,
    /// List applied and pending patches.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut cfg = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.patches_directory_path {
        cfg.patcher.patches_directory_path = path;
    }
    if let Some(url) = cli.database_url {
        cfg.basic.database_url = url;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        patches_directory_path = %cfg.patcher.patches_directory_path,
        storer_table = %cfg.storer.table,
        loglevel = %cfg.basic.loglevel
    );

    let patcher = Patcher::open(&cfg).await?;

    match cli.command {
        Command::Init => {
            patcher.init().await?;
            info!("Init successful");
        }
        Command::Patch => {
            patcher.patch().await?;
            info!("Patch successful");
        }
        Command::Rollback => {
            patcher.rollback().await?;
            info!("Rollback successful");
        }
        Command::Status => {
            let status = patcher.status().await?;
            for record in &status.applied {
                println!("applied  batch {:>4}  {}", record.batch, record.patch);
            }
            for name in &status.pending {
                println!("pending             {name}");
            }
        }
    }
    Ok(())
}
