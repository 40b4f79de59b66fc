mod api;
mod cli;
mod config;
mod error;
mod watchlist;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{commands, Cli, Commands};
use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config { show, set, reset }) => {
            commands::config(show, set, reset).await?;
        }
        Some(Commands::Add {
            kind,
            query,
            status,
            pick,
            page,
        }) => {
            commands::add(kind, query, status, pick, page).await?;
        }
        Some(Commands::List { kind, status }) => {
            commands::list(kind, status).await?;
        }
        Some(Commands::Watched { id }) => {
            commands::watched(id).await?;
        }
        Some(Commands::Status { id, status }) => {
            commands::status(id, status).await?;
        }
        Some(Commands::Progress {
            id,
            season,
            episode,
        }) => {
            commands::progress(id, season, episode).await?;
        }
        Some(Commands::Notes { id, text }) => {
            commands::notes(id, text).await?;
        }
        Some(Commands::Remove { id, yes }) => {
            commands::remove(id, yes).await?;
        }
        Some(Commands::Export { path }) => {
            commands::export(&path).await?;
        }
        Some(Commands::Import { path }) => {
            commands::import(&path).await?;
        }
        // The dashboard is the default view
        Some(Commands::UpNext) | None => {
            commands::up_next().await?;
        }
    }

    Ok(())
}
