mod config;
mod error;
mod handlers;
mod metrics;
mod server;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use groupsync_store_sqlite::SqliteStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::ServerConfig;
use server::{router, AppState};

// ────────────────────────────────────── CLI Types ──────────────────────────────────────

#[derive(Parser)]
#[command(name = "groupsync-server")]
#[command(about = "Links directory groups to teams and channels")]
struct Cli {
    /// Database URL (sqlite://path/to/db.db)
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        default_value = "sqlite://groupsync.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Server address
        #[arg(long, default_value = "0.0.0.0:8065")]
        addr: String,
    },
    /// Validate the environment configuration and grant table, then exit
    CheckConfig,
}

// ────────────────────────────────────── Commands ──────────────────────────────────────

async fn cmd_serve(
    database_url: &str,
    addr: &str,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let grants = config.load_grants()?;
    let store = Arc::new(SqliteStore::open(database_url).await?);
    let handle = metrics::init_metrics()?;

    if !config.license.ldap_groups {
        warn!("LDAP groups are not licensed; group endpoints will answer 501");
    }

    let state = AppState::new(store, Arc::new(grants), config.license).with_metrics(handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("groupsync-server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn cmd_check_config(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let grants = config.load_grants()?;
    println!("LDAP groups licensed: {}", config.license.ldap_groups);
    match &config.grants_file {
        Some(path) => println!("Grant table: {}", path.display()),
        None => println!("Grant table: none (no capabilities granted)"),
    }
    println!("  system admins:  {}", grants.system_admins.len());
    println!("  team grants:    {}", grants.teams.len());
    println!("  channel grants: {}", grants.channels.len());
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully...");
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Received SIGINT, shutting down gracefully...");
                    }
                }
                return;
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for SIGINT: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received SIGINT, shutting down gracefully...");
}

// ────────────────────────────────────── Main ──────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_env()?;

    match cli.command {
        Command::Serve { addr } => cmd_serve(&cli.database_url, &addr, config).await?,
        Command::CheckConfig => cmd_check_config(&config)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
