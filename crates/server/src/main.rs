mod api;
mod router;
mod runner;
mod startup;
mod state;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use keepwatch_core::Config;
use keepwatch_monitor::CatalogSnapshot;

use crate::startup::Components;
use crate::state::AppState;

/// Watches keeper jobs and alerts when a workable job is left unworked.
#[derive(Parser, Debug)]
#[command(name = "keepwatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one check and print the report as JSON.
    Check,
    /// Print networks, windows and cycle size as JSON.
    Networks,
    /// Serve the HTTP API and run checks on an interval.
    Serve {
        /// Seconds between checks (overrides CHECK_INTERVAL_SECS).
        #[arg(long)]
        interval: Option<u64>,

        /// Only serve HTTP; checks run on `POST /check`.
        #[arg(long)]
        no_schedule: bool,
    },
}

/// `RUST_LOG`, then `LOG_LEVEL`, then `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("LOG_LEVEL"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn serve(
    config: &Config,
    components: Components,
    interval: Option<u64>,
    schedule: bool,
) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => {
                error!(error = %e, "Cannot listen for Ctrl-C, running until killed");
                std::future::pending::<()>().await;
            }
        }
        let _ = shutdown_tx.send(true);
    });

    let periodic = if schedule {
        let every = Duration::from_secs(interval.unwrap_or(config.monitor.check_interval_secs));
        Some(tokio::spawn(runner::run_periodic(
            components.checker.clone(),
            every,
            shutdown_rx.clone(),
        )))
    } else {
        None
    };

    let state = Arc::new(AppState {
        checker: components.checker,
        config_summary: config.redacted_summary(),
    });
    let app = router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    let mut rx = shutdown_rx;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = rx.changed().await;
        })
        .await?;

    if let Some(handle) = periodic {
        handle.await?;
    }
    info!("Server stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    keepwatch_core::config::load_dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let components = startup::build(&config)?;

    match cli.command {
        Command::Check => {
            let report = components.checker.run_once().await?;
            print_json(&report)?;
        }
        Command::Networks => {
            let snapshot = CatalogSnapshot::collect(components.catalog.as_ref()).await?;
            print_json(&snapshot)?;
        }
        Command::Serve {
            interval,
            no_schedule,
        } => {
            serve(&config, components, interval, !no_schedule).await?;
        }
    }

    Ok(())
}
