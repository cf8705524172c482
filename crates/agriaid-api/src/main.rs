//! AgriAid entry point.
//!
//! Binary name: `agriaid`
//!
//! Parses CLI arguments, sets up tracing, loads configuration, then either
//! serves the SMS webhook or runs a terminal chat against the same router.

mod cli;
mod http;
mod state;

use std::time::Duration;

use clap::Parser;

use agriaid_infra::config::load_service_config;
use agriaid_observe::{TracingOptions, init_tracing, shutdown_tracing};
use cli::{Cli, Commands};
use state::AppState;

/// How often expired sessions and quota counters are swept from the cache.
const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&TracingOptions {
        default_filter: cli.log_filter().to_string(),
        json: cli.json_logs,
        otel: cli.otel,
    })?;

    let mut config = load_service_config(&cli.config).await;
    let result = match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            serve(config).await
        }
        Commands::Chat { phone } => {
            let state = AppState::init(&config)?;
            cli::chat::run(&state, &phone).await
        }
    };

    shutdown_tracing();
    result
}

async fn serve(config: agriaid_types::config::ServiceConfig) -> anyhow::Result<()> {
    let state = AppState::init(&config)?;
    let janitor = state.spawn_cache_janitor(CACHE_SWEEP_INTERVAL);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, model = %config.agent.model, "server started");

    println!(
        "  {} AgriAid listening on {}",
        console::style("🌱").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!(
        "  {}",
        console::style("Inbound SMS callback: POST /receive-sms").dim()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    janitor.abort();
    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
