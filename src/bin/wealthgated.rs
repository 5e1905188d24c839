//! Wealthgate daemon - HTTP entitlement verifier

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wealthgate::billing::{HttpResolverConfig, HttpSessionResolver, DEFAULT_BILLING_URL};
use wealthgate::server::{GateServer, GateServerConfig};
use wealthgate::EntitlementConfig;

#[derive(Parser)]
#[command(name = "wealthgated")]
#[command(about = "Wealthgate entitlement verifier daemon")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "WEALTHGATE_BIND")]
    bind: String,

    /// Path to the entitlement config (TOML)
    #[arg(long, env = "WEALTHGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Billing provider API base URL
    #[arg(long, default_value = DEFAULT_BILLING_URL, env = "WEALTHGATE_BILLING_URL")]
    billing_url: String,

    /// Billing provider secret key
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    billing_key: String,

    /// Log level
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    run_server(args).await
}

async fn run_server(args: Args) -> Result<()> {
    let entitlements = EntitlementConfig::load_or_env(args.config.as_deref())
        .context("Failed to load entitlement config")?;

    let resolver = HttpSessionResolver::new(
        HttpResolverConfig::new(args.billing_key).base_url(args.billing_url),
    )?;

    let bind_addr = args.bind.parse().context("Invalid bind address")?;

    let server = GateServer::new(
        GateServerConfig {
            bind_addr,
            entitlements,
        },
        Arc::new(resolver),
    );

    info!(addr = %args.bind, "Wealthgate daemon starting");

    // Run server with graceful shutdown on signals
    tokio::select! {
        result = server.run() => {
            result?;
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping server");
        }
    }

    info!("Wealthgate daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
}
