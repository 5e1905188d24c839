//! Wealthgate CLI entry point

mod cli;

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wealthgate::billing::{
    HttpResolverConfig, HttpSessionResolver, MemorySessionResolver, SessionResolver,
    DEFAULT_BILLING_URL,
};
use wealthgate::server::{GateServer, GateServerConfig, VerifyResponse};
use wealthgate::{Classification, EntitlementConfig, Verifier};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Logs go to stderr so `check` output stays parseable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let entitlements = EntitlementConfig::load_or_env(cli.config.as_deref())
        .context("Failed to load entitlement config")?;

    // Resolver is only built when a command needs the billing provider
    let build_resolver = || -> Result<Arc<dyn SessionResolver>> {
        let key = cli
            .billing_key
            .clone()
            .context("STRIPE_SECRET_KEY or --billing-key required")?;
        let url = cli
            .billing_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BILLING_URL.to_string());
        let resolver = HttpSessionResolver::new(HttpResolverConfig::new(key).base_url(url))?;
        Ok(Arc::new(resolver))
    };

    match cli.command {
        Commands::Serve { ref bind } => serve(entitlements, bind, build_resolver()?).await,
        Commands::Check { ref code, at } => check(entitlements, code, at, build_resolver).await,
        Commands::Classify { ref code } => classify(&entitlements, code),
        Commands::Tiers => tiers(&entitlements),
    }
}

async fn serve(
    entitlements: EntitlementConfig,
    bind: &str,
    resolver: Arc<dyn SessionResolver>,
) -> Result<()> {
    let bind_addr: SocketAddr = bind.parse().context("Invalid bind address")?;

    let server = GateServer::new(
        GateServerConfig {
            bind_addr,
            entitlements,
        },
        resolver,
    );

    info!("Starting Wealthgate server...");
    server.run().await?;

    Ok(())
}

async fn check<F>(
    entitlements: EntitlementConfig,
    code: &str,
    at: Option<DateTime<Utc>>,
    build_resolver: F,
) -> Result<()>
where
    F: FnOnce() -> Result<Arc<dyn SessionResolver>>,
{
    let resolver: Arc<dyn SessionResolver> =
        if Classification::classify(code, &entitlements).needs_resolution() {
            build_resolver()?
        } else {
            Arc::new(MemorySessionResolver::new())
        };

    let verifier = Verifier::new(Arc::new(entitlements), resolver);
    let decision = verifier.verify_at(code, at.unwrap_or_else(Utc::now)).await;

    if !decision.active {
        warn!(reason = decision.reason().unwrap_or("-"), "Access denied");
    }

    let response = VerifyResponse::from(decision);
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

fn classify(entitlements: &EntitlementConfig, code: &str) -> Result<()> {
    match Classification::classify(code, entitlements) {
        Classification::ProviderReference(reference) => {
            println!("provider_reference ({})", reference.redacted());
        }
        other => println!("{}", other.kind()),
    }
    Ok(())
}

fn tiers(entitlements: &EntitlementConfig) -> Result<()> {
    let table = entitlements.tiers();

    println!("Hub:   {}", entitlements.hub_redirect());
    println!("Guest: {} ({} codes)", entitlements.guest_redirect(), entitlements.guest_code_count());
    println!("Tiers:");
    if table.is_empty() {
        println!("  (none)");
    } else {
        for (price_id, rule) in table.entries() {
            println!(
                "  {} -> {} ({} days) {}",
                price_id,
                rule.tier,
                rule.duration.num_days(),
                rule.redirect_path
            );
        }
    }

    Ok(())
}
