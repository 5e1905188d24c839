//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wealthgate")]
#[command(about = "Entitlement verifier for WealthyAI premium pages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the entitlement config (TOML)
    #[arg(long, env = "WEALTHGATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Billing provider API base URL
    #[arg(long, env = "WEALTHGATE_BILLING_URL", global = true)]
    pub billing_url: Option<String>,

    /// Billing provider secret key
    #[arg(long, env = "STRIPE_SECRET_KEY", global = true, hide_env_values = true)]
    pub billing_key: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind to
        #[arg(short, long, default_value = "0.0.0.0:8080", env = "WEALTHGATE_BIND")]
        bind: String,
    },

    /// Verify a single access code and print the decision
    ///
    /// Examples:
    ///   wealthgate check WAI-GUEST-7721
    ///   wealthgate check cs_test_123 --at 2026-03-08T12:00:00Z
    Check {
        /// Access code to verify
        code: String,

        /// Evaluate at this instant (RFC 3339) instead of now
        #[arg(long, value_parser = parse_instant)]
        at: Option<chrono::DateTime<chrono::Utc>>,
    },

    /// Classify an access code without contacting the billing provider
    Classify {
        /// Access code to classify
        code: String,
    },

    /// Show the configured price table
    Tiers,
}

fn parse_instant(s: &str) -> Result<chrono::DateTime<chrono::Utc>, String> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&chrono::Utc))
        .map_err(|e| format!("Invalid timestamp '{}': {}", s, e))
}
