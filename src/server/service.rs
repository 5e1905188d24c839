//! Server assembly: configuration, resolver, and listener

use crate::billing::SessionResolver;
use crate::config::EntitlementConfig;
use crate::server::http::{serve_listener, AppState};
use crate::verifier::Verifier;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Wealthgate server configuration
pub struct GateServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,
    /// Master secret, guest codes, and price table
    pub entitlements: EntitlementConfig,
}

/// The main Wealthgate server
pub struct GateServer {
    bind_addr: SocketAddr,
    verifier: Verifier,
}

impl GateServer {
    pub fn new(config: GateServerConfig, resolver: Arc<dyn SessionResolver>) -> Self {
        let verifier = Verifier::new(Arc::new(config.entitlements), resolver);

        Self {
            bind_addr: config.bind_addr,
            verifier,
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            verifier: self.verifier.clone(),
        }
    }

    /// Run the server
    pub async fn run(&self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.bind_addr))?;

        let config = self.verifier.config();
        info!(
            addr = %self.bind_addr,
            guest_codes = config.guest_code_count(),
            tiers = config.tiers().len(),
            "Wealthgate server starting"
        );

        serve_listener(listener, self.state()).await
    }
}
