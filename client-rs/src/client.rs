//! Wealthgate client implementation

use crate::config::GateConfig;
use crate::error::{GateError, Result};
use crate::messages::{VerifyRequest, VerifyResponse};
use crate::store::TokenStore;

use tracing::{debug, info, warn};

/// Client for the verification endpoint with code persistence
pub struct GateClient<S: TokenStore> {
    config: GateConfig,
    http: reqwest::Client,
    store: S,
}

impl<S: TokenStore> GateClient<S> {
    pub fn new(config: GateConfig, store: S) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GateError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http, store })
    }

    /// Code currently remembered, if any
    pub fn stored_code(&self) -> Result<Option<String>> {
        self.store.load()
    }

    /// Verify a code; an active result is remembered for [`GateClient::resume`]
    pub async fn verify(&self, code: &str) -> Result<VerifyResponse> {
        let code = code.trim();
        let response = self.post(code).await?;

        if response.active {
            self.store.save(code)?;
            info!(level = response.level.as_deref().unwrap_or("-"), "Access granted");
        } else {
            debug!(reason = response.reason.as_deref().unwrap_or("-"), "Access denied");
        }

        Ok(response)
    }

    /// Re-verify the remembered code. A denied code is forgotten.
    pub async fn resume(&self) -> Result<Option<VerifyResponse>> {
        let Some(code) = self.store.load()? else {
            return Ok(None);
        };

        let response = self.post(&code).await?;
        if !response.active {
            warn!(reason = response.reason.as_deref().unwrap_or("-"), "Stored code no longer valid");
            self.store.clear()?;
        }

        Ok(Some(response))
    }

    /// Drop the remembered code
    pub fn forget(&self) -> Result<()> {
        self.store.clear()
    }

    async fn post(&self, code: &str) -> Result<VerifyResponse> {
        let response = self
            .http
            .post(self.config.verify_url())
            .json(&VerifyRequest {
                vip_code: code.to_string(),
            })
            .send()
            .await
            .map_err(|e| GateError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GateError::Connection(e.to_string()))?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        // Error bodies share the response shape; fall back to the status line
        let message = serde_json::from_str::<VerifyResponse>(&body)
            .ok()
            .and_then(|r| r.message)
            .unwrap_or_else(|| status.to_string());

        if status.is_client_error() {
            Err(GateError::InvalidRequest(message))
        } else {
            Err(GateError::Server(message))
        }
    }
}
