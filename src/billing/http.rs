//! Billing provider HTTP resolver

use crate::auth::SessionReference;
use crate::billing::{PaymentStatus, ProviderSession, ResolverError, SessionResolver};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

pub const DEFAULT_BILLING_URL: &str = "https://api.stripe.com";

/// Metadata key carrying the purchased price id
const PRICE_ID_METADATA_KEY: &str = "priceId";

/// HTTP resolver configuration
#[derive(Clone)]
pub struct HttpResolverConfig {
    /// Provider API base URL
    pub base_url: String,
    /// Secret API key sent as a bearer token
    pub api_key: String,
}

impl HttpResolverConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BILLING_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl fmt::Debug for HttpResolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResolverConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Checkout session body, only the fields we read
#[derive(Debug, Deserialize)]
struct CheckoutSessionBody {
    payment_status: PaymentStatus,
    created: i64,
    #[serde(default)]
    metadata: Option<HashMap<String, serde_json::Value>>,
}

impl CheckoutSessionBody {
    fn into_session(self) -> Result<ProviderSession, ResolverError> {
        let created_at = DateTime::from_timestamp(self.created, 0).ok_or_else(|| {
            ResolverError::Unavailable(format!("invalid created timestamp: {}", self.created))
        })?;

        let price_id = self
            .metadata
            .as_ref()
            .and_then(|m| m.get(PRICE_ID_METADATA_KEY))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(ProviderSession::new(self.payment_status, created_at, price_id))
    }
}

/// Looks up checkout sessions over the provider REST API
pub struct HttpSessionResolver {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl HttpSessionResolver {
    pub fn new(config: HttpResolverConfig) -> Result<Self, ResolverError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ResolverError::Unavailable(format!("invalid billing URL: {}", e)))?;

        if base_url.cannot_be_a_base() {
            return Err(ResolverError::Unavailable(format!(
                "invalid billing URL: {}",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ResolverError::Unavailable(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    /// `{base}/v1/checkout/sessions/{reference}`, reference escaped as one segment
    fn session_url(&self, reference: &SessionReference) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v1", "checkout", "sessions", reference.as_str()]);
        }
        url
    }
}

#[async_trait]
impl SessionResolver for HttpSessionResolver {
    async fn resolve(&self, reference: &SessionReference) -> Result<ProviderSession, ResolverError> {
        let url = self.session_url(reference);

        debug!(reference = %reference.redacted(), "Looking up checkout session");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Billing provider request failed");
                ResolverError::Unavailable(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, reference = %reference.redacted(), "Checkout session lookup rejected");
            return Err(ResolverError::Unavailable(format!("provider returned {}", status)));
        }

        let body: CheckoutSessionBody = response
            .json()
            .await
            .map_err(|e| ResolverError::Unavailable(format!("invalid provider response: {}", e)))?;

        body.into_session()
    }
}
