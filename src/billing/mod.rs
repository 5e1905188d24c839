//! Billing provider session lookups
//!
//! - HTTP: checkout session retrieval against the provider API
//! - Memory: fixed session table for tests and local runs

mod http;
mod memory;

pub use http::{HttpResolverConfig, HttpSessionResolver, DEFAULT_BILLING_URL};
pub use memory::MemorySessionResolver;

use crate::auth::SessionReference;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Resolver errors
#[derive(Debug, Clone, Error)]
pub enum ResolverError {
    #[error("billing provider unavailable: {0}")]
    Unavailable(String),
}

/// Payment state reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
    /// Anything else the provider reports (e.g. `requires_action`)
    #[serde(untagged)]
    Other(String),
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Unpaid => write!(f, "unpaid"),
            PaymentStatus::NoPaymentRequired => write!(f, "no_payment_required"),
            PaymentStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Checkout session evidence, read-only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSession {
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub price_id: Option<String>,
}

impl ProviderSession {
    pub fn new(
        payment_status: PaymentStatus,
        created_at: DateTime<Utc>,
        price_id: Option<String>,
    ) -> Self {
        Self {
            payment_status,
            created_at,
            price_id,
        }
    }

    pub fn paid(created_at: DateTime<Utc>, price_id: impl Into<String>) -> Self {
        Self::new(PaymentStatus::Paid, created_at, Some(price_id.into()))
    }
}

/// Trait for checkout session lookup
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Fetch the session behind a reference. Single attempt, no caching.
    async fn resolve(&self, reference: &SessionReference) -> Result<ProviderSession, ResolverError>;
}
