//! Request and response bodies
//!
//! These mirror the server-side definitions to keep the wire format in step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body sent to the verification endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub vip_code: String,
}

/// Verification result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub active: bool,
    /// `master`, `guest` or `paid` when active
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub redirect_path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}
