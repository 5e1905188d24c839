//! Request and response bodies for the verification endpoint

use crate::policy::{AccessLevel, EntitlementDecision};
use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Malformed verification request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInputError {
    #[error("Missing code.")]
    MissingCode,

    #[error("Malformed request: {0}")]
    Malformed(String),
}

/// `POST /api/verify-vip` body
///
/// Only a JSON object is accepted. `vipCode` must be a string, `null` or
/// absent; other fields are ignored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub vip_code: Option<String>,
}

impl<'de> Deserialize<'de> for VerifyRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut body = Map::<String, Value>::deserialize(deserializer)?;

        let vip_code = match body.remove("vipCode") {
            None | Some(Value::Null) => None,
            Some(Value::String(code)) => Some(code),
            Some(_) => return Err(de::Error::custom("vipCode must be a string")),
        };

        Ok(Self { vip_code })
    }
}

impl VerifyRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            vip_code: Some(code.into()),
        }
    }

    /// The trimmed code, rejecting absent or blank values
    pub fn code(&self) -> Result<&str, InvalidInputError> {
        match self.vip_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Ok(code),
            _ => Err(InvalidInputError::MissingCode),
        }
    }
}

/// Verification response; denials carry `message` and `reason`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<AccessLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl VerifyResponse {
    pub fn denied(message: impl Into<String>) -> Self {
        Self {
            active: false,
            level: None,
            redirect_path: None,
            message: Some(message.into()),
            reason: None,
            expires_at: None,
        }
    }
}

impl From<EntitlementDecision> for VerifyResponse {
    fn from(decision: EntitlementDecision) -> Self {
        let level = match decision.level {
            AccessLevel::None => None,
            level => Some(level),
        };

        Self {
            active: decision.active,
            level,
            message: decision.message(),
            reason: decision.reason().map(str::to_string),
            redirect_path: decision.redirect_target,
            expires_at: decision.expires_at,
        }
    }
}

impl From<InvalidInputError> for VerifyResponse {
    fn from(error: InvalidInputError) -> Self {
        Self::denied(error.to_string())
    }
}
