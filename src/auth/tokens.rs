//! Access token classification
//!
//! Token shapes:
//! - master secret: exact match against the configured secret
//! - guest code: member of the configured guest set
//! - `cs_` prefix: checkout session reference, resolved with the billing provider

use crate::config::EntitlementConfig;
use std::fmt;

/// Prefix of checkout session references issued by the billing provider
pub const SESSION_REFERENCE_PREFIX: &str = "cs_";

/// Master override secret
#[derive(Clone)]
pub struct MasterKey {
    key: String,
}

impl MasterKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn matches(&self, token: &str) -> bool {
        constant_time_eq(token, &self.key)
    }
}

/// Constant-time comparison to prevent timing attacks on secrets
pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterKey([REDACTED])")
    }
}

/// A checkout session reference (`cs_...`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionReference {
    reference: String,
}

impl SessionReference {
    /// Parse a session reference (format check only, no provider lookup)
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if !token.starts_with(SESSION_REFERENCE_PREFIX) {
            return None;
        }

        Some(Self {
            reference: token.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.reference
    }

    /// Shortened form for log output
    pub fn redacted(&self) -> String {
        let visible: String = self.reference.chars().take(12).collect();
        format!("{}...", visible)
    }
}

impl fmt::Display for SessionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference)
    }
}

/// Result of classifying a presented token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Master,
    Guest,
    ProviderReference(SessionReference),
    Invalid,
}

impl Classification {
    /// Classify a raw token. Leading and trailing whitespace is ignored.
    pub fn classify(token: &str, config: &EntitlementConfig) -> Self {
        let token = token.trim();

        if token.is_empty() {
            return Classification::Invalid;
        }

        if config.master_key().matches(token) {
            return Classification::Master;
        }

        if config.is_guest_code(token) {
            return Classification::Guest;
        }

        if let Some(reference) = SessionReference::parse(token) {
            return Classification::ProviderReference(reference);
        }

        Classification::Invalid
    }

    /// Short name used in logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            Classification::Master => "master",
            Classification::Guest => "guest",
            Classification::ProviderReference(_) => "provider_reference",
            Classification::Invalid => "invalid",
        }
    }

    pub fn needs_resolution(&self) -> bool {
        matches!(self, Classification::ProviderReference(_))
    }
}
