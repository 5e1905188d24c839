//! Configuration for the Wealthgate client

use std::time::Duration;

/// Default verification endpoint path
pub const DEFAULT_VERIFY_PATH: &str = "/api/verify-vip";

/// Configuration for talking to a Wealthgate server
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Server base URL (e.g., "https://wealthyai.example.com")
    pub url: String,

    /// Verification endpoint path
    pub verify_path: String,

    /// Request timeout
    pub request_timeout: Duration,
}

impl GateConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            verify_path: DEFAULT_VERIFY_PATH.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Set the verification endpoint path
    pub fn verify_path(mut self, path: impl Into<String>) -> Self {
        self.verify_path = path.into();
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full verification URL
    pub fn verify_url(&self) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), self.verify_path)
    }
}
