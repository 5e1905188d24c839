//! Entitlement configuration
//!
//! Loaded once at process start and shared read-only. Sources, in order:
//! 1. TOML file (optional)
//! 2. `WEALTHGATE_MASTER_SECRET` / `WEALTHGATE_GUEST_CODES` environment overrides
//!    (blank values leave the file values in place)
//!
//! ```toml
//! master_secret = "MASTER-DOMINANCE-2026"
//! guest_codes = ["WAI-GUEST-7721"]
//! hub_redirect = "/premium/hub"
//! guest_redirect = "/premium-month"
//!
//! [tiers.price_week]
//! tier = "week"
//! redirect_path = "/premium-week"
//! ```

use crate::auth::{constant_time_eq, MasterKey, ProductTier, TierRule, TierTable, SESSION_REFERENCE_PREFIX};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_HUB_REDIRECT: &str = "/premium/hub";
pub const DEFAULT_GUEST_REDIRECT: &str = "/premium-month";

pub const MASTER_SECRET_ENV: &str = "WEALTHGATE_MASTER_SECRET";
pub const GUEST_CODES_ENV: &str = "WEALTHGATE_GUEST_CODES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("master secret is not set")]
    MissingMasterSecret,

    #[error("guest code cannot be blank")]
    BlankGuestCode,

    #[error("guest code collides with {0}")]
    GuestCodeCollision(&'static str),

    #[error("unknown tier '{tier}' for price '{price_id}'")]
    UnknownTier { price_id: String, tier: String },

    #[error("redirect path must start with '/': {0}")]
    InvalidRedirect(String),
}

/// File representation, every field optional so env can fill the gaps
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    master_secret: Option<String>,
    #[serde(default)]
    guest_codes: Vec<String>,
    hub_redirect: Option<String>,
    guest_redirect: Option<String>,
    #[serde(default)]
    tiers: BTreeMap<String, RawTier>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTier {
    tier: String,
    redirect_path: Option<String>,
}

/// Immutable verifier configuration
#[derive(Clone)]
pub struct EntitlementConfig {
    master_key: MasterKey,
    guest_codes: HashSet<String>,
    hub_redirect: String,
    guest_redirect: String,
    tiers: TierTable,
}

impl EntitlementConfig {
    pub fn builder(master_secret: impl Into<String>) -> EntitlementConfigBuilder {
        EntitlementConfigBuilder::new(master_secret)
    }

    /// Load from a TOML file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_raw(read_raw(path)?, EnvOverrides::from_env())
    }

    /// Load from environment variables only, using the built-in tier table
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_raw(RawConfig::default(), EnvOverrides::from_env())
    }

    /// Load from `path` when given, otherwise from the environment alone
    pub fn load_or_env(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::from_env(),
        }
    }

    /// Parse TOML content without consulting the environment
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::from_raw(parse_raw(content)?, EnvOverrides::default())
    }

    fn from_raw(raw: RawConfig, env: EnvOverrides) -> Result<Self, ConfigError> {
        let master_secret = env
            .master_secret
            .or(raw.master_secret)
            .ok_or(ConfigError::MissingMasterSecret)?;

        let mut builder = EntitlementConfigBuilder::new(master_secret);

        let guest_codes = env.guest_codes.unwrap_or(raw.guest_codes);
        for code in guest_codes {
            builder = builder.guest_code(code);
        }

        if let Some(path) = raw.hub_redirect {
            builder = builder.hub_redirect(path);
        }
        if let Some(path) = raw.guest_redirect {
            builder = builder.guest_redirect(path);
        }

        if !raw.tiers.is_empty() {
            builder = builder.clear_tiers();
            for (price_id, entry) in raw.tiers {
                let tier = ProductTier::parse(&entry.tier).ok_or_else(|| ConfigError::UnknownTier {
                    price_id: price_id.clone(),
                    tier: entry.tier.clone(),
                })?;
                let mut rule = TierRule::new(tier);
                if let Some(path) = entry.redirect_path {
                    rule = rule.with_redirect(path);
                }
                builder = builder.tier(price_id, rule);
            }
        }

        builder.build()
    }

    pub fn master_key(&self) -> &MasterKey {
        &self.master_key
    }

    /// Every configured code is compared so the time taken does not reveal a near match
    pub fn is_guest_code(&self, token: &str) -> bool {
        self.guest_codes
            .iter()
            .fold(false, |found, code| constant_time_eq(code, token) | found)
    }

    pub fn guest_code_count(&self) -> usize {
        self.guest_codes.len()
    }

    pub fn hub_redirect(&self) -> &str {
        &self.hub_redirect
    }

    pub fn guest_redirect(&self) -> &str {
        &self.guest_redirect
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }
}

impl fmt::Debug for EntitlementConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitlementConfig")
            .field("master_key", &self.master_key)
            .field("guest_codes", &format_args!("[{} REDACTED]", self.guest_codes.len()))
            .field("hub_redirect", &self.hub_redirect)
            .field("guest_redirect", &self.guest_redirect)
            .field("tiers", &self.tiers.len())
            .finish()
    }
}

/// Builder with the default price table (`price_day`, `price_week`, `price_month`)
pub struct EntitlementConfigBuilder {
    master_secret: String,
    guest_codes: Vec<String>,
    hub_redirect: String,
    guest_redirect: String,
    tiers: TierTable,
}

impl EntitlementConfigBuilder {
    fn new(master_secret: impl Into<String>) -> Self {
        let tiers = [
            ("price_day", ProductTier::Day),
            ("price_week", ProductTier::Week),
            ("price_month", ProductTier::Month),
        ]
        .into_iter()
        .map(|(id, tier)| (id.to_string(), TierRule::new(tier)))
        .collect();

        Self {
            master_secret: master_secret.into(),
            guest_codes: Vec::new(),
            hub_redirect: DEFAULT_HUB_REDIRECT.to_string(),
            guest_redirect: DEFAULT_GUEST_REDIRECT.to_string(),
            tiers,
        }
    }

    pub fn guest_code(mut self, code: impl Into<String>) -> Self {
        self.guest_codes.push(code.into());
        self
    }

    pub fn hub_redirect(mut self, path: impl Into<String>) -> Self {
        self.hub_redirect = path.into();
        self
    }

    pub fn guest_redirect(mut self, path: impl Into<String>) -> Self {
        self.guest_redirect = path.into();
        self
    }

    pub fn clear_tiers(mut self) -> Self {
        self.tiers = TierTable::new();
        self
    }

    pub fn tier(mut self, price_id: impl Into<String>, rule: TierRule) -> Self {
        self.tiers.insert(price_id, rule);
        self
    }

    pub fn build(self) -> Result<EntitlementConfig, ConfigError> {
        let master_secret = self.master_secret.trim().to_string();
        if master_secret.is_empty() {
            return Err(ConfigError::MissingMasterSecret);
        }

        let mut guest_codes = HashSet::new();
        for code in self.guest_codes {
            let code = code.trim().to_string();
            if code.is_empty() {
                return Err(ConfigError::BlankGuestCode);
            }
            if code == master_secret {
                return Err(ConfigError::GuestCodeCollision("the master secret"));
            }
            if code.starts_with(SESSION_REFERENCE_PREFIX) {
                return Err(ConfigError::GuestCodeCollision("the session reference prefix"));
            }
            guest_codes.insert(code);
        }

        validate_redirect(&self.hub_redirect)?;
        validate_redirect(&self.guest_redirect)?;
        for (_, rule) in self.tiers.entries() {
            validate_redirect(&rule.redirect_path)?;
        }

        Ok(EntitlementConfig {
            master_key: MasterKey::new(master_secret),
            guest_codes,
            hub_redirect: self.hub_redirect,
            guest_redirect: self.guest_redirect,
            tiers: self.tiers,
        })
    }
}

fn validate_redirect(path: &str) -> Result<(), ConfigError> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::InvalidRedirect(path.to_string()))
    }
}

fn read_raw(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_raw(&content)
}

fn parse_raw(content: &str) -> Result<RawConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Environment values that replace file values. Blank variables count as unset.
#[derive(Debug, Default)]
struct EnvOverrides {
    master_secret: Option<String>,
    guest_codes: Option<Vec<String>>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            master_secret: lookup(MASTER_SECRET_ENV).filter(|s| !s.trim().is_empty()),
            guest_codes: lookup(GUEST_CODES_ENV)
                .map(|s| parse_code_list(&s))
                .filter(|codes| !codes.is_empty()),
        }
    }
}

/// Split a comma-separated code list, dropping blanks
pub fn parse_code_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
