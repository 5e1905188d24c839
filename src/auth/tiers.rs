//! Product tiers and the price table

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Purchasable access durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductTier {
    /// Single-day pass
    Day,
    /// Seven-day pass
    Week,
    /// Thirty-day pass
    Month,
}

impl ProductTier {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "day" | "single-day" | "single_day" => Some(ProductTier::Day),
            "week" => Some(ProductTier::Week),
            "month" => Some(ProductTier::Month),
            _ => None,
        }
    }

    /// Access duration granted from checkout creation
    pub fn duration(&self) -> TimeDelta {
        match self {
            ProductTier::Day => TimeDelta::days(1),
            ProductTier::Week => TimeDelta::days(7),
            ProductTier::Month => TimeDelta::days(30),
        }
    }

    pub fn default_redirect(&self) -> &'static str {
        match self {
            ProductTier::Day => "/premium-day",
            ProductTier::Week => "/premium-week",
            ProductTier::Month => "/premium-month",
        }
    }
}

impl fmt::Display for ProductTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductTier::Day => write!(f, "day"),
            ProductTier::Week => write!(f, "week"),
            ProductTier::Month => write!(f, "month"),
        }
    }
}

/// A price id resolved to its tier, duration and landing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierRule {
    pub tier: ProductTier,
    pub duration: TimeDelta,
    pub redirect_path: String,
}

impl TierRule {
    pub fn new(tier: ProductTier) -> Self {
        Self {
            tier,
            duration: tier.duration(),
            redirect_path: tier.default_redirect().to_string(),
        }
    }

    pub fn with_redirect(mut self, path: impl Into<String>) -> Self {
        self.redirect_path = path.into();
        self
    }
}

/// Price id -> tier rule lookup
#[derive(Debug, Clone, Default)]
pub struct TierTable {
    rules: HashMap<String, TierRule>,
}

impl TierTable {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn insert(&mut self, price_id: impl Into<String>, rule: TierRule) {
        self.rules.insert(price_id.into(), rule);
    }

    pub fn get(&self, price_id: &str) -> Option<&TierRule> {
        self.rules.get(price_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules sorted by price id, for stable listing
    pub fn entries(&self) -> Vec<(&str, &TierRule)> {
        let mut entries: Vec<_> = self.rules.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl FromIterator<(String, TierRule)> for TierTable {
    fn from_iter<T: IntoIterator<Item = (String, TierRule)>>(iter: T) -> Self {
        let mut table = TierTable::new();
        for (price_id, rule) in iter {
            table.insert(price_id, rule);
        }
        table
    }
}
