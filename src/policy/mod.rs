//! Expiry policy
//!
//! Turns a classification plus optional provider evidence into an
//! [`EntitlementDecision`]. Pure: the caller supplies `now`.
//!
//! | classification       | session                 | outcome                          |
//! |----------------------|-------------------------|----------------------------------|
//! | master               | ignored                 | active, hub path                 |
//! | guest                | ignored                 | active, guest path               |
//! | provider reference   | not paid                | denied `unpaid`                  |
//! | provider reference   | unmapped price          | denied `unknown_product`         |
//! | provider reference   | `now >= created + dur`  | denied `expired`                 |
//! | provider reference   | `now < created + dur`   | active, tier path                |
//! | provider reference   | expiry overflows        | denied `invalid_or_unavailable`  |
//! | provider reference   | none (lookup failed)    | denied `invalid_or_unavailable`  |
//! | invalid              | ignored                 | denied `invalid_or_unavailable`  |

use crate::auth::{Classification, ProductTier};
use crate::billing::ProviderSession;
use crate::config::EntitlementConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Access level granted by a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Master,
    Guest,
    Paid,
    None,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Master => write!(f, "master"),
            AccessLevel::Guest => write!(f, "guest"),
            AccessLevel::Paid => write!(f, "paid"),
            AccessLevel::None => write!(f, "none"),
        }
    }
}

/// Why access was denied. Carried as a value, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DecisionError {
    #[error("Payment has not been completed.")]
    Unpaid,

    #[error("Unknown product.")]
    UnknownProduct,

    #[error("This session has expired.")]
    Expired,

    #[error("Invalid code.")]
    InvalidToken,
}

impl DecisionError {
    /// Stable machine-readable reason code
    pub fn reason(&self) -> &'static str {
        match self {
            DecisionError::Unpaid => "unpaid",
            DecisionError::UnknownProduct => "unknown_product",
            DecisionError::Expired => "expired",
            DecisionError::InvalidToken => "invalid_or_unavailable",
        }
    }
}

/// Outcome of one verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementDecision {
    pub active: bool,
    pub level: AccessLevel,
    pub redirect_target: Option<String>,
    pub denial: Option<DecisionError>,
    /// Set for paid access only
    pub tier: Option<ProductTier>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl EntitlementDecision {
    fn grant(level: AccessLevel, redirect_target: &str) -> Self {
        debug_assert!(!redirect_target.is_empty());
        Self {
            active: true,
            level,
            redirect_target: Some(redirect_target.to_string()),
            denial: None,
            tier: None,
            expires_at: None,
        }
    }

    pub fn deny(error: DecisionError) -> Self {
        Self {
            active: false,
            level: AccessLevel::None,
            redirect_target: None,
            denial: Some(error),
            tier: None,
            expires_at: None,
        }
    }

    pub fn reason(&self) -> Option<&'static str> {
        self.denial.map(|e| e.reason())
    }

    /// Human-readable denial message
    pub fn message(&self) -> Option<String> {
        self.denial.map(|e| e.to_string())
    }
}

/// Evaluate a classification against optional provider evidence at `now`
pub fn evaluate(
    classification: &Classification,
    session: Option<&ProviderSession>,
    now: DateTime<Utc>,
    config: &EntitlementConfig,
) -> EntitlementDecision {
    match classification {
        Classification::Master => EntitlementDecision::grant(AccessLevel::Master, config.hub_redirect()),
        Classification::Guest => EntitlementDecision::grant(AccessLevel::Guest, config.guest_redirect()),
        Classification::ProviderReference(_) => match session {
            Some(session) => evaluate_session(session, now, config),
            None => EntitlementDecision::deny(DecisionError::InvalidToken),
        },
        Classification::Invalid => EntitlementDecision::deny(DecisionError::InvalidToken),
    }
}

fn evaluate_session(
    session: &ProviderSession,
    now: DateTime<Utc>,
    config: &EntitlementConfig,
) -> EntitlementDecision {
    if !session.payment_status.is_paid() {
        return EntitlementDecision::deny(DecisionError::Unpaid);
    }

    let Some(rule) = session
        .price_id
        .as_deref()
        .and_then(|price_id| config.tiers().get(price_id))
    else {
        return EntitlementDecision::deny(DecisionError::UnknownProduct);
    };

    // Unrepresentable expiry means the provider timestamp is not usable evidence
    let Some(expiry) = session.created_at.checked_add_signed(rule.duration) else {
        return EntitlementDecision::deny(DecisionError::InvalidToken);
    };

    if now < expiry {
        let mut decision = EntitlementDecision::grant(AccessLevel::Paid, &rule.redirect_path);
        decision.tier = Some(rule.tier);
        decision.expires_at = Some(expiry);
        decision
    } else {
        EntitlementDecision::deny(DecisionError::Expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionReference;
    use crate::billing::PaymentStatus;
    use chrono::{TimeDelta, TimeZone};

    fn config() -> EntitlementConfig {
        EntitlementConfig::builder("MASTER-DOMINANCE-2026")
            .guest_code("WAI-GUEST-7721")
            .build()
            .unwrap()
    }

    fn reference() -> Classification {
        Classification::ProviderReference(SessionReference::parse("cs_test_123").unwrap())
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_master_ignores_session() {
        let config = config();
        let stale = ProviderSession::new(PaymentStatus::Unpaid, t0(), None);

        for session in [None, Some(&stale)] {
            let d = evaluate(&Classification::Master, session, t0() + TimeDelta::days(9000), &config);
            assert!(d.active);
            assert_eq!(d.level, AccessLevel::Master);
            assert_eq!(d.redirect_target.as_deref(), Some("/premium/hub"));
            assert!(d.expires_at.is_none());
        }
    }

    #[test]
    fn test_guest_redirect() {
        let d = evaluate(&Classification::Guest, None, t0(), &config());
        assert!(d.active);
        assert_eq!(d.level, AccessLevel::Guest);
        assert_eq!(d.redirect_target.as_deref(), Some("/premium-month"));
    }

    #[test]
    fn test_week_boundary() {
        let config = config();
        let session = ProviderSession::paid(t0(), "price_week");

        let d = evaluate(&reference(), Some(&session), t0() + TimeDelta::days(6), &config);
        assert!(d.active);
        assert_eq!(d.level, AccessLevel::Paid);
        assert_eq!(d.redirect_target.as_deref(), Some("/premium-week"));
        assert_eq!(d.tier, Some(ProductTier::Week));
        assert_eq!(d.expires_at, Some(t0() + TimeDelta::days(7)));

        let just_before = t0() + TimeDelta::days(7) - TimeDelta::milliseconds(1);
        assert!(evaluate(&reference(), Some(&session), just_before, &config).active);

        let at_expiry = evaluate(&reference(), Some(&session), t0() + TimeDelta::days(7), &config);
        assert!(!at_expiry.active);
        assert_eq!(at_expiry.reason(), Some("expired"));

        let after = t0() + TimeDelta::days(7) + TimeDelta::milliseconds(1);
        let d = evaluate(&reference(), Some(&session), after, &config);
        assert!(!d.active);
        assert_eq!(d.level, AccessLevel::None);
        assert_eq!(d.reason(), Some("expired"));
        assert_eq!(d.message().as_deref(), Some("This session has expired."));
    }

    #[test]
    fn test_expiry_is_monotonic() {
        let config = config();
        let session = ProviderSession::paid(t0(), "price_day");

        let mut was_active = true;
        let mut transitions = 0;
        for hour in 0..72 {
            let active = evaluate(&reference(), Some(&session), t0() + TimeDelta::hours(hour), &config).active;
            if active != was_active {
                transitions += 1;
                assert!(!active, "access came back at hour {}", hour);
            }
            was_active = active;
        }
        assert_eq!(transitions, 1);
    }

    #[test]
    fn test_unpaid_regardless_of_time() {
        let config = config();
        let session = ProviderSession::new(
            PaymentStatus::Other("requires_action".to_string()),
            t0(),
            Some("price_week".to_string()),
        );

        for offset in [-1, 0, 1, 6, 30] {
            let d = evaluate(&reference(), Some(&session), t0() + TimeDelta::days(offset), &config);
            assert!(!d.active);
            assert_eq!(d.reason(), Some("unpaid"));
        }
    }

    #[test]
    fn test_unknown_product() {
        let config = config();

        let session = ProviderSession::paid(t0(), "price_lifetime");
        let d = evaluate(&reference(), Some(&session), t0(), &config);
        assert!(!d.active);
        assert_eq!(d.reason(), Some("unknown_product"));

        let session = ProviderSession::new(PaymentStatus::Paid, t0(), None);
        let d = evaluate(&reference(), Some(&session), t0(), &config);
        assert_eq!(d.denial, Some(DecisionError::UnknownProduct));
    }

    #[test]
    fn test_invalid_and_unavailable() {
        let config = config();

        let d = evaluate(&Classification::Invalid, None, t0(), &config);
        assert!(!d.active);
        assert_eq!(d.level, AccessLevel::None);
        assert_eq!(d.reason(), Some("invalid_or_unavailable"));
        assert_eq!(d.message().as_deref(), Some("Invalid code."));

        let d = evaluate(&reference(), None, t0(), &config);
        assert!(!d.active);
        assert_eq!(d.reason(), Some("invalid_or_unavailable"));
    }

    #[test]
    fn test_expiry_overflow_denied() {
        let config = config();
        let created = DateTime::<Utc>::MAX_UTC - TimeDelta::days(1);
        let session = ProviderSession::paid(created, "price_week");

        for now in [t0(), created, DateTime::<Utc>::MAX_UTC] {
            let d = evaluate(&reference(), Some(&session), now, &config);
            assert!(!d.active);
            assert_eq!(d.level, AccessLevel::None);
            assert_eq!(d.denial, Some(DecisionError::InvalidToken));
            assert!(d.expires_at.is_none());
        }
    }

    #[test]
    fn test_active_decisions_carry_target() {
        let config = config();
        let session = ProviderSession::paid(t0(), "price_month");

        for classification in [Classification::Master, Classification::Guest, reference()] {
            let d = evaluate(&classification, Some(&session), t0(), &config);
            assert!(d.active);
            assert_ne!(d.level, AccessLevel::None);
            assert!(!d.redirect_target.unwrap().is_empty());
        }
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let config = config();
        let session = ProviderSession::paid(t0(), "price_week");
        let now = t0() + TimeDelta::days(3);

        let first = evaluate(&reference(), Some(&session), now, &config);
        let second = evaluate(&reference(), Some(&session), now, &config);
        assert_eq!(first, second);
    }
}
