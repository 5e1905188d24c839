//! Classifier -> resolver -> policy pipeline

use crate::auth::Classification;
use crate::billing::SessionResolver;
use crate::config::EntitlementConfig;
use crate::policy::{self, EntitlementDecision};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Verifies access tokens against the configuration and billing provider
#[derive(Clone)]
pub struct Verifier {
    config: Arc<EntitlementConfig>,
    resolver: Arc<dyn SessionResolver>,
}

impl Verifier {
    pub fn new(config: Arc<EntitlementConfig>, resolver: Arc<dyn SessionResolver>) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &EntitlementConfig {
        &self.config
    }

    pub fn classify(&self, token: &str) -> Classification {
        Classification::classify(token, &self.config)
    }

    /// Verify a token at the current time
    pub async fn verify(&self, token: &str) -> EntitlementDecision {
        self.verify_at(token, Utc::now()).await
    }

    /// Verify a token at `now`. Performs at most one provider lookup.
    pub async fn verify_at(&self, token: &str, now: DateTime<Utc>) -> EntitlementDecision {
        let classification = self.classify(token);

        let session = match &classification {
            Classification::ProviderReference(reference) => {
                match self.resolver.resolve(reference).await {
                    Ok(session) => {
                        debug!(
                            reference = %reference.redacted(),
                            payment_status = %session.payment_status,
                            "Checkout session resolved"
                        );
                        Some(session)
                    }
                    Err(e) => {
                        warn!(reference = %reference.redacted(), error = %e, "Checkout session lookup failed");
                        None
                    }
                }
            }
            _ => None,
        };

        let decision = policy::evaluate(&classification, session.as_ref(), now, &self.config);

        info!(
            kind = classification.kind(),
            active = decision.active,
            level = %decision.level,
            reason = decision.reason().unwrap_or("-"),
            "Entitlement verified"
        );

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::{MemorySessionResolver, PaymentStatus, ProviderSession};
    use crate::policy::AccessLevel;
    use chrono::TimeDelta;

    fn verifier(resolver: Arc<MemorySessionResolver>) -> Verifier {
        let config = EntitlementConfig::builder("MASTER-DOMINANCE-2026")
            .guest_code("WAI-GUEST-7721")
            .build()
            .unwrap();
        Verifier::new(Arc::new(config), resolver)
    }

    #[tokio::test]
    async fn test_master_and_guest_skip_resolver() {
        let resolver = Arc::new(MemorySessionResolver::new());
        let verifier = verifier(resolver.clone());

        let d = verifier.verify("MASTER-DOMINANCE-2026").await;
        assert_eq!(d.level, AccessLevel::Master);

        let d = verifier.verify(" WAI-GUEST-7721 ").await;
        assert_eq!(d.level, AccessLevel::Guest);

        let d = verifier.verify("garbage").await;
        assert!(!d.active);

        assert_eq!(resolver.lookups(), 0);
    }

    #[tokio::test]
    async fn test_provider_reference_single_lookup() {
        let now = Utc::now();
        let resolver = Arc::new(
            MemorySessionResolver::new()
                .with_session("cs_test_123", ProviderSession::paid(now - TimeDelta::days(2), "price_week")),
        );
        let verifier = verifier(resolver.clone());

        let d = verifier.verify_at("cs_test_123", now).await;
        assert!(d.active);
        assert_eq!(d.level, AccessLevel::Paid);
        assert_eq!(d.redirect_target.as_deref(), Some("/premium-week"));
        assert_eq!(resolver.lookups(), 1);

        let later = verifier.verify_at("cs_test_123", now + TimeDelta::days(6)).await;
        assert_eq!(later.reason(), Some("expired"));
        assert_eq!(resolver.lookups(), 2);
    }

    #[tokio::test]
    async fn test_resolver_failure_is_denied() {
        let resolver = Arc::new(MemorySessionResolver::new());
        let verifier = verifier(resolver.clone());

        let d = verifier.verify("cs_live_unknown").await;
        assert!(!d.active);
        assert_eq!(d.reason(), Some("invalid_or_unavailable"));
        assert_eq!(resolver.lookups(), 1);
    }

    #[tokio::test]
    async fn test_unpaid_session() {
        let now = Utc::now();
        let resolver = Arc::new(MemorySessionResolver::new().with_session(
            "cs_test_pending",
            ProviderSession::new(PaymentStatus::Unpaid, now, Some("price_day".to_string())),
        ));
        let verifier = verifier(resolver);

        let d = verifier.verify_at("cs_test_pending", now).await;
        assert_eq!(d.reason(), Some("unpaid"));
    }
}
