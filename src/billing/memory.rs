//! In-memory session table

use crate::auth::SessionReference;
use crate::billing::{ProviderSession, ResolverError, SessionResolver};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Resolver backed by a fixed map; unknown references are unavailable
#[derive(Debug, Default)]
pub struct MemorySessionResolver {
    sessions: HashMap<String, ProviderSession>,
    lookups: AtomicUsize,
}

impl MemorySessionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, reference: impl Into<String>, session: ProviderSession) -> Self {
        self.sessions.insert(reference.into(), session);
        self
    }

    /// Number of resolve calls served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionResolver for MemorySessionResolver {
    async fn resolve(&self, reference: &SessionReference) -> Result<ProviderSession, ResolverError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.sessions
            .get(reference.as_str())
            .cloned()
            .ok_or_else(|| ResolverError::Unavailable(format!("no such session: {}", reference.redacted())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_memory_resolver() {
        let now = Utc::now();
        let resolver = MemorySessionResolver::new()
            .with_session("cs_test_1", ProviderSession::paid(now, "price_week"));

        let found = resolver
            .resolve(&SessionReference::parse("cs_test_1").unwrap())
            .await
            .unwrap();
        assert_eq!(found.price_id.as_deref(), Some("price_week"));

        let missing = resolver
            .resolve(&SessionReference::parse("cs_test_2").unwrap())
            .await;
        assert!(matches!(missing, Err(ResolverError::Unavailable(_))));

        assert_eq!(resolver.lookups(), 2);
    }
}
