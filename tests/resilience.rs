//! Resilience tests for the verifier
//!
//! These tests verify behavior under failure and load:
//! - Concurrent verifications sharing one verifier
//! - Resolver panics surfacing as internal errors
//! - Repeated verification yielding identical decisions

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wealthgate::auth::SessionReference;
use wealthgate::billing::{MemorySessionResolver, ProviderSession, ResolverError, SessionResolver};
use wealthgate::server::{serve_listener, AppState, VerifyResponse, VERIFY_PATH};
use wealthgate::{EntitlementConfig, Verifier};

fn config() -> Arc<EntitlementConfig> {
    Arc::new(
        EntitlementConfig::builder("MASTER-DOMINANCE-2026")
            .guest_code("WAI-GUEST-7721")
            .build()
            .unwrap(),
    )
}

/// Resolver that panics on every lookup
struct PanickingResolver {
    calls: AtomicUsize,
}

#[async_trait]
impl SessionResolver for PanickingResolver {
    async fn resolve(&self, _reference: &SessionReference) -> Result<ProviderSession, ResolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("resolver exploded");
    }
}

async fn start(verifier: Verifier) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        serve_listener(listener, AppState { verifier }).await.unwrap();
    });
    addr
}

/// Test that a panicking resolver yields a 500 denial and the server keeps serving
#[tokio::test]
async fn test_resolver_panic_is_internal_error() {
    let resolver = Arc::new(PanickingResolver {
        calls: AtomicUsize::new(0),
    });
    let addr = start(Verifier::new(config(), resolver.clone())).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}{}", addr, VERIFY_PATH);

    let response = client
        .post(&url)
        .json(&serde_json::json!({ "vipCode": "cs_test_boom" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);
    let body: VerifyResponse = response.json().await.unwrap();
    assert!(!body.active);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);

    // Non-provider codes never touch the resolver
    let response = client
        .post(&url)
        .json(&serde_json::json!({ "vipCode": "WAI-GUEST-7721" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: VerifyResponse = response.json().await.unwrap();
    assert!(body.active);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
}

/// Test that many concurrent verifications agree and each does one lookup
#[tokio::test]
async fn test_concurrent_verifications() {
    let now = Utc::now();
    let resolver = Arc::new(
        MemorySessionResolver::new()
            .with_session("cs_test_123", ProviderSession::paid(now - TimeDelta::days(2), "price_week")),
    );
    let verifier = Verifier::new(config(), resolver.clone());

    let codes = ["MASTER-DOMINANCE-2026", "WAI-GUEST-7721", "cs_test_123", "garbage"];
    let mut handles = vec![];
    for i in 0..200 {
        let verifier = verifier.clone();
        let code = codes[i % codes.len()];
        handles.push(tokio::spawn(async move { (code, verifier.verify_at(code, now).await) }));
    }

    for handle in handles {
        let (code, decision) = handle.await.unwrap();
        assert_eq!(decision.active, code != "garbage", "code {}", code);
    }

    assert_eq!(resolver.lookups(), 50);
}

/// Test that verifying the same token at the same instant is idempotent
#[tokio::test]
async fn test_repeated_verification_is_stable() {
    let now = Utc::now();
    let resolver = Arc::new(
        MemorySessionResolver::new()
            .with_session("cs_test_123", ProviderSession::paid(now - TimeDelta::days(2), "price_week")),
    );
    let verifier = Verifier::new(config(), resolver);

    let first = verifier.verify_at("cs_test_123", now).await;
    for _ in 0..10 {
        assert_eq!(verifier.verify_at("cs_test_123", now).await, first);
    }
}
