//! Wealthgate - entitlement verification for WealthyAI premium pages
//!
//! Classifies presented access codes (master, guest, checkout session
//! reference), resolves checkout sessions with the billing provider, and
//! decides whether access is still active and where to send the visitor.

pub mod auth;
pub mod billing;
pub mod config;
pub mod policy;
pub mod server;
pub mod verifier;

pub use auth::{Classification, ProductTier, TierRule, TierTable};
pub use billing::{ProviderSession, SessionResolver};
pub use config::EntitlementConfig;
pub use policy::{AccessLevel, DecisionError, EntitlementDecision};
pub use server::GateServer;
pub use verifier::Verifier;
