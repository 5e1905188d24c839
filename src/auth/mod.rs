//! Access token classification and product tiers
//!
//! Token kinds:
//! - master: configured override secret, never expires
//! - guest: member of the configured guest-code set, never expires
//! - `cs_` prefix: checkout session reference, expiry derived from the billing provider
//!
//! Tiers:
//! - `day`: 1 day of access
//! - `week`: 7 days of access
//! - `month`: 30 days of access

mod tiers;
mod tokens;

pub use tiers::{ProductTier, TierRule, TierTable};
pub(crate) use tokens::constant_time_eq;
pub use tokens::{Classification, MasterKey, SessionReference, SESSION_REFERENCE_PREFIX};
