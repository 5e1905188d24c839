//! Wealthgate Rust Client
//!
//! Submits access codes to a Wealthgate server and remembers the last
//! accepted code, the way the premium pages keep it in browser storage.
//! The stored code carries no expiry of its own: every [`GateClient::resume`]
//! re-verifies it with the server.
//!
//! # Example
//!
//! ```no_run
//! use wealthgate_client::{FileTokenStore, GateClient, GateConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GateConfig::new("https://wealthyai.example.com");
//!     let store = FileTokenStore::new("/tmp/wealthgate.json");
//!     let client = GateClient::new(config, store)?;
//!
//!     let outcome = client.verify("WAI-GUEST-7721").await?;
//!     if outcome.active {
//!         println!("Go to {}", outcome.redirect_path.unwrap_or_default());
//!     }
//!
//!     // Later, e.g. on page reload
//!     if let Some(outcome) = client.resume().await? {
//!         println!("Still active: {}", outcome.active);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod messages;
mod store;

pub use client::GateClient;
pub use config::GateConfig;
pub use error::{GateError, Result};
pub use messages::{VerifyRequest, VerifyResponse};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_STORAGE_KEY};
