//! Wealthgate server implementation
//!
//! Exposes the verifier over HTTP (`POST /api/verify-vip`, `GET /health`).

pub mod http;
pub mod messages;
mod service;

pub use http::{create_router, serve_listener, AppState, VERIFY_PATH};
pub use messages::{InvalidInputError, VerifyRequest, VerifyResponse};
pub use service::{GateServer, GateServerConfig};
