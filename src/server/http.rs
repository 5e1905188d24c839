//! HTTP server implementation

use crate::server::messages::{InvalidInputError, VerifyRequest, VerifyResponse};
use crate::verifier::Verifier;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

pub const VERIFY_PATH: &str = "/api/verify-vip";

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub verifier: Verifier,
}

/// Create the HTTP router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(VERIFY_PATH, post(verify_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn verify_handler(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> (StatusCode, Json<VerifyResponse>) {
    let request_id = Uuid::new_v4();
    let span = info_span!("verify", request_id = %request_id);

    async move {
        let request = match payload {
            Ok(Json(request)) => request,
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "Rejected verification request");
                let error = InvalidInputError::Malformed(rejection.body_text());
                return (StatusCode::BAD_REQUEST, Json(VerifyResponse::from(error)));
            }
        };

        let code = match request.code() {
            Ok(code) => code.to_string(),
            Err(e) => return (StatusCode::BAD_REQUEST, Json(VerifyResponse::from(e))),
        };

        // Run on its own task so a panic inside a resolver surfaces as a 500
        let verifier = state.verifier.clone();
        match tokio::spawn(async move { verifier.verify(&code).await }.in_current_span()).await {
            Ok(decision) => (StatusCode::OK, Json(VerifyResponse::from(decision))),
            Err(e) => {
                error!(error = %e, "Verification task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(VerifyResponse::denied("Internal error.")),
                )
            }
        }
    }
    .instrument(span)
    .await
}

/// Serve on an already-bound listener
pub async fn serve_listener(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
