//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use guard_common::protocol::{ErrorResponse, HealthResponse, PayloadRequest, PayloadResponse};
use guard_common::ServiceError;
use tracing::{debug, warn};

use super::state::AppState;

/// Render a [`ServiceError`] as a JSON error response.
pub fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}

/// Unwrap a JSON body or turn axum's rejection into a `400` [`ErrorResponse`].
fn payload(body: Result<Json<PayloadRequest>, JsonRejection>) -> Result<PayloadRequest, Response> {
    body.map(|Json(req)| req).map_err(|rejection| {
        debug!(error = %rejection, "rejected request body");
        error_response(&ServiceError::BadRequest(rejection.body_text()))
    })
}

/// `POST /guard`: return the payload as the application would.
///
/// The route is wrapped in the response-encryption middleware, so what the
/// caller receives has every sensitive field sealed.
pub async fn guard(body: Result<Json<PayloadRequest>, JsonRejection>) -> Response {
    match payload(body) {
        Ok(req) => Json(PayloadResponse {
            payload: req.payload,
        })
        .into_response(),
        Err(resp) => resp,
    }
}

/// `POST /reveal`: decrypt every flagged field in the payload.
///
/// Fields that fail to decrypt are returned still sealed.
pub async fn reveal(
    State(state): State<AppState>,
    body: Result<Json<PayloadRequest>, JsonRejection>,
) -> Response {
    let req = match payload(body) {
        Ok(req) => req,
        Err(resp) => return resp,
    };
    let guard = state.guard.clone();
    match tokio::task::spawn_blocking(move || guard.reveal(req.payload)).await {
        Ok(payload) => (StatusCode::OK, Json(PayloadResponse { payload })).into_response(),
        Err(e) => {
            warn!(error = %e, "reveal task failed");
            error_response(&ServiceError::Internal("reveal failed".into()))
        }
    }
}

/// `GET /health`: liveness check plus guard status.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cfg = state.guard.config();
    Json(HealthResponse {
        status: "ok".into(),
        encryption_enabled: cfg.enabled,
        sensitive_fields: cfg.fields.len(),
    })
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}
