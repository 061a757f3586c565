//! Axum middleware layers applied to the router.
//!
//! [`encrypt_json_responses`] is the response hook: it buffers JSON bodies,
//! runs them through the [`FieldGuard`](crate::guard::FieldGuard), and
//! re-emits them. Anything that is not JSON passes through byte for byte.

use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use bytes::Bytes;
use guard_common::ServiceError;
use serde_json::Value;
use tracing::warn;

use super::handlers::error_response;
use super::state::AppState;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest response body the guard will buffer.
pub const MAX_GUARDED_BODY: usize = 8 * 1024 * 1024;

/// Encrypt sensitive fields of every `application/json` response.
pub async fn encrypt_json_responses(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;
    if !state.guard.config().enabled || !is_json(response.headers()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_GUARDED_BODY).await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "could not buffer response body for encryption");
            return error_response(&ServiceError::Internal("response unavailable".into()));
        }
    };

    let value: Value = match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        // Mislabelled body; nothing we can safely rewrite.
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };

    let guard = state.guard.clone();
    let guarded = match tokio::task::spawn_blocking(move || guard.guard(value)).await {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "response guard task failed");
            return error_response(&ServiceError::Internal("response unavailable".into()));
        }
    };

    let body: Bytes = match serde_json::to_vec(&guarded) {
        Ok(b) => b.into(),
        Err(e) => {
            warn!(error = %e, "could not re-serialise guarded response");
            return error_response(&ServiceError::Internal("response unavailable".into()));
        }
    };
    parts
        .headers
        .insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
    Response::from_parts(parts, Body::from(body))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::crypto::{looks_encrypted, CryptoCore, Secret};
    use crate::guard::{GuardConfig, SensitiveFields};

    fn enabled_state() -> AppState {
        AppState::new(
            GuardConfig {
                enabled: true,
                key: Secret::new("middleware-test"),
                fields: SensitiveFields::new(["diagnosis"]),
            },
            CryptoCore::new(),
        )
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route(
                "/json",
                get(|| async { Json(json!({"diagnosis": "flu", "id": 3})) }),
            )
            .route("/text", get(|| async { "diagnosis" }))
            .layer(from_fn_with_state(state.clone(), encrypt_json_responses))
            .with_state(state)
    }

    async fn body_of(resp: Response) -> Bytes {
        axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    fn get_req(uri: &str) -> Request {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn json_bodies_are_guarded() {
        let state = enabled_state();
        let resp = app(state.clone()).oneshot(get_req("/json")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let declared: usize = resp.headers()[header::CONTENT_LENGTH]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();

        let body = body_of(resp).await;
        assert_eq!(declared, body.len());
        let v: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["id"], 3);
        assert_eq!(v["diagnosis_encrypted"], true);
        let sealed = v["diagnosis"].as_str().unwrap();
        assert!(looks_encrypted(sealed));
        let key = &state.guard.config().key;
        assert_eq!(CryptoCore::new().decrypt(sealed, key).unwrap(), "flu");
    }

    #[tokio::test]
    async fn non_json_bodies_pass_through() {
        let resp = app(enabled_state()).oneshot(get_req("/text")).await.unwrap();
        assert_eq!(&body_of(resp).await[..], b"diagnosis");
    }

    #[tokio::test]
    async fn disabled_guard_passes_json_through() {
        let resp = app(AppState::default()).oneshot(get_req("/json")).await.unwrap();
        let v: Value = serde_json::from_slice(&body_of(resp).await).unwrap();
        assert_eq!(v, json!({"diagnosis": "flu", "id": 3}));
    }

    #[test]
    fn content_type_detection() {
        let mut h = HeaderMap::new();
        assert!(!is_json(&h));
        h.insert(header::CONTENT_TYPE, "application/json; charset=utf-8".parse().unwrap());
        assert!(is_json(&h));
        h.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        assert!(!is_json(&h));
    }
}
