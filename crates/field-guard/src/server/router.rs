//! Axum router construction.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// Only `/guard` sits behind the response-encryption hook; `/reveal` exists
/// to return plaintext.
pub fn build(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/guard", post(handlers::guard))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::encrypt_json_responses,
        ));

    Router::new()
        .merge(guarded)
        .route("/reveal", post(handlers::reveal))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::crypto::{CryptoCore, Secret};
    use crate::guard::{GuardConfig, SensitiveFields};

    fn enabled_state() -> AppState {
        AppState::new(
            GuardConfig {
                enabled: true,
                key: Secret::new("router-test"),
                fields: SensitiveFields::new(["medicalHistory", "phoneNumber"]),
            },
            CryptoCore::new(),
        )
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = build(AppState::default());
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn health_route_exists() {
        let app = build(AppState::default());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn single_envelope_decryption_is_not_exposed() {
        let state = enabled_state();
        let key = &state.guard.config().key;
        let sealed = CryptoCore::new().encrypt("asthma", key).unwrap();
        let req = Request::builder()
            .method("POST")
            .uri("/decrypt")
            .header("content-type", "application/json")
            .body(Body::from(json!({"ciphertext": sealed}).to_string()))
            .unwrap();
        let resp = build(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 404);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(!String::from_utf8_lossy(&bytes).contains("asthma"));
    }

    #[tokio::test]
    async fn guard_route_encrypts_sensitive_fields() {
        let state = enabled_state();
        let body = json!({"payload": {
            "medicalHistory": "asthma",
            "phoneNumber": "+254700000000",
            "age": 30
        }});
        let req = Request::builder()
            .method("POST")
            .uri("/guard")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = build(state.clone()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        let payload = &v["payload"];
        assert_eq!(payload["age"], 30);
        assert_eq!(payload["medicalHistory_encrypted"], true);
        assert_eq!(payload["phoneNumber_encrypted"], true);
        let history = payload["medicalHistory"].as_str().unwrap();
        let key = &state.guard.config().key;
        assert_eq!(CryptoCore::new().decrypt(history, key).unwrap(), "asthma");
    }
}
