//! Axum HTTP surface and the response-encryption hook.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Apply the field guard to outbound JSON through [`middleware::encrypt_json_responses`].
//! - Inject shared application state (`AppState`) into handlers.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
