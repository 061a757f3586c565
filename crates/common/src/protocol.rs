//! Request and response bodies of the HTTP surface.

use serde::{Deserialize, Serialize};

use crate::ServiceError;

// ---------------------------------------------------------------------------
// Guard / reveal endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /guard` and `POST /reveal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadRequest {
    /// Arbitrary JSON value to process.
    pub payload: serde_json::Value,
}

/// Successful response body for `POST /guard` and `POST /reveal`.
///
/// For `/guard`, sensitive fields in `payload` are base64 envelopes, each
/// accompanied by a `"<field>_encrypted": true` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadResponse {
    pub payload: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` once the server is accepting requests.
    pub status: String,
    /// Whether outbound responses are being encrypted.
    pub encryption_enabled: bool,
    /// Number of configured sensitive field names.
    pub sensitive_fields: usize,
}
