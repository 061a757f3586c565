//! Where per-field failures go.
//!
//! Reports carry the field name and the error kind only. Plaintext values and
//! the secret never reach a reporter.

use tracing::warn;

use crate::crypto::CryptoError;

/// Receives per-field failures that the guard swallowed.
#[cfg_attr(test, mockall::automock)]
pub trait FailureReporter: Send + Sync {
    /// A sensitive field could not be encrypted and was sent as plaintext.
    fn seal_failed(&self, field: &str, error: &CryptoError);

    /// A flagged field could not be decrypted and was left sealed.
    fn reveal_failed(&self, field: &str, error: &CryptoError);
}

/// Default reporter: a `tracing` warning per failed field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn seal_failed(&self, field: &str, error: &CryptoError) {
        warn!(
            field,
            error_kind = error.kind(),
            "sensitive field sent unencrypted"
        );
    }

    fn reveal_failed(&self, field: &str, error: &CryptoError) {
        warn!(
            field,
            error_kind = error.kind(),
            "encrypted field could not be revealed"
        );
    }
}
