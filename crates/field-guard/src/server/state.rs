//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::crypto::{CryptoCore, Secret};
use crate::guard::{FieldGuard, GuardConfig, SensitiveFields};

/// Application state shared across all request handlers.
///
/// Cheap to clone: the guard is `Arc`-wrapped.
#[derive(Clone)]
pub struct AppState {
    /// Response field guard, owning the secret and the sensitive field set.
    pub guard: Arc<FieldGuard>,
}

impl AppState {
    pub fn new(config: GuardConfig, core: CryptoCore) -> Self {
        Self {
            guard: Arc::new(FieldGuard::new(config, core)),
        }
    }
}

impl Default for AppState {
    /// Creates a pass-through [`AppState`] (encryption disabled), suitable for tests.
    fn default() -> Self {
        Self::new(
            GuardConfig {
                enabled: false,
                key: Secret::new("test-only-secret"),
                fields: SensitiveFields::clinic_defaults(),
            },
            CryptoCore::new(),
        )
    }
}
