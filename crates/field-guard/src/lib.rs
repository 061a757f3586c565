//! Field-level encryption of sensitive values in outbound JSON responses.
//!
//! - [`crypto`]: PBKDF2-SHA-512 key derivation, AES-256-GCM envelopes,
//!   SHA-512 hashing, HMAC-SHA-512 signing.
//! - [`guard`]: walks a JSON payload and seals every configured sensitive
//!   string field, flagging it with `"<field>_encrypted": true`.
//! - [`server`]: an Axum surface and middleware that apply the guard to
//!   responses.

pub mod config;
pub mod crypto;
pub mod guard;
pub mod server;
pub mod telemetry;

pub use crypto::{CryptoCore, CryptoError, Secret};
pub use guard::{guard, FieldGuard, GuardConfig, SensitiveFields};
