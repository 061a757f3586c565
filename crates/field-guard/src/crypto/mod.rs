//! Key derivation, AES-256-GCM envelopes, hashing, and HMAC signing.
//!
//! This module is intentionally free of HTTP and JSON-traversal concerns.
//! Every operation is a pure function of its inputs plus the OS CSPRNG, so a
//! single [`CryptoCore`] can be shared by any number of threads.
//!
//! # Envelope format
//!
//! ```text
//! base64( salt[64] | iv[16] | tag[16] | ciphertext )
//! ```
//!
//! The key is `PBKDF2-HMAC-SHA512(secret, salt, 100_000 iterations, 32 bytes)`.

pub mod cipher;
pub mod digest;
pub mod envelope;
pub mod error;
pub mod secret;

pub use cipher::{CryptoCore, KEY_LEN, PBKDF2_ITERATIONS};
pub use digest::{generate_token, hash, sign, verify, DEFAULT_TOKEN_LEN};
pub use envelope::{looks_encrypted, Envelope};
pub use error::{CryptoError, DecryptionFailure};
pub use secret::Secret;
